pub mod cache;
pub mod pool;

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::config::Config;
use crate::constants::{mods, Gamemode, MAX_RANKED_STATUS, MIN_RANKED_STATUS};
use crate::infrastructure::{
    batch::UpdateBatch,
    database::{DbHandle, QuerySubmitter},
    datadog::Metrics,
};
use crate::models::User;
use crate::performance::{PpRecord, Score, ScoreData};
use crate::repository;
use crate::utils;

use cache::BeatmapCache;
use pool::WorkerPool;

// A score is notable when it alone carries more than this fraction of the
// player's total, and the net change clears the minimum.
const NOTABLE_EVENT_RATING_THRESHOLD: f32 = 1.0 / 21.5;
const NOTABLE_EVENT_RATING_DIFFERENCE_MINIMUM: f32 = 5.0;

const USER_ID_STEP: i64 = 10_000;
const LAST_SCORE_ID_UPDATE_STEP: u32 = 100;
const BULK_BATCH_HIGH_WATER_MARK: usize = 10_000;

pub struct Processor {
    gamemode: Gamemode,
    config: Arc<Config>,
    db: DbHandle,
    db_slave: DbHandle,
    submitter: QuerySubmitter,
    metrics: Metrics,
    beatmaps: BeatmapCache,
    blacklist: HashSet<i32>,
    shall_shutdown: Arc<AtomicBool>,
}

impl Processor {
    pub async fn new(
        gamemode: Gamemode,
        config: Arc<Config>,
        db: DbHandle,
        db_slave: DbHandle,
        metrics: Metrics,
    ) -> Result<Arc<Self>> {
        metrics.increment("startups");

        if config.sentry.host.is_some() {
            tracing::warn!("sentry reporting is configured but not transported; alerts surface as log lines");
        }

        tracing::info!("retrieving blacklisted beatmaps");
        let blacklist = repository::beatmaps::fetch_blacklist(&db_slave, gamemode).await?;
        tracing::info!("retrieved {} blacklisted beatmaps", blacklist.len());

        tracing::info!("retrieving difficulty attribute names");
        let attribute_kinds = repository::beatmaps::fetch_attribute_kinds(&db_slave).await?;

        let beatmaps = BeatmapCache::new(
            gamemode,
            db_slave.clone(),
            metrics.clone(),
            attribute_kinds,
        );
        beatmaps.bootstrap().await?;

        let submitter = QuerySubmitter::new(db.clone());

        Ok(Arc::new(Self {
            gamemode,
            config,
            db,
            db_slave,
            submitter,
            metrics,
            beatmaps,
            blacklist,
            shall_shutdown: Arc::new(AtomicBool::new(false)),
        }))
    }

    pub fn spawn_shutdown_listener(self: &Arc<Self>) {
        let flag = self.shall_shutdown.clone();

        tokio::spawn(async move {
            utils::shutdown_signal().await;
            tracing::info!("shutdown requested");
            flag.store(true, Ordering::SeqCst);
        });
    }

    pub fn shutting_down(&self) -> bool {
        self.shall_shutdown.load(Ordering::SeqCst)
    }

    /// Waits for outstanding background writes before the process exits.
    pub async fn finish(&self) {
        self.submitter.quiesce().await;
    }

    fn last_score_id_key(&self) -> String {
        format!("pp_last_score_id{}", self.gamemode.suffix())
    }

    fn last_user_id_key(&self) -> String {
        format!("pp_last_user_id{}", self.gamemode.suffix())
    }

    /// Runs the two pollers side by side until shutdown is requested.
    pub async fn monitor_new_scores(&self) -> Result<()> {
        tokio::try_join!(self.score_poll_loop(), self.beatmap_set_poll_loop())?;

        Ok(())
    }

    async fn score_poll_loop(&self) -> Result<()> {
        // Zero high-water mark: the live path wants updates out immediately.
        let new_users = UpdateBatch::new(self.submitter.clone(), 0);
        let new_scores = UpdateBatch::new(self.submitter.clone(), 0);

        let mut current_score_id =
            repository::counts::retrieve(&self.db, &self.last_score_id_key()).await?;
        let mut num_scores_since_store = 0u32;
        let mut last_poll = Instant::now();

        let interval = Duration::from_millis(self.config.score_update_interval);

        while !self.shutting_down() {
            if last_poll.elapsed() >= interval {
                let found_rows = self
                    .poll_and_process_new_scores(
                        &mut current_score_id,
                        &mut num_scores_since_store,
                        &new_users,
                        &new_scores,
                    )
                    .await?;

                // Only reset the poll timer when we find nothing; otherwise
                // keep going right away.
                if !found_rows {
                    last_poll = Instant::now();
                }
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }

        new_users.flush().await;
        new_scores.flush().await;

        Ok(())
    }

    async fn poll_and_process_new_scores(
        &self,
        current_score_id: &mut i64,
        num_scores_since_store: &mut u32,
        new_users: &UpdateBatch,
        new_scores: &UpdateBatch,
    ) -> Result<bool> {
        let rows = repository::scores::fetch_new_high_scores(
            &self.db_slave,
            self.gamemode,
            *current_score_id,
        )
        .await?;

        self.metrics
            .gauge("score.amount_behind_newest", rows.len() as f64);

        if rows.is_empty() {
            return Ok(false);
        }

        for row in rows {
            *current_score_id = (*current_score_id).max(row.score_id);

            tracing::info!(
                "new score {} in mode {} by {}",
                row.score_id,
                self.gamemode.name(),
                row.user_id
            );

            self.process_single_user(row.score_id, new_users, new_scores, row.user_id)
                .await?;

            *num_scores_since_store += 1;
            if *num_scores_since_store > LAST_SCORE_ID_UPDATE_STEP {
                repository::counts::store(
                    &self.submitter,
                    &self.last_score_id_key(),
                    *current_score_id,
                );
                *num_scores_since_store = 0;
            }

            self.metrics.increment("score.processed_new");
            self.metrics.gauge_tagged(
                "db.pending_queries",
                self.submitter.num_pending() as f64,
                "connection:main",
            );
        }

        Ok(true)
    }

    async fn beatmap_set_poll_loop(&self) -> Result<()> {
        let mut last_approved_date = match repository::beatmaps::max_approved_date(&self.db_slave)
            .await?
        {
            Some(date) => date,
            None => bail!("couldn't find maximum approved date"),
        };

        let mut last_poll = Instant::now();
        let interval = Duration::from_millis(self.config.difficulty_update_interval);

        while !self.shutting_down() {
            if last_poll.elapsed() >= interval {
                last_poll = Instant::now();

                tracing::info!("retrieving new beatmap sets");
                let rows =
                    repository::beatmaps::fetch_ranked_since(&self.db_slave, last_approved_date)
                        .await?;
                tracing::info!("retrieved {} new beatmaps", rows.len());

                for (beatmap_id, approved_date) in rows {
                    last_approved_date = approved_date;
                    self.beatmaps.load_single(beatmap_id).await?;
                    self.metrics.increment("difficulty.required_retrieval");
                }
            } else {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        Ok(())
    }

    /// Recomputes every user, resuming from the persisted cursor unless a
    /// full reprocess is requested.
    pub async fn process_all_users(
        self: &Arc<Self>,
        reprocess: bool,
        num_threads: u32,
    ) -> Result<()> {
        let num_threads = num_threads.max(1) as usize;

        // One background lane per worker, with its own batcher pair.
        let lanes: Vec<QuerySubmitter> = (0..num_threads)
            .map(|_| QuerySubmitter::new(self.db.clone()))
            .collect();
        let batch_pairs: Arc<Vec<BatchPair>> = Arc::new(
            lanes
                .iter()
                .map(|lane| BatchPair {
                    new_users: UpdateBatch::new(lane.clone(), BULK_BATCH_HIGH_WATER_MARK),
                    new_scores: UpdateBatch::new(lane.clone(), BULK_BATCH_HIGH_WATER_MARK),
                })
                .collect(),
        );

        let mut begin = if reprocess {
            // Make sure a restart still does the full pass, even if no store
            // was triggered before.
            repository::counts::store(&self.submitter, &self.last_user_id_key(), 0);
            0
        } else {
            repository::counts::retrieve(&self.db, &self.last_user_id_key()).await?
        };

        // Nothing left to reprocess.
        if begin == -1 {
            return Ok(());
        }

        tracing::info!("querying all scores, starting from user id {begin}");

        let max_user_id = match repository::users::max_user_id(&self.db_slave, self.gamemode).await?
        {
            Some(id) => id,
            None => bail!("couldn't find maximum user id"),
        };

        let processor = self.clone();
        let pairs = batch_pairs.clone();
        let mut pool = WorkerPool::new(num_threads, move |index, user_id: i64| {
            let processor = processor.clone();
            let pairs = pairs.clone();

            async move {
                let pair = &pairs[index];

                // All scores of the user, not just one.
                if let Err(e) = processor
                    .process_single_user(0, &pair.new_users, &pair.new_scores, user_id)
                    .await
                {
                    tracing::error!("failed to process user {user_id}: {e:?}");
                }
            }
        });

        while begin <= max_user_id {
            let end = begin + USER_ID_STEP;
            tracing::info!("updating users {begin} - {end}");

            let user_ids =
                repository::users::fetch_ids_in_range(&self.db_slave, self.gamemode, begin, end)
                    .await?;

            for user_id in user_ids {
                pool.enqueue(user_id);

                if self.shutting_down() {
                    return Ok(());
                }
            }

            begin += USER_ID_STEP;

            loop {
                let num_pending: usize = lanes.iter().map(QuerySubmitter::num_pending).sum();

                self.metrics.gauge_tagged(
                    "db.pending_queries",
                    num_pending as f64,
                    "connection:background",
                );

                if pool.num_tasks_in_system() == 0 && num_pending == 0 {
                    break;
                }

                tokio::time::sleep(Duration::from_millis(10)).await;
            }

            repository::counts::store(&self.submitter, &self.last_user_id_key(), begin);
        }

        pool.join().await;

        for pair in batch_pairs.iter() {
            pair.new_users.flush().await;
            pair.new_scores.flush().await;
        }
        for lane in &lanes {
            lane.quiesce().await;
        }

        Ok(())
    }

    /// One-shot recompute of the given users, with a summary at the end.
    pub async fn process_users(&self, user_args: &[String]) -> Result<()> {
        let new_users = UpdateBatch::new(self.submitter.clone(), BULK_BATCH_HIGH_WATER_MARK);
        let new_scores = UpdateBatch::new(self.submitter.clone(), BULK_BATCH_HIGH_WATER_MARK);

        let mut users = Vec::new();
        for raw in user_args {
            let user_id: i64 = match raw.parse() {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!("skipping '{raw}': user lookup by name is not available yet");
                    continue;
                },
            };

            users.push(
                self.process_single_user(0, &new_users, &new_scores, user_id)
                    .await?,
            );
        }

        users.sort_by(|a, b| {
            b.pp_record()
                .value
                .total_cmp(&a.pp_record().value)
                .then(b.id().cmp(&a.id()))
        });

        tracing::info!("============================");
        tracing::info!("======= USER SUMMARY =======");
        tracing::info!("============================");
        tracing::info!("      User    Perf.     Acc.");
        tracing::info!("----------------------------");

        for user in &users {
            let record = user.pp_record();
            tracing::info!(
                "{:>10}  {:>5}pp  {:>6.2}%",
                user.id(),
                record.value as i32,
                record.accuracy * 100.0
            );
        }

        tracing::info!("============================");

        new_users.flush().await;
        new_scores.flush().await;
        self.submitter.quiesce().await;

        Ok(())
    }

    /// The whole single-user pipeline: load scores, rate them against the
    /// cache, batch the writes, aggregate, and watch for notable events.
    pub async fn process_single_user(
        &self,
        selected_score_id: i64,
        new_users: &UpdateBatch,
        new_scores: &UpdateBatch,
        user_id: i64,
    ) -> Result<User> {
        let rows =
            repository::scores::fetch_user_scores(&self.db_slave, self.gamemode, user_id).await?;

        let mut user = User::new(user_id);
        let mut scores_that_need_update: Vec<Score> = Vec::new();
        let mut attempted_loads: HashSet<i32> = HashSet::new();

        {
            let mut maps = self.beatmaps.read().await;

            for row in &rows {
                // Blacklisted maps don't count.
                if self.blacklist.contains(&row.beatmap_id) {
                    continue;
                }

                if !maps.contains_key(&row.beatmap_id) {
                    // Load each missing id at most once per run, no matter
                    // how many scores point at it.
                    if attempted_loads.insert(row.beatmap_id) {
                        drop(maps);
                        self.beatmaps.load_single(row.beatmap_id).await?;
                        maps = self.beatmaps.read().await;
                    }
                }

                let Some(beatmap) = maps.get(&row.beatmap_id) else {
                    continue;
                };

                let ranked_status = beatmap.ranked_status();
                if !(MIN_RANKED_STATUS..=MAX_RANKED_STATUS).contains(&ranked_status) {
                    continue;
                }

                let score = Score::new(ScoreData::from_row(self.gamemode, row), beatmap);

                user.add_score_pp_record(score.pp_record());

                if row.pp.is_none()
                    || selected_score_id == 0
                    || selected_score_id == row.score_id
                {
                    // Only touch the row when the value moved.
                    let differs = match row.pp {
                        None => true,
                        Some(stored) => (stored - score.total_value()).abs() > 0.001,
                    };

                    if differs {
                        tracing::debug!(
                            "score {} ({}) -> {:.3}pp",
                            row.score_id,
                            mods::repr(score.data().mods),
                            score.total_value()
                        );
                        scores_that_need_update.push(score);
                    }
                }
            }
        }

        new_scores
            .append_many(
                scores_that_need_update
                    .iter()
                    .map(Score::update_statement),
            )
            .await;

        self.metrics
            .count("score.updated", scores_that_need_update.len() as i64);

        let user_record = user.compute_pp_record();

        // Notable events only make sense when a specific score triggered us.
        if selected_score_id > 0
            && !scores_that_need_update.is_empty()
            && scores_that_need_update[0].total_value()
                > user_record.value * NOTABLE_EVENT_RATING_THRESHOLD
        {
            self.metrics.increment("score.notable_events");

            let score = &scores_that_need_update[0];

            if let Some(previous_pp) = repository::users::fetch_stored_pp(
                &self.db_slave,
                self.gamemode,
                &self.config.user_pp_column_name,
                user_id,
            )
            .await?
            {
                let rating_change = user_record.value - previous_pp;

                // Scores worth less than a handful of pp aren't notable.
                if rating_change >= NOTABLE_EVENT_RATING_DIFFERENCE_MINIMUM {
                    tracing::info!("notable event: /b/{} /u/{}", score.beatmap_id(), user_id);

                    self.submitter.submit(format!(
                        "INSERT INTO \
                         osu_user_performance_change(user_id, mode, beatmap_id, performance_change, rank) \
                         VALUES({},{},{},{},null)",
                        user_id,
                        self.gamemode.as_i32(),
                        score.beatmap_id(),
                        rating_change
                    ));
                }
            }
        }

        new_users
            .append_and_commit(user_update_statement(
                self.gamemode,
                &self.config.user_pp_column_name,
                user_record,
                user_id,
            ))
            .await;

        self.metrics.increment("user.amount_processed");

        Ok(user)
    }
}

struct BatchPair {
    new_users: UpdateBatch,
    new_scores: UpdateBatch,
}

/// The user-level UPDATE. The CASE zeroes ratings of players inactive for
/// over three months, and the ABS guard skips no-op writes.
pub fn user_update_statement(
    mode: Gamemode,
    pp_column: &str,
    record: PpRecord,
    user_id: i64,
) -> String {
    format!(
        "UPDATE `osu_user_stats{suffix}` \
         SET `{col}`= CASE \
         WHEN CURDATE() > DATE_ADD(`last_played`, INTERVAL 3 MONTH) THEN 0 \
         ELSE {value} \
         END,\
         `accuracy_new`={accuracy} \
         WHERE `user_id`={user_id} AND ABS(`{col}` - {value}) > 0.01;",
        suffix = mode.suffix(),
        col = pp_column,
        value = record.value,
        accuracy = record.accuracy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_update_statement_is_case_guarded() {
        let statement = user_update_statement(
            Gamemode::Taiko,
            "rank_score",
            PpRecord {
                value: 1234.5,
                accuracy: 0.987,
            },
            42,
        );

        assert!(statement.starts_with("UPDATE `osu_user_stats_taiko` SET `rank_score`= CASE "));
        assert!(statement.contains("WHEN CURDATE() > DATE_ADD(`last_played`, INTERVAL 3 MONTH) THEN 0"));
        assert!(statement.contains("ELSE 1234.5"));
        assert!(statement.contains("`accuracy_new`=0.987"));
        assert!(statement.ends_with("WHERE `user_id`=42 AND ABS(`rank_score` - 1234.5) > 0.01;"));
    }

    #[test]
    fn user_update_statement_is_deterministic() {
        let record = PpRecord {
            value: 100.25,
            accuracy: 0.5,
        };

        assert_eq!(
            user_update_statement(Gamemode::Standard, "rank_score", record, 7),
            user_update_statement(Gamemode::Standard, "rank_score", record, 7)
        );
    }

    #[test]
    fn counter_keys_are_mode_suffixed() {
        assert_eq!(
            format!("pp_last_score_id{}", Gamemode::Mania.suffix()),
            "pp_last_score_id_mania"
        );
        assert_eq!(
            format!("pp_last_user_id{}", Gamemode::Standard.suffix()),
            "pp_last_user_id"
        );
    }
}
