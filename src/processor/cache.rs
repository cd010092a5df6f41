use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::constants::{Gamemode, Mods, ScoreVersion};
use crate::infrastructure::{database::DbHandle, datadog::Metrics};
use crate::models::{AttributeKind, Beatmap, DifficultyRow};
use crate::repository;

const BOOTSTRAP_ID_STEP: i32 = 10_000;

/// Shared id -> beatmap map. Rating tasks hold the read side while
/// evaluating scores; loads take the write side. There is no lock upgrade:
/// a reader that finds a hole drops its guard, loads, and re-probes.
pub struct BeatmapCache {
    mode: Gamemode,
    db_slave: DbHandle,
    metrics: Metrics,
    attribute_kinds: Vec<AttributeKind>,
    inner: RwLock<HashMap<i32, Beatmap>>,
}

impl BeatmapCache {
    pub fn new(
        mode: Gamemode,
        db_slave: DbHandle,
        metrics: Metrics,
        attribute_kinds: Vec<AttributeKind>,
    ) -> Self {
        Self {
            mode,
            db_slave,
            metrics,
            attribute_kinds,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<i32, Beatmap>> {
        self.inner.read().await
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Walks the id space in fixed windows until a window comes back empty.
    pub async fn bootstrap(&self) -> Result<()> {
        let mut begin = 0;
        while self.load_range(begin, begin + BOOTSTRAP_ID_STEP).await? {
            begin += BOOTSTRAP_ID_STEP;
        }

        tracing::info!(
            "loaded difficulties for a total of {} beatmaps",
            self.len().await
        );

        Ok(())
    }

    pub async fn load_range(&self, start_id: i32, end_id: i32) -> Result<bool> {
        let rows =
            repository::beatmaps::fetch_difficulty_range(&self.db_slave, self.mode, start_id, end_id)
                .await?;

        if rows.is_empty() {
            return Ok(false);
        }

        {
            let mut maps = self.inner.write().await;
            apply_rows(&mut maps, self.mode, &self.attribute_kinds, &rows);
        }

        tracing::info!(
            "obtained beatmap difficulties from id {start_id} to {}",
            end_id - 1
        );

        Ok(true)
    }

    /// Targeted load of one beatmap. Missing afterwards is a warning, not an
    /// error; the caller skips the score.
    pub async fn load_single(&self, beatmap_id: i32) -> Result<bool> {
        let rows =
            repository::beatmaps::fetch_difficulty_single(&self.db_slave, self.mode, beatmap_id)
                .await?;

        let found = {
            let mut maps = self.inner.write().await;
            apply_rows(&mut maps, self.mode, &self.attribute_kinds, &rows);
            maps.contains_key(&beatmap_id)
        };

        if found {
            tracing::info!("obtained beatmap difficulty of /b/{beatmap_id}");
            self.metrics.increment("difficulty.retrieval_success");
        } else {
            tracing::warn!("couldn't find beatmap /b/{beatmap_id}");
            self.metrics.increment("difficulty.retrieval_not_found");
        }

        Ok(found)
    }
}

/// Folds difficulty rows into the map. Assignments are idempotent and
/// attribute inserts overwrite, so reloading a beatmap is harmless.
pub(crate) fn apply_rows(
    maps: &mut HashMap<i32, Beatmap>,
    mode: Gamemode,
    attribute_kinds: &[AttributeKind],
    rows: &[DifficultyRow],
) {
    for row in rows {
        let beatmap = maps
            .entry(row.beatmap_id)
            .or_insert_with(|| Beatmap::new(row.beatmap_id, mode));

        beatmap.set_ranked_status(row.approved);
        beatmap.set_score_version(ScoreVersion::from_i32(row.score_version));
        beatmap.set_num_hit_circles(row.num_hit_circles.unwrap_or(0));

        let kind = attribute_kinds
            .get(row.attrib_id as usize)
            .copied()
            .unwrap_or(AttributeKind::Unknown);

        beatmap.set_difficulty_attribute(Mods::from_bits_truncate(row.mods as u32), kind, row.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(beatmap_id: i32, attrib_id: i32, mods: i32, value: f32) -> DifficultyRow {
        DifficultyRow {
            beatmap_id,
            num_hit_circles: Some(400),
            mods,
            attrib_id,
            value,
            approved: 1,
            score_version: 1,
        }
    }

    fn kinds() -> Vec<AttributeKind> {
        vec![
            AttributeKind::Unknown,
            AttributeKind::Aim,
            AttributeKind::Speed,
            AttributeKind::Strain,
        ]
    }

    #[test]
    fn rows_upsert_beatmaps_and_attributes() {
        let mut maps = HashMap::new();

        apply_rows(
            &mut maps,
            Gamemode::Standard,
            &kinds(),
            &[row(10, 1, 0, 2.5), row(10, 2, 0, 1.8), row(11, 1, 0, 3.0)],
        );

        assert_eq!(maps.len(), 2);

        let beatmap = &maps[&10];
        assert_eq!(beatmap.ranked_status(), 1);
        assert_eq!(beatmap.num_hit_circles(), 400);
        assert_eq!(
            beatmap.difficulty_attribute(Mods::empty(), AttributeKind::Aim),
            2.5
        );
        assert_eq!(
            beatmap.difficulty_attribute(Mods::empty(), AttributeKind::Speed),
            1.8
        );
    }

    #[test]
    fn reload_overwrites_in_place() {
        let mut maps = HashMap::new();

        apply_rows(&mut maps, Gamemode::Standard, &kinds(), &[row(10, 1, 0, 2.5)]);
        apply_rows(&mut maps, Gamemode::Standard, &kinds(), &[row(10, 1, 0, 2.9)]);

        assert_eq!(maps.len(), 1);
        assert_eq!(
            maps[&10].difficulty_attribute(Mods::empty(), AttributeKind::Aim),
            2.9
        );
    }

    #[test]
    fn out_of_table_attribute_ids_become_the_sentinel() {
        let mut maps = HashMap::new();

        apply_rows(&mut maps, Gamemode::Standard, &kinds(), &[row(10, 99, 0, 1.0)]);

        // The value lands under the sentinel kind, which no formula reads.
        assert_eq!(
            maps[&10].difficulty_attribute(Mods::empty(), AttributeKind::Unknown),
            1.0
        );
        assert_eq!(
            maps[&10].difficulty_attribute(Mods::empty(), AttributeKind::Aim),
            0.0
        );
    }
}
