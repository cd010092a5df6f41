use anyhow::Result;

use crate::constants::Gamemode;
use crate::infrastructure::database::DbHandle;
use crate::models::{NewScoreRow, ScoreRow};

/// Unrated score rows past the watermark, oldest first.
pub async fn fetch_new_high_scores(
    db: &DbHandle,
    mode: Gamemode,
    since_score_id: i64,
) -> Result<Vec<NewScoreRow>> {
    let query = format!(
        "select `score_id`, `user_id`, `pp` from `osu_scores{}_high` \
         where `score_id` > ? and `pp` is null \
         order by `score_id` asc",
        mode.suffix()
    );

    let rows = sqlx::query_as::<_, NewScoreRow>(&query)
        .bind(since_score_id)
        .fetch_all(db.as_ref())
        .await?;

    Ok(rows)
}

pub async fn fetch_user_scores(
    db: &DbHandle,
    mode: Gamemode,
    user_id: i64,
) -> Result<Vec<ScoreRow>> {
    let query = format!(
        "select `score_id`, `user_id`, `beatmap_id`, `score`, `maxcombo`, \
         `count300`, `count100`, `count50`, `countmiss`, `countgeki`, `countkatu`, \
         `enabled_mods`, `pp` \
         from `osu_scores{}_high` where `user_id` = ?",
        mode.suffix()
    );

    let rows = sqlx::query_as::<_, ScoreRow>(&query)
        .bind(user_id)
        .fetch_all(db.as_ref())
        .await?;

    Ok(rows)
}
