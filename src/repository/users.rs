use anyhow::Result;

use crate::constants::Gamemode;
use crate::infrastructure::database::DbHandle;

pub async fn max_user_id(db: &DbHandle, mode: Gamemode) -> Result<Option<i64>> {
    let query = format!(
        "select max(`user_id`) from `osu_user_stats{}`",
        mode.suffix()
    );

    let id: Option<i64> = sqlx::query_scalar(&query).fetch_one(db.as_ref()).await?;

    Ok(id)
}

pub async fn fetch_ids_in_range(
    db: &DbHandle,
    mode: Gamemode,
    begin: i64,
    end: i64,
) -> Result<Vec<i64>> {
    let query = format!(
        "select `user_id` from `osu_user_stats{}` where `user_id` between ? and ?",
        mode.suffix()
    );

    let ids = sqlx::query_scalar::<_, i64>(&query)
        .bind(begin)
        .bind(end)
        .fetch_all(db.as_ref())
        .await?;

    Ok(ids)
}

/// The rating currently stored for a user, if any.
pub async fn fetch_stored_pp(
    db: &DbHandle,
    mode: Gamemode,
    pp_column: &str,
    user_id: i64,
) -> Result<Option<f32>> {
    let query = format!(
        "select `{}` from `osu_user_stats{}` where `user_id` = ?",
        pp_column,
        mode.suffix()
    );

    let pp: Option<Option<f32>> = sqlx::query_scalar(&query)
        .bind(user_id)
        .fetch_optional(db.as_ref())
        .await?;

    Ok(pp.flatten())
}
