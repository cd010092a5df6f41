use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::constants::Gamemode;
use crate::infrastructure::database::DbHandle;
use crate::models::{AttributeKind, DifficultyRow};

pub async fn fetch_blacklist(db: &DbHandle, mode: Gamemode) -> Result<HashSet<i32>> {
    let ids: Vec<i32> = sqlx::query_scalar(
        "select `beatmap_id` from osu_beatmap_performance_blacklist where `mode` = ?",
    )
    .bind(mode.as_i32())
    .fetch_all(db.as_ref())
    .await?;

    Ok(ids.into_iter().collect())
}

/// Builds the attrib_id -> kind table. Gaps read as the unknown sentinel.
pub async fn fetch_attribute_kinds(db: &DbHandle) -> Result<Vec<AttributeKind>> {
    let rows: Vec<(i32, String)> = sqlx::query_as(
        "select `attrib_id`, `name` from osu_difficulty_attribs order by `attrib_id` desc",
    )
    .fetch_all(db.as_ref())
    .await?;

    let mut kinds = Vec::new();
    for (id, name) in &rows {
        let id = *id as usize;
        if kinds.len() < id + 1 {
            kinds.resize(id + 1, AttributeKind::Unknown);
        }

        kinds[id] = AttributeKind::from_name(name);
    }

    tracing::info!(
        "retrieved {} difficulty attributes, stored in {} entries",
        rows.len(),
        kinds.len()
    );

    Ok(kinds)
}

const DIFFICULTY_SELECT: &str =
    "select osu_beatmaps.beatmap_id, countNormal, mods, attrib_id, value, approved, score_version \
     from osu_beatmaps \
     join osu_beatmap_difficulty_attribs \
       on osu_beatmaps.beatmap_id = osu_beatmap_difficulty_attribs.beatmap_id \
     where osu_beatmap_difficulty_attribs.mode = ? and approved >= 1";

pub async fn fetch_difficulty_range(
    db: &DbHandle,
    mode: Gamemode,
    start_id: i32,
    end_id: i32,
) -> Result<Vec<DifficultyRow>> {
    let query = format!(
        "{DIFFICULTY_SELECT} and osu_beatmaps.beatmap_id >= ? and osu_beatmaps.beatmap_id < ?"
    );

    let rows = sqlx::query_as::<_, DifficultyRow>(&query)
        .bind(mode.as_i32())
        .bind(start_id)
        .bind(end_id)
        .fetch_all(db.as_ref())
        .await?;

    Ok(rows)
}

pub async fn fetch_difficulty_single(
    db: &DbHandle,
    mode: Gamemode,
    beatmap_id: i32,
) -> Result<Vec<DifficultyRow>> {
    let query = format!("{DIFFICULTY_SELECT} and osu_beatmaps.beatmap_id = ?");

    let rows = sqlx::query_as::<_, DifficultyRow>(&query)
        .bind(mode.as_i32())
        .bind(beatmap_id)
        .fetch_all(db.as_ref())
        .await?;

    Ok(rows)
}

pub async fn max_approved_date(db: &DbHandle) -> Result<Option<NaiveDateTime>> {
    let date: Option<NaiveDateTime> =
        sqlx::query_scalar("select max(`approved_date`) from osu_beatmapsets")
            .fetch_one(db.as_ref())
            .await?;

    Ok(date)
}

/// Beatmaps of sets ranked after the watermark, oldest first.
pub async fn fetch_ranked_since(
    db: &DbHandle,
    after: NaiveDateTime,
) -> Result<Vec<(i32, NaiveDateTime)>> {
    let rows: Vec<(i32, NaiveDateTime)> = sqlx::query_as(
        "select osu_beatmaps.beatmap_id, approved_date \
         from osu_beatmapsets \
         join osu_beatmaps on osu_beatmapsets.beatmapset_id = osu_beatmaps.beatmapset_id \
         where approved_date > ? \
         order by approved_date asc",
    )
    .bind(after)
    .fetch_all(db.as_ref())
    .await?;

    Ok(rows)
}
