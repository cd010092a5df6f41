use sqlx::FromRow;

use crate::constants::Mods;

/// Full score row of `osu_scores{suffix}_high`, as read by the single-user
/// path.
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub score_id: i64,
    pub user_id: i64,
    pub beatmap_id: i32,
    pub score: i32,
    pub maxcombo: i32,
    pub count300: i32,
    pub count100: i32,
    pub count50: i32,
    pub countmiss: i32,
    pub countgeki: i32,
    pub countkatu: i32,
    pub enabled_mods: i32,
    pub pp: Option<f32>,
}

impl ScoreRow {
    pub fn mods(&self) -> Mods {
        Mods::from_bits_truncate(self.enabled_mods as u32)
    }
}

/// Slim row used by the score poller.
#[derive(Debug, Clone, FromRow)]
pub struct NewScoreRow {
    pub score_id: i64,
    pub user_id: i64,
    pub pp: Option<f32>,
}

/// One row of the difficulty-attribute join used to fill the beatmap cache.
#[derive(Debug, Clone, FromRow)]
pub struct DifficultyRow {
    pub beatmap_id: i32,
    #[sqlx(rename = "countNormal")]
    pub num_hit_circles: Option<i32>,
    pub mods: i32,
    pub attrib_id: i32,
    pub value: f32,
    pub approved: i32,
    pub score_version: i32,
}
