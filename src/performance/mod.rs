pub mod catch;
pub mod mania;
pub mod standard;
pub mod taiko;

use crate::constants::{Gamemode, Mods};
use crate::models::{Beatmap, ScoreRow};

/// The pair that a score contributes to its player's aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PpRecord {
    pub value: f32,
    pub accuracy: f32,
}

/// Common fields of a play, shared by all four scorers.
#[derive(Debug, Clone)]
pub struct ScoreData {
    pub score_id: i64,
    pub user_id: i64,
    pub beatmap_id: i32,
    pub mode: Gamemode,
    pub score: i32,
    pub max_combo: i32,
    pub num_300: i32,
    pub num_100: i32,
    pub num_50: i32,
    pub num_miss: i32,
    pub num_geki: i32,
    pub num_katu: i32,
    pub mods: Mods,
}

impl ScoreData {
    pub fn from_row(mode: Gamemode, row: &ScoreRow) -> Self {
        Self {
            score_id: row.score_id,
            user_id: row.user_id,
            beatmap_id: row.beatmap_id,
            mode,
            score: row.score,
            max_combo: row.maxcombo,
            num_300: row.count300,
            num_100: row.count100,
            num_50: row.count50,
            num_miss: row.countmiss,
            num_geki: row.countgeki,
            num_katu: row.countkatu,
            mods: row.mods(),
        }
    }

    pub fn total_hits(&self) -> i32 {
        let base = self.num_50 + self.num_100 + self.num_300 + self.num_miss;

        match self.mode {
            Gamemode::Standard | Gamemode::Taiko => base,
            Gamemode::CatchTheBeat => base + self.num_katu,
            Gamemode::Mania => base + self.num_geki + self.num_katu,
        }
    }

    pub fn total_successful_hits(&self) -> i32 {
        let base = self.num_50 + self.num_100 + self.num_300;

        match self.mode {
            Gamemode::Mania => base + self.num_geki + self.num_katu,
            _ => base,
        }
    }

    /// Hits that can contribute to combo in catch; droplets do not.
    pub(crate) fn total_combo_hits(&self) -> i32 {
        self.num_miss + self.num_100 + self.num_300
    }

    pub fn accuracy(&self) -> f32 {
        let total_hits = self.total_hits();
        if total_hits == 0 {
            return 0.0;
        }

        let total = total_hits as f32;

        let accuracy = match self.mode {
            Gamemode::Standard => {
                (self.num_50 * 50 + self.num_100 * 100 + self.num_300 * 300) as f32
                    / (total * 300.0)
            },
            Gamemode::Taiko => {
                (self.num_100 * 150 + self.num_300 * 300) as f32 / (total * 300.0)
            },
            Gamemode::CatchTheBeat => self.total_successful_hits() as f32 / total,
            Gamemode::Mania => {
                (self.num_50 * 50
                    + self.num_100 * 100
                    + self.num_katu * 200
                    + (self.num_300 + self.num_geki) * 300) as f32
                    / (total * 300.0)
            },
        };

        accuracy.clamp(0.0, 1.0)
    }
}

/// Mode-specific sub-values kept around for diagnostics.
#[derive(Debug, Clone)]
pub enum ModeValues {
    Standard {
        aim: f32,
        speed: f32,
        acc: f32,
        flashlight: f32,
        effective_miss: f32,
    },
    Taiko {
        difficulty: f32,
        accuracy: f32,
    },
    Catch {
        difficulty: f32,
    },
    Mania {
        strain: f32,
        acc: f32,
    },
}

/// A fully evaluated play. The total value is computed once at construction
/// and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Score {
    data: ScoreData,
    values: ModeValues,
    total_value: f32,
}

impl Score {
    pub fn new(data: ScoreData, beatmap: &Beatmap) -> Self {
        let (values, total_value) = match data.mode {
            Gamemode::Standard => standard::evaluate(&data, beatmap),
            Gamemode::Taiko => taiko::evaluate(&data, beatmap),
            Gamemode::CatchTheBeat => catch::evaluate(&data, beatmap),
            Gamemode::Mania => mania::evaluate(&data, beatmap),
        };

        Self {
            data,
            values,
            total_value,
        }
    }

    pub fn data(&self) -> &ScoreData {
        &self.data
    }

    pub fn score_id(&self) -> i64 {
        self.data.score_id
    }

    pub fn beatmap_id(&self) -> i32 {
        self.data.beatmap_id
    }

    pub fn total_value(&self) -> f32 {
        self.total_value
    }

    pub fn accuracy(&self) -> f32 {
        self.data.accuracy()
    }

    pub fn values(&self) -> &ModeValues {
        &self.values
    }

    pub fn pp_record(&self) -> PpRecord {
        PpRecord {
            value: self.total_value,
            accuracy: self.data.accuracy(),
        }
    }

    /// The statement appended to the score update batch.
    pub fn update_statement(&self) -> String {
        format!(
            "UPDATE `osu_scores{}_high` SET `pp`={} WHERE `score_id`={};",
            self.data.mode.suffix(),
            self.total_value,
            self.data.score_id
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn score_data(mode: Gamemode) -> ScoreData {
        ScoreData {
            score_id: 1,
            user_id: 2,
            beatmap_id: 3,
            mode,
            score: 0,
            max_combo: 0,
            num_300: 0,
            num_100: 0,
            num_50: 0,
            num_miss: 0,
            num_geki: 0,
            num_katu: 0,
            mods: Mods::empty(),
        }
    }
}
