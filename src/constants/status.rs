/// `approved` column values of `osu_beatmaps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RankedStatus {
    Graveyard = -2,
    Wip = -1,
    Pending = 0,
    Ranked = 1,
    Approved = 2,
    Qualified = 3,
    Loved = 4,
}

impl RankedStatus {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}

// Only ranked and approved maps contribute to ratings.
pub const MIN_RANKED_STATUS: i32 = RankedStatus::Ranked as i32;
pub const MAX_RANKED_STATUS: i32 = RankedStatus::Approved as i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScoreVersion {
    #[default]
    V1,
    V2,
}

impl ScoreVersion {
    pub fn from_i32(version: i32) -> Self {
        match version {
            2 => ScoreVersion::V2,
            _ => ScoreVersion::V1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_window_covers_ranked_and_approved() {
        assert_eq!(MIN_RANKED_STATUS, 1);
        assert_eq!(MAX_RANKED_STATUS, 2);
        assert!(!(MIN_RANKED_STATUS..=MAX_RANKED_STATUS).contains(&RankedStatus::Loved.as_i32()));
    }

    #[test]
    fn score_version_defaults_to_v1() {
        assert_eq!(ScoreVersion::from_i32(0), ScoreVersion::V1);
        assert_eq!(ScoreVersion::from_i32(2), ScoreVersion::V2);
    }
}
