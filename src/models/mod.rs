pub mod beatmap;
pub mod score;
pub mod user;

pub use beatmap::{AttributeKind, Beatmap};
pub use score::{DifficultyRow, NewScoreRow, ScoreRow};
pub use user::User;
