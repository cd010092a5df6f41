pub mod beatmaps;
pub mod counts;
pub mod scores;
pub mod users;
