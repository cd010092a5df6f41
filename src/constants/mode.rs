use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[repr(u8)]
pub enum Gamemode {
    #[value(name = "osu")]
    Standard = 0,
    #[value(name = "taiko")]
    Taiko = 1,
    #[value(name = "catch_the_beat")]
    CatchTheBeat = 2,
    #[value(name = "osu_mania")]
    Mania = 3,
}

impl Gamemode {
    /// Table suffix shared by `osu_scores{}_high` and `osu_user_stats{}`.
    pub fn suffix(self) -> &'static str {
        match self {
            Gamemode::Standard => "",
            Gamemode::Taiko => "_taiko",
            Gamemode::CatchTheBeat => "_fruits",
            Gamemode::Mania => "_mania",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Gamemode::Standard => "osu!",
            Gamemode::Taiko => "Taiko",
            Gamemode::CatchTheBeat => "Catch the Beat",
            Gamemode::Mania => "osu!mania",
        }
    }

    /// Tag attached to every metric emission.
    pub fn tag(self) -> &'static str {
        match self {
            Gamemode::Standard => "osu",
            Gamemode::Taiko => "taiko",
            Gamemode::CatchTheBeat => "catch_the_beat",
            Gamemode::Mania => "osu_mania",
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
