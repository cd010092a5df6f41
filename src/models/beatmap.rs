use std::collections::HashMap;

use crate::constants::{Gamemode, Mods, ScoreVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Aim,
    Speed,
    Od,
    Ar,
    MaxCombo,
    Strain,
    HitWindow300,
    ScoreMultiplier,
    Flashlight,
    Unknown,
}

impl AttributeKind {
    /// Maps the textual names of `osu_difficulty_attribs` onto the enum.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Aim" => AttributeKind::Aim,
            "Speed" => AttributeKind::Speed,
            "OD" => AttributeKind::Od,
            "AR" => AttributeKind::Ar,
            "Max combo" => AttributeKind::MaxCombo,
            "Strain" => AttributeKind::Strain,
            "Hit window 300" => AttributeKind::HitWindow300,
            "Score multiplier" => AttributeKind::ScoreMultiplier,
            "Flashlight" => AttributeKind::Flashlight,
            _ => {
                tracing::warn!("unrecognized difficulty attribute name: {name}");
                AttributeKind::Unknown
            },
        }
    }
}

/// Difficulty information of a single beatmap, keyed by the projection of the
/// mod bitset onto the difficulty-relevant mods.
#[derive(Debug, Clone)]
pub struct Beatmap {
    id: i32,
    mode: Gamemode,
    ranked_status: i32,
    score_version: ScoreVersion,
    num_hit_circles: i32,
    attributes: HashMap<(u32, AttributeKind), f32>,
}

impl Beatmap {
    pub fn new(id: i32, mode: Gamemode) -> Self {
        Self {
            id,
            mode,
            ranked_status: 0,
            score_version: ScoreVersion::V1,
            num_hit_circles: 0,
            attributes: HashMap::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn ranked_status(&self) -> i32 {
        self.ranked_status
    }

    pub fn score_version(&self) -> ScoreVersion {
        self.score_version
    }

    pub fn num_hit_circles(&self) -> i32 {
        self.num_hit_circles
    }

    pub fn set_ranked_status(&mut self, status: i32) {
        self.ranked_status = status;
    }

    pub fn set_score_version(&mut self, version: ScoreVersion) {
        self.score_version = version;
    }

    pub fn set_num_hit_circles(&mut self, count: i32) {
        self.num_hit_circles = count.max(0);
    }

    /// Stores the value under the given mods as-is. Rows in
    /// `osu_beatmap_difficulty_attribs` already carry projected mod bitsets.
    pub fn set_difficulty_attribute(&mut self, mods: Mods, kind: AttributeKind, value: f32) {
        self.attributes.insert((mods.bits(), kind), value);
    }

    /// Reads an attribute for the given play mods. The lookup projects the
    /// bitset first; an entry that was never loaded reads as 0.
    pub fn difficulty_attribute(&self, mods: Mods, kind: AttributeKind) -> f32 {
        let key = mods.difficulty_mask(self.mode).bits();

        self.attributes.get(&(key, kind)).copied().unwrap_or(0.0)
    }
}
