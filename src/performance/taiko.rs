use crate::constants::Mods;
use crate::models::{AttributeKind, Beatmap};

use super::{ModeValues, ScoreData};

pub(super) fn evaluate(data: &ScoreData, beatmap: &Beatmap) -> (ModeValues, f32) {
    let difficulty = compute_difficulty_value(data, beatmap);
    let accuracy = compute_accuracy_value(data, beatmap);

    // Don't count scores made with supposedly unranked mods.
    let total = if data
        .mods
        .intersects(Mods::RELAX | Mods::AUTOPILOT | Mods::AUTOPLAY)
    {
        0.0
    } else {
        let mut multiplier = 1.12f32;

        if data.mods.contains(Mods::HIDDEN) {
            multiplier *= 1.075;
        }

        if data.mods.contains(Mods::EASY) {
            multiplier *= 0.975;
        }

        (difficulty.powf(1.1) + accuracy.powf(1.1)).powf(1.0 / 1.1) * multiplier
    };

    (
        ModeValues::Taiko {
            difficulty,
            accuracy,
        },
        total,
    )
}

fn compute_difficulty_value(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    let strain = beatmap.difficulty_attribute(data.mods, AttributeKind::Strain);

    let mut value = (5.0 * (strain / 0.115).max(1.0) - 4.0).powf(2.25) / 1150.0;

    let length_bonus = 1.0 + 0.1 * (data.total_hits() as f32 / 1500.0).min(1.0);
    value *= length_bonus;

    value *= 0.986f32.powi(data.num_miss);

    if data.mods.contains(Mods::EASY) {
        value *= 0.980;
    }

    if data.mods.contains(Mods::HIDDEN) {
        value *= 1.025;
    }

    if data.mods.contains(Mods::FLASHLIGHT) {
        value *= 1.05 * length_bonus;
    }

    value * data.accuracy().powf(1.5)
}

fn compute_accuracy_value(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    let hit_window_300 = beatmap.difficulty_attribute(data.mods, AttributeKind::HitWindow300);
    if hit_window_300 <= 0.0 {
        return 0.0;
    }

    let mut value = (140.0 / hit_window_300).powf(1.1) * data.accuracy().powi(12) * 27.0;

    let length_bonus = (data.total_hits() as f32 / 1500.0).powf(0.3).min(1.15);
    value *= length_bonus;

    // Slight HDFL bonus for accuracy.
    if data.mods.contains(Mods::HIDDEN | Mods::FLASHLIGHT) {
        value *= 1.10 * length_bonus;
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Gamemode;
    use crate::performance::test_support::score_data;
    use crate::performance::Score;

    fn beatmap(strain: f32, hit_window_300: f32) -> Beatmap {
        let mut beatmap = Beatmap::new(3, Gamemode::Taiko);
        beatmap.set_difficulty_attribute(Mods::empty(), AttributeKind::Strain, strain);
        beatmap.set_difficulty_attribute(Mods::empty(), AttributeKind::HitWindow300, hit_window_300);
        beatmap
    }

    #[test]
    fn nomod_total_matches_formula() {
        let beatmap = beatmap(4.5, 35.0);

        let mut data = score_data(Gamemode::Taiko);
        data.num_300 = 900;

        let score = Score::new(data.clone(), &beatmap);

        // accuracy is exactly 1.0 for an all-300 play
        assert!((data.accuracy() - 1.0).abs() < 1e-6);

        let difficulty = {
            let base = (5.0f32 * (4.5f32 / 0.115).max(1.0) - 4.0).powf(2.25) / 1150.0;
            base * (1.0 + 0.1 * (900.0f32 / 1500.0).min(1.0))
        };
        let accuracy = {
            let base = (140.0f32 / 35.0).powf(1.1) * 27.0;
            base * (900.0f32 / 1500.0).powf(0.3).min(1.15)
        };
        let expected = (difficulty.powf(1.1) + accuracy.powf(1.1)).powf(1.0 / 1.1) * 1.12;

        assert!((score.total_value() - expected).abs() < 1e-3);
    }

    #[test]
    fn zero_hit_window_zeroes_the_accuracy_value() {
        let beatmap = beatmap(4.5, 0.0);

        let mut data = score_data(Gamemode::Taiko);
        data.num_300 = 900;

        let score = Score::new(data, &beatmap);

        match score.values() {
            ModeValues::Taiko { accuracy, .. } => assert_eq!(*accuracy, 0.0),
            _ => unreachable!(),
        }
        assert!(score.total_value() > 0.0);
    }

    #[test]
    fn unranked_mods_zero_the_total() {
        let beatmap = beatmap(4.5, 35.0);

        for mods in [Mods::RELAX, Mods::AUTOPILOT, Mods::AUTOPLAY] {
            let mut data = score_data(Gamemode::Taiko);
            data.num_300 = 900;
            data.mods = mods;

            assert_eq!(Score::new(data, &beatmap).total_value(), 0.0);
        }
    }

    #[test]
    fn misses_shrink_the_difficulty_value() {
        let beatmap = beatmap(4.5, 35.0);

        let mut clean = score_data(Gamemode::Taiko);
        clean.num_300 = 900;

        let mut missed = clean.clone();
        missed.num_300 = 890;
        missed.num_miss = 10;

        let clean = Score::new(clean, &beatmap);
        let missed = Score::new(missed, &beatmap);

        assert!(missed.total_value() < clean.total_value());
    }
}
