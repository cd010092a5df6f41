use crate::constants::Mods;
use crate::models::{AttributeKind, Beatmap};

use super::{ModeValues, ScoreData};

pub(super) fn evaluate(data: &ScoreData, beatmap: &Beatmap) -> (ModeValues, f32) {
    let difficulty = compute_total_value(data, beatmap);

    (ModeValues::Catch { difficulty }, difficulty)
}

fn compute_total_value(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    if data.mods.contains(Mods::AUTOPLAY) {
        return 0.0;
    }

    // Catch leans almost entirely on aim.
    let aim = beatmap.difficulty_attribute(data.mods, AttributeKind::Aim);

    let mut value = (5.0 * (aim / 0.0049).max(1.0) - 4.0).powi(2) / 100_000.0;

    // Length counts hits that contribute to combo; droplets don't.
    let combo_hits = data.total_combo_hits() as f32;
    let length_bonus = 0.95 + 0.3 * (combo_hits / 2500.0).min(1.0)
        + if combo_hits > 2500.0 {
            (combo_hits / 2500.0).log10() * 0.475
        } else {
            0.0
        };
    value *= length_bonus;

    value *= 0.97f32.powi(data.num_miss);

    let beatmap_max_combo = beatmap.difficulty_attribute(data.mods, AttributeKind::MaxCombo);
    if beatmap_max_combo > 0.0 {
        value *= (data.max_combo as f32 / beatmap_max_combo).powf(0.8).min(1.0);
    }

    let approach_rate = beatmap.difficulty_attribute(data.mods, AttributeKind::Ar);
    let mut approach_rate_factor = 1.0;
    if approach_rate > 9.0 {
        approach_rate_factor += 0.1 * (approach_rate - 9.0);
    }
    if approach_rate > 10.0 {
        approach_rate_factor += 0.1 * (approach_rate - 10.0);
    } else if approach_rate < 8.0 {
        approach_rate_factor += 0.025 * (8.0 - approach_rate);
    }
    value *= approach_rate_factor;

    if data.mods.contains(Mods::HIDDEN) {
        // Hidden gives almost nothing on max approach rate, more the lower it is.
        if approach_rate <= 10.0 {
            value *= 1.05 + 0.075 * (10.0 - approach_rate);
        } else {
            value *= 1.01 + 0.04 * (11.0 - approach_rate.min(11.0));
        }
    }

    if data.mods.contains(Mods::FLASHLIGHT) {
        value *= 1.35 * length_bonus;
    }

    value *= data.accuracy().powf(5.5);

    if data.mods.contains(Mods::NOFAIL) {
        value *= 0.90;
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Gamemode;
    use crate::performance::test_support::score_data;
    use crate::performance::Score;

    fn beatmap() -> Beatmap {
        let mut beatmap = Beatmap::new(3, Gamemode::CatchTheBeat);
        beatmap.set_difficulty_attribute(Mods::empty(), AttributeKind::Aim, 0.012);
        beatmap.set_difficulty_attribute(Mods::empty(), AttributeKind::Ar, 9.0);
        beatmap.set_difficulty_attribute(Mods::empty(), AttributeKind::MaxCombo, 1000.0);
        beatmap
    }

    fn full_plate() -> ScoreData {
        let mut data = score_data(Gamemode::CatchTheBeat);
        data.num_300 = 900; // fruits
        data.num_100 = 80; // droplet hits
        data.num_50 = 20; // missed droplets
        data.max_combo = 980;
        data
    }

    #[test]
    fn autoplay_zeroes_the_total() {
        let mut data = full_plate();
        data.mods = Mods::AUTOPLAY;

        assert_eq!(Score::new(data, &beatmap()).total_value(), 0.0);
    }

    #[test]
    fn accuracy_dominates_the_value() {
        let perfect = Score::new(full_plate(), &beatmap());

        let mut sloppy = full_plate();
        sloppy.num_300 = 850;
        sloppy.num_miss = 50;
        sloppy.max_combo = 400;
        let sloppy = Score::new(sloppy, &beatmap());

        assert!(perfect.total_value() > 0.0);
        assert!(sloppy.total_value() < perfect.total_value());
    }

    #[test]
    fn nofail_scales_by_ten_percent() {
        let clean = Score::new(full_plate(), &beatmap());

        let mut nf = full_plate();
        nf.mods = Mods::NOFAIL;
        let nf = Score::new(nf, &beatmap());

        assert!((nf.total_value() - clean.total_value() * 0.90).abs() < 1e-3);
    }

    #[test]
    fn relax_still_counts_for_catch() {
        let clean = Score::new(full_plate(), &beatmap());

        let mut rx = full_plate();
        rx.mods = Mods::RELAX;
        let rx = Score::new(rx, &beatmap());

        assert!((rx.total_value() - clean.total_value()).abs() < 1e-6);
    }
}
