use crate::constants::{Mods, ScoreVersion};
use crate::models::{AttributeKind, Beatmap};

use super::{ModeValues, ScoreData};

pub(super) fn evaluate(data: &ScoreData, beatmap: &Beatmap) -> (ModeValues, f32) {
    let effective_miss = effective_miss_count(data, beatmap);

    let aim = compute_aim_value(data, beatmap, effective_miss);
    let speed = compute_speed_value(data, beatmap, effective_miss);
    let acc = compute_acc_value(data, beatmap);
    let flashlight = compute_flashlight_value(data, beatmap, effective_miss);

    // Don't count scores made with supposedly unranked mods.
    let total = if data
        .mods
        .intersects(Mods::RELAX | Mods::AUTOPILOT | Mods::AUTOPLAY)
    {
        0.0
    } else {
        let mut multiplier = 1.12f32;

        if data.mods.contains(Mods::NOFAIL) {
            multiplier *= 0.90;
        }

        if data.mods.contains(Mods::SPUNOUT) {
            multiplier *= 0.95;
        }

        (aim.powf(1.1) + speed.powf(1.1) + acc.powf(1.1) + flashlight.powf(1.1)).powf(1.0 / 1.1)
            * multiplier
    };

    (
        ModeValues::Standard {
            aim,
            speed,
            acc,
            flashlight,
            effective_miss,
        },
        total,
    )
}

/// Approximates dropped sliders from the combo deficit. A full combo keeps
/// the raw miss count.
fn effective_miss_count(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    let beatmap_max_combo = beatmap.difficulty_attribute(data.mods, AttributeKind::MaxCombo);
    let num_miss = data.num_miss as f32;

    if beatmap_max_combo <= 0.0 || data.max_combo as f32 >= beatmap_max_combo {
        return num_miss;
    }

    let countable = (data.num_miss + data.num_50 + data.num_100).min(data.total_hits()) as f32;
    let combo_term = countable * (1.0 - data.max_combo as f32 / beatmap_max_combo).powi(3);

    num_miss.max(combo_term.floor().min(countable))
}

fn length_bonus(total_hits: f32) -> f32 {
    0.95 + 0.4 * (total_hits / 2000.0).min(1.0)
        + if total_hits > 2000.0 {
            (total_hits / 2000.0).log10() * 0.5
        } else {
            0.0
        }
}

fn combo_scaling(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    let beatmap_max_combo = beatmap.difficulty_attribute(data.mods, AttributeKind::MaxCombo);

    if beatmap_max_combo > 0.0 {
        ((data.max_combo as f32).powf(0.8) / beatmap_max_combo.powf(0.8)).min(1.0)
    } else {
        1.0
    }
}

fn compute_aim_value(data: &ScoreData, beatmap: &Beatmap, effective_miss: f32) -> f32 {
    let raw_aim = beatmap.difficulty_attribute(data.mods, AttributeKind::Aim);

    let mut value = (5.0 * (raw_aim / 0.0675).max(1.0) - 4.0).powi(3) / 100_000.0;

    let total_hits = data.total_hits() as f32;
    value *= length_bonus(total_hits);

    value *= 0.97f32.powf(effective_miss);
    value *= combo_scaling(data, beatmap);

    let approach_rate = beatmap.difficulty_attribute(data.mods, AttributeKind::Ar);
    let mut approach_rate_factor = 1.0;
    if approach_rate > 10.33 {
        approach_rate_factor += 0.3 * (approach_rate - 10.33);
    } else if approach_rate < 8.0 {
        approach_rate_factor += 0.01 * (8.0 - approach_rate);
    }
    value *= approach_rate_factor;

    // More reward for lower AR when hidden is involved.
    if data.mods.contains(Mods::HIDDEN) {
        value *= 1.0 + 0.04 * (12.0 - approach_rate);
    }

    if data.mods.contains(Mods::FLASHLIGHT) {
        value *= 1.0
            + 0.35 * (total_hits / 200.0).min(1.0)
            + if total_hits > 200.0 {
                0.3 * ((total_hits - 200.0) / 300.0).min(1.0)
                    + if total_hits > 500.0 {
                        (total_hits - 500.0) / 1200.0
                    } else {
                        0.0
                    }
            } else {
                0.0
            };
    }

    // Scale the aim value down slightly with accuracy and accuracy difficulty.
    value *= 0.5 + data.accuracy() / 2.0;
    value
        * (0.98
            + beatmap
                .difficulty_attribute(data.mods, AttributeKind::Od)
                .powi(2)
                / 2500.0)
}

fn compute_speed_value(data: &ScoreData, beatmap: &Beatmap, effective_miss: f32) -> f32 {
    let raw_speed = beatmap.difficulty_attribute(data.mods, AttributeKind::Speed);

    let mut value = (5.0 * (raw_speed / 0.0675).max(1.0) - 4.0).powi(3) / 100_000.0;

    value *= length_bonus(data.total_hits() as f32);
    value *= 0.97f32.powf(effective_miss);
    value *= combo_scaling(data, beatmap);

    let approach_rate = beatmap.difficulty_attribute(data.mods, AttributeKind::Ar);
    let mut approach_rate_factor = 1.0;
    if approach_rate > 10.33 {
        approach_rate_factor += 0.3 * (approach_rate - 10.33);
    } else if approach_rate < 8.0 {
        approach_rate_factor += 0.01 * (8.0 - approach_rate);
    }
    value *= approach_rate_factor;

    if data.mods.contains(Mods::HIDDEN) {
        value *= 1.0 + 0.04 * (12.0 - approach_rate);
    }

    value *= 0.5 + data.accuracy() / 2.0;
    value
        * (0.98
            + beatmap
                .difficulty_attribute(data.mods, AttributeKind::Od)
                .powi(2)
                / 2500.0)
}

fn compute_acc_value(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    // Only hit circles carry timing accuracy under score v1; score v2 rates
    // every object.
    let (num_hit_objects_with_accuracy, best_accuracy) =
        if beatmap.score_version() == ScoreVersion::V2 {
            (data.total_hits(), data.accuracy())
        } else {
            let num_hit_circles = beatmap.num_hit_circles();

            let accuracy = if num_hit_circles > 0 {
                (((data.num_300 - (data.total_hits() - num_hit_circles)) * 6
                    + data.num_100 * 2
                    + data.num_50) as f32
                    / (num_hit_circles * 6) as f32)
                    .max(0.0)
            } else {
                0.0
            };

            (num_hit_circles, accuracy)
        };

    let od = beatmap.difficulty_attribute(data.mods, AttributeKind::Od);

    let mut value = 1.52163f32.powf(od) * best_accuracy.powi(24) * 2.83;

    // Harder to keep accuracy up on longer maps.
    value *= (num_hit_objects_with_accuracy as f32 / 1000.0).powf(0.3).min(1.15);

    if data.mods.contains(Mods::HIDDEN) {
        value *= 1.08;
    }

    if data.mods.contains(Mods::FLASHLIGHT) {
        value *= 1.02;
    }

    value
}

fn compute_flashlight_value(data: &ScoreData, beatmap: &Beatmap, effective_miss: f32) -> f32 {
    if !data.mods.contains(Mods::FLASHLIGHT) {
        return 0.0;
    }

    let raw_flashlight = beatmap.difficulty_attribute(data.mods, AttributeKind::Flashlight);

    let mut value = (raw_flashlight / 0.0675).powi(2) * 0.25;

    value *= length_bonus(data.total_hits() as f32);

    if data.mods.contains(Mods::HIDDEN) {
        value *= 1.3;
    }

    value *= 0.97f32.powf(effective_miss);
    value *= combo_scaling(data, beatmap);

    value * (0.5 + data.accuracy() / 2.0)
}
