use crate::constants::{Mods, ScoreVersion};
use crate::models::{AttributeKind, Beatmap};

use super::{ModeValues, ScoreData};

pub(super) fn evaluate(data: &ScoreData, beatmap: &Beatmap) -> (ModeValues, f32) {
    let real_score = compute_real_score(data, beatmap);
    let strain = compute_strain_value(data, beatmap);
    let acc = compute_acc_value(real_score, strain);

    // Don't count scores made with supposedly unranked mods.
    let total = if data
        .mods
        .intersects(Mods::RELAX | Mods::AUTOPILOT | Mods::AUTOPLAY)
    {
        0.0
    } else {
        let mut multiplier = 0.8f32;

        if data.mods.contains(Mods::NOFAIL) {
            multiplier *= 0.90;
        }

        if data.mods.contains(Mods::EASY) {
            multiplier *= 0.50;
        }

        (strain.powf(1.1) + acc.powf(1.1)).powf(1.0 / 1.1) * multiplier
    };

    (ModeValues::Mania { strain, acc }, total)
}

/// Normalizes a v1 score so it is comparable across key mods; v2 scores are
/// already normalized.
fn compute_real_score(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    match beatmap.score_version() {
        ScoreVersion::V2 => data.score as f32,
        ScoreVersion::V1 => {
            let multiplier =
                beatmap.difficulty_attribute(data.mods, AttributeKind::ScoreMultiplier);
            if multiplier <= 0.0 {
                return 0.0;
            }

            let key_mods = data.mods & Mods::KEY_MODS;
            let key_adjust = if key_mods.is_empty() {
                1.0
            } else {
                let adjust =
                    beatmap.difficulty_attribute(key_mods, AttributeKind::ScoreMultiplier);
                if adjust <= 0.0 {
                    1.0
                } else {
                    adjust
                }
            };

            data.score as f32 / multiplier * (2.0 - key_adjust)
        },
    }
}

fn compute_strain_value(data: &ScoreData, beatmap: &Beatmap) -> f32 {
    let strain = beatmap.difficulty_attribute(data.mods, AttributeKind::Strain);

    let mut value = (5.0 * (strain / 0.2).max(1.0) - 4.0).powf(2.2) / 135.0;

    value *= 1.0 + 0.1 * (data.total_hits() as f32 / 1500.0).min(1.0);
    value *= 0.985f32.powi(data.num_miss);

    value
}

/// How much of the strain a score of this quality gets to keep. Anything
/// below half a million is worthless.
fn windowed_score_factor(real_score: f32) -> f32 {
    if real_score < 500_000.0 {
        0.0
    } else if real_score < 600_000.0 {
        (real_score - 500_000.0) / 100_000.0 * 0.3
    } else if real_score < 700_000.0 {
        0.3 + (real_score - 600_000.0) / 100_000.0 * 0.25
    } else if real_score < 800_000.0 {
        0.55 + (real_score - 700_000.0) / 100_000.0 * 0.20
    } else if real_score < 900_000.0 {
        0.75 + (real_score - 800_000.0) / 100_000.0 * 0.15
    } else {
        0.90 + (real_score - 900_000.0) / 100_000.0 * 0.10
    }
}

fn compute_acc_value(real_score: f32, strain_value: f32) -> f32 {
    windowed_score_factor(real_score) * strain_value.powf(0.1) * 2.5
}
