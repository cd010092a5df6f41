use crate::performance::PpRecord;

/// Collects the per-score PP records of one player and reduces them to a
/// single weighted rating.
#[derive(Debug, Clone)]
pub struct User {
    id: i64,
    scores: Vec<PpRecord>,
    record: PpRecord,
}

impl User {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            scores: Vec::new(),
            record: PpRecord::default(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn add_score_pp_record(&mut self, record: PpRecord) {
        self.scores.push(record);
    }

    /// Weights the records by 0.95^i over the value-descending order. The
    /// accuracy average is normalized so a single-score player keeps their
    /// raw accuracy.
    pub fn compute_pp_record(&mut self) -> PpRecord {
        let mut sorted = self.scores.clone();
        sorted.sort_by(|a, b| b.value.total_cmp(&a.value));

        let mut total_value = 0.0f32;
        let mut total_accuracy = 0.0f32;
        let mut weight_sum = 0.0f32;

        for (i, record) in sorted.iter().enumerate() {
            let weight = 0.95f32.powi(i as i32);

            total_value += record.value * weight;
            total_accuracy += record.accuracy * weight;
            weight_sum += weight;
        }

        let accuracy = if weight_sum > 0.0 {
            total_accuracy / weight_sum
        } else {
            0.0
        };

        self.record = PpRecord {
            value: total_value,
            accuracy,
        };

        self.record
    }

    pub fn pp_record(&self) -> PpRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_decay_by_rank() {
        let mut user = User::new(1);
        // Insertion order must not matter.
        for value in [50.0, 100.0, 25.0] {
            user.add_score_pp_record(PpRecord {
                value,
                accuracy: 1.0,
            });
        }

        let record = user.compute_pp_record();

        // 100 + 50 * 0.95 + 25 * 0.9025
        assert!((record.value - 170.0625).abs() < 1e-4);
        assert!((record.accuracy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn accuracy_is_weight_normalized() {
        let mut user = User::new(1);
        user.add_score_pp_record(PpRecord {
            value: 100.0,
            accuracy: 1.0,
        });
        user.add_score_pp_record(PpRecord {
            value: 50.0,
            accuracy: 0.5,
        });

        let record = user.compute_pp_record();
        let expected = (1.0 + 0.5 * 0.95) / (1.0 + 0.95);

        assert!((record.accuracy - expected).abs() < 1e-6);
    }

    #[test]
    fn empty_user_aggregates_to_zero() {
        let mut user = User::new(1);
        let record = user.compute_pp_record();

        assert_eq!(record.value, 0.0);
        assert_eq!(record.accuracy, 0.0);
    }
}
