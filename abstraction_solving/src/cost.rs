use itertools::iproduct;

/// Worst-case payoff swing caused by treating two roll histories as the same.
///
/// A history is a pair `(first, second)` of die faces in `1..=num_sides` and
/// is ranked by its sum. Against an opponent holding sum `s`, merging two
/// histories with sums `lower < higher` swings the outcome by one
/// `largest_payoff` when `s` ties one of them, and by two when `s` lies
/// strictly between them.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimator {
    largest_payoff: f64,
    side_probabilities: Vec<f64>,
}

impl CostEstimator {
    /// Estimator for a fair die.
    pub fn new(num_sides: usize, largest_payoff: f64) -> CostEstimator {
        CostEstimator {
            largest_payoff,
            side_probabilities: vec![1.0 / num_sides as f64; num_sides],
        }
    }

    /// Estimator for a die whose face `k` comes up with probability
    /// `side_probabilities[k - 1]`.
    pub fn with_side_probabilities(side_probabilities: Vec<f64>, largest_payoff: f64) -> CostEstimator {
        CostEstimator {
            largest_payoff,
            side_probabilities,
        }
    }

    pub fn num_sides(&self) -> usize {
        self.side_probabilities.len()
    }

    pub fn cost(&self, first_a: usize, second_a: usize, first_b: usize, second_b: usize) -> f64 {
        let sum_a = first_a + second_a;
        let sum_b = first_b + second_b;
        if sum_a == sum_b {
            return 0.0;
        }
        let (lower, higher) = (sum_a.min(sum_b), sum_a.max(sum_b));

        let num_sides = self.num_sides();
        iproduct!(1..=num_sides, 1..=num_sides)
            .map(|(opponent_first, opponent_second)| {
                let sum = opponent_first + opponent_second;
                let swing = if sum == lower || sum == higher {
                    1.0
                } else if lower < sum && sum < higher {
                    2.0
                } else {
                    0.0
                };
                self.side_probabilities[opponent_first - 1]
                    * self.side_probabilities[opponent_second - 1]
                    * swing
                    * self.largest_payoff
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn equal_sums_are_free() {
        let estimator = CostEstimator::new(6, 3.0);
        assert_eq!(estimator.cost(1, 4, 2, 3), 0.0);
        assert_eq!(estimator.cost(6, 6, 6, 6), 0.0);
    }

    #[test]
    fn symmetric_and_non_negative() {
        let estimator = CostEstimator::new(4, 2.0);
        for (a, b, c, d) in iproduct!(1..=4, 1..=4, 1..=4, 1..=4) {
            let cost = estimator.cost(a, b, c, d);
            assert!(cost >= 0.0);
            assert_approx_eq!(cost, estimator.cost(c, d, a, b));
        }
    }

    #[test]
    fn two_sided_die() {
        // Opponent sums 2, 3, 4 come up with probability 1/4, 1/2, 1/4.
        let estimator = CostEstimator::new(2, 1.0);
        assert_approx_eq!(estimator.cost(1, 1, 1, 2), 0.75);
        assert_approx_eq!(estimator.cost(2, 1, 2, 2), 0.75);
        assert_approx_eq!(estimator.cost(1, 1, 2, 2), 1.5);
    }

    #[test]
    fn loaded_die() {
        let estimator = CostEstimator::with_side_probabilities(vec![1.0, 0.0], 2.0);
        // The opponent always holds sum 2.
        assert_approx_eq!(estimator.cost(1, 1, 1, 2), 2.0);
        assert_approx_eq!(estimator.cost(1, 2, 2, 2), 0.0);
    }
}
