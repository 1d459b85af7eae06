//! Turning raw counts into probabilities that are never zero.
//!
//! Transitions use add-one (Laplace) smoothing over the successor space
//! (every real tag plus EOS), so each row of the transition table sums to 1.
//! Emissions keep the unsmoothed maximum-likelihood ratio for pairs seen in
//! training; every unseen pair gets a single global floor that stays below
//! the smallest observed emission probability.
use crate::error::Result;
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingPolicy {
    emission_floor: f64,
    floor_margin: f64,
}

impl Default for SmoothingPolicy {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            emission_floor: cfg.emission_floor,
            floor_margin: cfg.floor_margin,
        }
    }
}

impl SmoothingPolicy {
    /// Both knobs must lie strictly between 0 and 1.
    pub fn new(emission_floor: f64, floor_margin: f64) -> Result<Self> {
        let cfg = Config {
            emission_floor,
            floor_margin,
            ..Config::default()
        };
        Self::from_config(&cfg)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            emission_floor: config.emission_floor,
            floor_margin: config.floor_margin,
        })
    }

    /// P(cur | prev) = (count(prev, cur) + 1) / (count(prev, *) + successors)
    #[inline]
    pub fn transition(&self, count: u64, outgoing: u64, successors: usize) -> f64 {
        (count as f64 + 1.0) / (outgoing as f64 + successors as f64)
    }

    /// P(word | tag) = count(tag, word) / count(tag, *) for a seen pair.
    #[inline]
    pub fn seen_emission(&self, count: u64, tag_total: u64) -> f64 {
        debug_assert!(count > 0 && count <= tag_total);
        count as f64 / tag_total as f64
    }

    /// Floor for unseen (tag, word) pairs given the smallest emission
    /// probability observed for any tag.
    ///
    /// The result is strictly below `smallest_seen`, so an unseen word can
    /// never outscore a seen one under the same tag.
    pub fn unseen_floor(&self, smallest_seen: f64) -> f64 {
        self.emission_floor.min(smallest_seen * self.floor_margin)
    }

    pub fn emission_floor(&self) -> f64 {
        self.emission_floor
    }

    pub fn floor_margin(&self) -> f64 {
        self.floor_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaggerError;

    #[test]
    fn laplace_row_sums_to_one() {
        let policy = SmoothingPolicy::default();
        // three successors, counts 3, 0, 1 => outgoing 4
        let counts = [3u64, 0, 1];
        let sum: f64 = counts
            .iter()
            .map(|&c| policy.transition(c, 4, counts.len()))
            .sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((policy.transition(0, 4, 3) - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn unseen_row_is_uniform() {
        let policy = SmoothingPolicy::default();
        assert!((policy.transition(0, 0, 5) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn floor_stays_below_smallest_seen() {
        let policy = SmoothingPolicy::new(1e-3, 0.5).unwrap();
        assert_eq!(policy.unseen_floor(0.25), 1e-3);
        // a very large tag drives the smallest seen probability under the knob
        let tiny = 1.0 / 1e7;
        let floor = policy.unseen_floor(tiny);
        assert!(floor < tiny);
        assert!(floor > 0.0);
    }

    #[test]
    fn seen_emission_is_mle() {
        let policy = SmoothingPolicy::default();
        assert!((policy.seen_emission(2, 8) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn invalid_knobs_are_rejected() {
        assert!(matches!(
            SmoothingPolicy::new(0.0, 0.5),
            Err(TaggerError::InvalidConfig(_))
        ));
        assert!(matches!(
            SmoothingPolicy::new(1e-6, 1.0),
            Err(TaggerError::InvalidConfig(_))
        ));
    }
}
