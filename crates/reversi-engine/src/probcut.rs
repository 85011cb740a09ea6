//! Multi-ProbCut forward pruning parameters.
//!
//! A shallow search (or the evaluation function) predicts the result of a deep
//! search as `deep ≈ shallow + mean` with error `sigma`. When the shallow result
//! clears `beta` (or falls under `alpha`) by `t * sigma`, the deep search is skipped.
//! The statistics and the width-to-`t` mapping live in [`MpcConfig`], which the
//! midgame searcher receives at construction.

use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::constants::DISK_VALUE;
use crate::types::{Depth, Score, Scoref};

/// Probe-cut width: how far outside the window a shallow result must land
/// before the deep search is skipped.
///
/// Lower levels are more aggressive (prune more), higher levels are more conservative.
/// `None` disables Multi-ProbCut entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Selectivity {
    /// Most aggressive: 68% confidence (t=1.0)
    Level0 = 0,
    /// 73% confidence (t=1.1)
    Level1 = 1,
    /// 87% confidence (t=1.5)
    Level2 = 2,
    /// 95% confidence (t=2.0)
    Level3 = 3,
    /// 98% confidence (t=2.6)
    #[default]
    Level4 = 4,
    /// Most conservative: 99% confidence (t=3.3)
    Level5 = 5,
    /// Multi-ProbCut disabled.
    None = 6,
}

impl Selectivity {
    /// Number of selectivity values, `None` included.
    pub const COUNT: usize = 7;

    /// Expected success probability percentage of each level.
    const PROBABILITY: [i32; Self::COUNT] = [68, 73, 87, 95, 98, 99, 100];

    /// Gets the expected success probability percentage.
    #[inline]
    pub fn probability(self) -> i32 {
        Self::PROBABILITY[self as usize]
    }

    /// Converts to u8.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Creates a Selectivity from a u8 value. Values above 6 saturate to `None`.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Selectivity::Level0,
            1 => Selectivity::Level1,
            2 => Selectivity::Level2,
            3 => Selectivity::Level3,
            4 => Selectivity::Level4,
            5 => Selectivity::Level5,
            _ => Selectivity::None,
        }
    }

    /// Checks if Multi-ProbCut is enabled for this selectivity level.
    #[inline]
    pub fn is_enabled(self) -> bool {
        self != Selectivity::None
    }
}

impl fmt::Display for Selectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.probability())
    }
}

/// Error type for parsing a [`Selectivity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectivityError {
    #[error("invalid selectivity '{0}': expected 0-5 or none")]
    InvalidLevel(String),
}

impl FromStr for Selectivity {
    type Err = SelectivityError;

    /// Parses a level number (`"0"`-`"5"`) or `"none"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "None" => Ok(Selectivity::None),
            other => match other.parse::<u8>() {
                Ok(v) if v <= 5 => Ok(Selectivity::from_u8(v)),
                _ => Err(SelectivityError::InvalidLevel(s.to_string())),
            },
        }
    }
}

/// Statistical parameters of one Multi-ProbCut prediction model, in discs.
///
/// - `mean = mean_intercept + mean_coef_shallow * shallow + mean_coef_deep * deep`
/// - `sigma = exp(std_intercept + std_coef_shallow * shallow + std_coef_deep * deep)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbcutParams {
    pub mean_intercept: f64,
    pub mean_coef_shallow: f64,
    pub mean_coef_deep: f64,
    pub std_intercept: f64,
    pub std_coef_shallow: f64,
    pub std_coef_deep: f64,
}

impl ProbcutParams {
    /// Expected `deep - shallow` score difference in discs.
    pub fn mean(&self, shallow: f64, deep: f64) -> f64 {
        self.mean_intercept + self.mean_coef_shallow * shallow + self.mean_coef_deep * deep
    }

    /// Standard deviation of `deep - shallow` in discs.
    pub fn sigma(&self, shallow: f64, deep: f64) -> f64 {
        (self.std_intercept + self.std_coef_shallow * shallow + self.std_coef_deep * deep).exp()
    }
}

/// One shallow probe of a Multi-ProbCut node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cutter {
    /// Depth of the probe. 0 means the evaluation function itself.
    pub shallow_depth: Depth,
    /// Expected `deep - shallow` difference in centi-discs.
    pub mean: Scoref,
    /// Standard deviation of the difference in centi-discs.
    pub sigma: Scoref,
}

impl Cutter {
    /// Shallow-search bound that predicts `deep >= beta` with confidence `t`.
    #[inline]
    pub fn shallow_beta(&self, beta: Score, t: f64) -> Score {
        (beta as f64 + t * self.sigma - self.mean).ceil() as Score
    }

    /// Shallow-search bound that predicts `deep <= alpha` with confidence `t`.
    #[inline]
    pub fn shallow_alpha(&self, alpha: Score, t: f64) -> Score {
        (alpha as f64 - t * self.sigma - self.mean).floor() as Score
    }
}

/// Injected Multi-ProbCut configuration.
///
/// `phases` holds one parameter set per game phase, each tagged with the smallest
/// empty count it applies to and sorted by that count, largest first.
#[derive(Clone, Debug, PartialEq)]
pub struct MpcConfig {
    t_values: [f64; Selectivity::COUNT],
    phases: Vec<(u32, ProbcutParams)>,
}

/// Fitted midgame parameters, for 45, 30 and 15 empties.
#[rustfmt::skip]
const MIDGAME_PHASES: [(u32, ProbcutParams); 3] = [
    (38, ProbcutParams {
        mean_intercept: -0.4141769455,
        mean_coef_shallow: 0.0292539150,
        mean_coef_deep: 0.0623489271,
        std_intercept: 0.8778002643,
        std_coef_shallow: -0.0556686103,
        std_coef_deep: 0.0085475277,
    }),
    (23, ProbcutParams {
        mean_intercept: -0.4033586053,
        mean_coef_shallow: 0.1007317569,
        mean_coef_deep: 0.0357515134,
        std_intercept: 0.9851099700,
        std_coef_shallow: -0.0705581325,
        std_coef_deep: 0.0191608349,
    }),
    (10, ProbcutParams {
        mean_intercept: -0.3285501912,
        mean_coef_shallow: 0.1027105131,
        mean_coef_deep: 0.0112373817,
        std_intercept: 1.1183228736,
        std_coef_shallow: -0.0652943767,
        std_coef_deep: 0.0264722766,
    }),
];

/// Fitted parameters for the last few empties.
#[rustfmt::skip]
const ENDGAME_PHASE: ProbcutParams = ProbcutParams {
    mean_intercept: -0.1491234189,
    mean_coef_shallow: 0.0158979662,
    mean_coef_deep: -0.0015993451,
    std_intercept: 0.5931694894,
    std_coef_shallow: -0.0608362414,
    std_coef_deep: 0.0426371540,
};

impl Default for MpcConfig {
    fn default() -> Self {
        let mut phases = MIDGAME_PHASES.to_vec();
        phases.push((0, ENDGAME_PHASE));
        MpcConfig {
            t_values: [1.0, 1.1, 1.5, 2.0, 2.6, 3.3, 999.0],
            phases,
        }
    }
}

impl MpcConfig {
    /// Creates a configuration from explicit statistics.
    ///
    /// # Arguments
    ///
    /// * `t_values` - Confidence multiplier for each [`Selectivity`], `None` last.
    /// * `phases` - `(min_empties, params)` pairs. They are sorted here, and a pair
    ///   with `min_empties == 0` should exist so every position is covered.
    pub fn new(t_values: [f64; Selectivity::COUNT], mut phases: Vec<(u32, ProbcutParams)>) -> Self {
        phases.sort_by(|a, b| b.0.cmp(&a.0));
        MpcConfig { t_values, phases }
    }

    /// Replaces the width-to-`t` mapping.
    pub fn with_t_values(mut self, t_values: [f64; Selectivity::COUNT]) -> Self {
        self.t_values = t_values;
        self
    }

    /// Confidence multiplier for a selectivity level.
    #[inline]
    pub fn t_value(&self, selectivity: Selectivity) -> f64 {
        self.t_values[selectivity as usize]
    }

    /// Parameters of the phase containing `n_empties`.
    pub fn params(&self, n_empties: u32) -> &ProbcutParams {
        self.phases
            .iter()
            .find(|(min_empties, _)| n_empties >= *min_empties)
            .or(self.phases.last())
            .map(|(_, params)| params)
            .unwrap_or(&ENDGAME_PHASE)
    }

    /// Shallow probes for a node at `depth`, shallowest first.
    ///
    /// Nodes below depth 2 have no probes. The main probe searches to
    /// `(depth - 1) / 2`, which is the evaluation function at depth 2. From depth 8
    /// a cheaper probe at `depth / 4` runs first.
    pub fn cutters(&self, n_empties: u32, depth: Depth) -> ArrayVec<Cutter, 2> {
        let mut cutters = ArrayVec::new();
        if depth < 2 {
            return cutters;
        }

        let params = self.params(n_empties);
        let mut push = |shallow_depth: Depth| {
            let (shallow, deep) = (shallow_depth as f64, depth as f64);
            cutters.push(Cutter {
                shallow_depth,
                mean: params.mean(shallow, deep) * DISK_VALUE as f64,
                sigma: params.sigma(shallow, deep) * DISK_VALUE as f64,
            });
        };

        if depth >= 8 {
            push(depth / 4);
        }
        push((depth - 1) / 2);
        cutters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectivity_conversions() {
        for v in 0..=6u8 {
            assert_eq!(Selectivity::from_u8(v).as_u8(), v);
        }
        assert_eq!(Selectivity::from_u8(200), Selectivity::None);
        assert!(!Selectivity::None.is_enabled());
        assert!(Selectivity::Level0.is_enabled());
        assert_eq!("3".parse::<Selectivity>(), Ok(Selectivity::Level3));
        assert_eq!("none".parse::<Selectivity>(), Ok(Selectivity::None));
        assert_eq!(
            "9".parse::<Selectivity>(),
            Err(SelectivityError::InvalidLevel("9".to_string()))
        );
        assert_eq!(
            "fast".parse::<Selectivity>().unwrap_err().to_string(),
            "invalid selectivity 'fast': expected 0-5 or none"
        );
        assert_eq!(Selectivity::Level3.to_string(), "95%");
    }

    #[test]
    fn test_cutter_depths() {
        let config = MpcConfig::default();
        assert!(config.cutters(30, 1).is_empty());

        let depths = |d| {
            config
                .cutters(30, d)
                .iter()
                .map(|c| c.shallow_depth)
                .collect::<Vec<_>>()
        };
        assert_eq!(depths(2), vec![0]);
        assert_eq!(depths(3), vec![1]);
        assert_eq!(depths(7), vec![3]);
        assert_eq!(depths(8), vec![2, 3]);
        assert_eq!(depths(12), vec![3, 5]);
    }

    #[test]
    fn test_window_widens_with_t() {
        let cutter = Cutter {
            shallow_depth: 2,
            mean: 10.0,
            sigma: 200.0,
        };
        assert_eq!(cutter.shallow_beta(100, 1.0), 290);
        assert_eq!(cutter.shallow_alpha(100, 1.0), -110);
        assert!(cutter.shallow_beta(100, 2.0) > cutter.shallow_beta(100, 1.0));
        assert!(cutter.shallow_alpha(100, 2.0) < cutter.shallow_alpha(100, 1.0));
        assert!(cutter.shallow_alpha(0, 0.0) < cutter.shallow_beta(1, 0.0));
    }

    #[test]
    fn test_phase_selection() {
        let config = MpcConfig::default();
        assert_eq!(config.params(50), &MIDGAME_PHASES[0].1);
        assert_eq!(config.params(38), &MIDGAME_PHASES[0].1);
        assert_eq!(config.params(37), &MIDGAME_PHASES[1].1);
        assert_eq!(config.params(12), &MIDGAME_PHASES[2].1);
        assert_eq!(config.params(5), &ENDGAME_PHASE);
    }

    #[test]
    fn test_custom_config() {
        let flat = ProbcutParams {
            mean_intercept: 0.0,
            mean_coef_shallow: 0.0,
            mean_coef_deep: 0.0,
            std_intercept: 0.0,
            std_coef_shallow: 0.0,
            std_coef_deep: 0.0,
        };
        let config = MpcConfig::new([0.5; Selectivity::COUNT], vec![(0, flat)]);
        let cutter = config.cutters(20, 4)[0];
        assert_eq!(cutter.mean, 0.0);
        assert_eq!(cutter.sigma, 100.0);
        assert_eq!(config.t_value(Selectivity::Level2), 0.5);
        assert_eq!(cutter.shallow_beta(0, config.t_value(Selectivity::Level2)), 50);
    }
}
