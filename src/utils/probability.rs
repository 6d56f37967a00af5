use crate::error::{Result, TitleOddsError};
use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as zero
const STD_DEV_EPSILON: f64 = 1e-9;

/// Summary statistics of historical champion point totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChampionStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (N denominator)
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
}

impl ChampionStats {
    pub fn from_points(points: &[u32]) -> Result<Self> {
        let (min, max) = match (points.iter().min(), points.iter().max()) {
            (Some(min), Some(max)) => (*min, *max),
            _ => return Err(TitleOddsError::EmptyHistory),
        };

        let n = points.len() as f64;
        let mean = points.iter().map(|&p| f64::from(p)).sum::<f64>() / n;
        let variance = points
            .iter()
            .map(|&p| (f64::from(p) - mean).powi(2))
            .sum::<f64>()
            / n;

        Ok(Self {
            count: points.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// How many standard deviations `value` sits above the champion mean
    pub fn z_score(&self, value: f64) -> Result<f64> {
        if self.std_dev < STD_DEV_EPSILON {
            return Err(TitleOddsError::ZeroVariance { value: self.mean });
        }
        Ok((value - self.mean) / self.std_dev)
    }

    /// Title probability (percent) for a predicted points total
    pub fn championship_probability(&self, predicted_points: f64) -> Result<f64> {
        Ok(logistic_percentage(self.z_score(predicted_points)?))
    }
}

/// Map a z-score onto 0-100 with the logistic function.
/// This is a heuristic, not a calibrated probability.
pub fn logistic_percentage(z: f64) -> f64 {
    100.0 / (1.0 + (-z).exp())
}
