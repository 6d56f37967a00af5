use crate::error::{Result, TitleOddsError};
use crate::models::{FeatureVector, FEATURE_NAMES};
use serde::{Deserialize, Serialize};

/// Anything that can turn a season's feature row into a points total
pub trait PredictiveModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

/// Linear regression artifact exported from the training notebook
///
/// ```json
/// { "feature_names": ["W", "D", "L", "GF", "GA", "GD"],
///   "coefficients": [3.0, 1.0, 0.0, 0.0, 0.0, 0.0],
///   "intercept": 0.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: [f64; 6], intercept: f64) -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: coefficients.to_vec(),
            intercept,
        }
    }

    // The column schema is only checked when predicting, so a stale artifact
    // still loads and the history charts keep working.
    fn check_schema(&self, features: &FeatureVector) -> Result<()> {
        let names_match = self.feature_names.len() == features.names().len()
            && self
                .feature_names
                .iter()
                .zip(features.names())
                .all(|(a, b)| a.as_str() == *b);

        if !names_match || self.coefficients.len() != features.values.len() {
            return Err(TitleOddsError::FeatureSchemaMismatch {
                expected: self.feature_names.clone(),
                actual: features.names().iter().map(|s| s.to_string()).collect(),
            });
        }
        Ok(())
    }
}

impl PredictiveModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.check_schema(features)?;

        let points = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>();

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamSeasonInput;

    #[test]
    fn test_linear_prediction() {
        // 3 points a win, 1 a draw
        let model = LinearModel::new([3.0, 1.0, 0.0, 0.0, 0.0, 0.0], 0.0);
        let features = TeamSeasonInput::new(30, 5, 3, 90, 25).feature_vector();
        assert_eq!(model.predict(&features).unwrap(), 95.0);

        let model = LinearModel::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.5], 10.0);
        assert_eq!(model.predict(&features).unwrap(), 42.5);
    }

    #[test]
    fn test_deserialize_artifact() {
        let json = r#"{
            "feature_names": ["W", "D", "L", "GF", "GA", "GD"],
            "coefficients": [2.9, 1.0, -0.1, 0.05, -0.05, 0.02],
            "intercept": 1.5
        }"#;
        let model: LinearModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.coefficients.len(), 6);
        assert_eq!(model.intercept, 1.5);
    }

    #[test]
    fn test_schema_mismatch_fails_at_predict_time() {
        let mut model = LinearModel::new([3.0, 1.0, 0.0, 0.0, 0.0, 0.0], 0.0);
        model.feature_names.swap(0, 1);
        let features = TeamSeasonInput::new(30, 5, 3, 90, 25).feature_vector();

        match model.predict(&features) {
            Err(TitleOddsError::FeatureSchemaMismatch { expected, actual }) => {
                assert_eq!(expected[0], "D");
                assert_eq!(actual[0], "W");
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }

        let mut model = LinearModel::new([3.0, 1.0, 0.0, 0.0, 0.0, 0.0], 0.0);
        model.coefficients.pop();
        assert!(model.predict(&features).is_err());
    }
}
