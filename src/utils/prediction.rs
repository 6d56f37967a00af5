use crate::error::{Result, TitleOddsError};
use crate::models::{PredictionResult, TeamSeasonInput};
use crate::utils::model::PredictiveModel;
use crate::utils::probability::ChampionStats;
use tracing::debug;

/// Predict final points for a season record and turn them into a title probability
/// measured against historical champion points.
pub fn predict_championship(
    team_name: Option<&str>,
    input: &TeamSeasonInput,
    model: &dyn PredictiveModel,
    historical_points: &[u32],
) -> Result<PredictionResult> {
    input.validate()?;
    let stats = ChampionStats::from_points(historical_points)?;

    let features = input.feature_vector();
    debug!("Running model on {:?}", features.columns().collect::<Vec<_>>());

    let predicted_points = model.predict(&features)?;
    if !predicted_points.is_finite() {
        return Err(TitleOddsError::InvalidModelOutput(predicted_points));
    }

    let championship_probability = stats.championship_probability(predicted_points)?;

    Ok(PredictionResult {
        team_name: team_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        predicted_points,
        championship_probability,
    })
}
