pub mod error;
pub mod models;
pub mod utils;

pub use error::*;
pub use models::*;
pub use utils::*;

use std::path::PathBuf;
use tracing::{info, warn};
use utils::charts::{histogram, HistogramBin, DEFAULT_BINS};
use utils::data::{load_champion_records, load_model, save_prediction_to_csv};
use utils::model::LinearModel;
use utils::prediction::predict_championship;
use utils::probability::ChampionStats;

const DEFAULT_MODEL_PATH: &str = "data/epl_forecasting_model.json";
const DEFAULT_STANDINGS_PATH: &str = "data/EPL_Standings_final_2024.csv";
const DEFAULT_PREDICTIONS_CSV: &str = "cache/predictions.csv";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub standings_path: PathBuf,
    pub bind_addr: String,
    /// Append every prediction to `predictions_csv`
    pub save_csv: bool,
    pub predictions_csv: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            standings_path: PathBuf::from(DEFAULT_STANDINGS_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            save_csv: false,
            predictions_csv: PathBuf::from(DEFAULT_PREDICTIONS_CSV),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            standings_path: lookup("STANDINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.standings_path),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            save_csv: lookup("SAVE_CSV").unwrap_or_default() == "1",
            predictions_csv: lookup("PREDICTIONS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.predictions_csv),
        }
    }
}

/// Everything loaded once at startup and shared read-only afterwards
#[derive(Debug, Clone)]
pub struct AppData {
    pub champions: Vec<HistoricalChampionRecord>,
    pub model: LinearModel,
    pub prediction_log: Option<PathBuf>,
}

impl AppData {
    pub fn new(champions: Vec<HistoricalChampionRecord>, model: LinearModel) -> Self {
        Self {
            champions,
            model,
            prediction_log: None,
        }
    }

    pub fn champion_points(&self) -> Vec<u32> {
        self.champions.iter().map(|c| c.points).collect()
    }

    pub fn champion_stats(&self) -> Result<ChampionStats> {
        ChampionStats::from_points(&self.champion_points())
    }

    pub fn points_histogram(&self) -> Vec<HistogramBin> {
        histogram(&self.champion_points(), DEFAULT_BINS)
    }

    /// Run a prediction against the loaded model and history.
    /// Successful predictions are appended to the prediction log when one is configured.
    pub fn predict(
        &self,
        team_name: Option<&str>,
        input: &TeamSeasonInput,
    ) -> Result<PredictionResult> {
        let result =
            predict_championship(team_name, input, &self.model, &self.champion_points())?;
        info!("{}", result.format());

        if let Some(path) = &self.prediction_log {
            if let Err(e) = save_prediction_to_csv(input, &result, path) {
                warn!("Failed to save prediction to {}: {}", path.display(), e);
            }
        }

        Ok(result)
    }
}

/// Load the model artifact and champion history named by the config
pub fn load_app_data(config: &AppConfig) -> Result<AppData> {
    let model = load_model(&config.model_path)?;
    let champions = load_champion_records(&config.standings_path)?;
    if champions.is_empty() {
        warn!(
            "No champion rows (Pos == 1) in {}",
            config.standings_path.display()
        );
    }

    let mut data = AppData::new(champions, model);
    if config.save_csv {
        data.prediction_log = Some(config.predictions_csv.clone());
    }
    Ok(data)
}
