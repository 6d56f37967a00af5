use crate::error::{ArtifactKind, Result, TitleOddsError};
use crate::models::{HistoricalChampionRecord, PredictionResult, StandingRow, TeamSeasonInput};
use crate::utils::model::LinearModel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

// Serializes appends so concurrent predictions never interleave or double the header
static PREDICTION_LOG_LOCK: Mutex<()> = Mutex::new(());

fn open_artifact(path: &Path, kind: ArtifactKind) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TitleOddsError::MissingArtifact {
            kind,
            path: path.to_path_buf(),
        },
        _ => TitleOddsError::Io(e),
    })
}

/// Read every row of a standings CSV (needs `Season`, `Pos` and `Pts` columns)
pub fn load_standings_from_reader<R: Read>(reader: R) -> Result<Vec<StandingRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn load_standings(path: &Path) -> Result<Vec<StandingRow>> {
    let file = open_artifact(path, ArtifactKind::Standings)?;
    load_standings_from_reader(file)
}

/// Keep the title winners (position 1), in file order
pub fn champion_records(rows: &[StandingRow]) -> Vec<HistoricalChampionRecord> {
    rows.iter()
        .filter(|row| row.pos == 1)
        .map(|row| HistoricalChampionRecord {
            season: row.season.clone(),
            team: row.team.clone(),
            points: row.pts,
        })
        .collect()
}

/// Load the standings file and extract its champions
pub fn load_champion_records(path: &Path) -> Result<Vec<HistoricalChampionRecord>> {
    let rows = load_standings(path)?;
    let champions = champion_records(&rows);
    info!(
        "Loaded {} standings rows ({} champions) from {}",
        rows.len(),
        champions.len(),
        path.display()
    );
    Ok(champions)
}

/// Load the regression artifact from JSON
pub fn load_model(path: &Path) -> Result<LinearModel> {
    let file = open_artifact(path, ArtifactKind::Model)?;
    let model: LinearModel = serde_json::from_reader(file)?;
    info!(
        "Loaded model with {} coefficients from {}",
        model.coefficients.len(),
        path.display()
    );
    Ok(model)
}

#[derive(Debug, Serialize)]
struct PredictionLogRow<'a> {
    timestamp: DateTime<Utc>,
    team: &'a str,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
    goal_difference: i64,
    predicted_points: f64,
    championship_probability: f64,
}

/// Append a prediction to a CSV log, writing the header for a new file
pub fn save_prediction_to_csv(
    input: &TeamSeasonInput,
    result: &PredictionResult,
    filename: &Path,
) -> Result<()> {
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let _guard = PREDICTION_LOG_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)?;
    let is_empty = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_empty)
        .from_writer(file);

    writer.serialize(PredictionLogRow {
        timestamp: Utc::now(),
        team: result.display_name(),
        wins: input.wins,
        draws: input.draws,
        losses: input.losses,
        goals_for: input.goals_for,
        goals_against: input.goals_against,
        goal_difference: input.goal_difference(),
        predicted_points: result.predicted_points,
        championship_probability: result.championship_probability,
    })?;
    writer.flush()?;
    Ok(())
}
