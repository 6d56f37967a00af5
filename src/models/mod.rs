use serde::{Deserialize, Serialize};

/// Number of matches in a full English top-flight season
pub const SEASON_MATCHES: u64 = 38;

/// Column names the model was trained on, in order
pub const FEATURE_NAMES: [&str; 6] = ["W", "D", "L", "GF", "GA", "GD"];

/// A team's season record as entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamSeasonInput {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamSeasonInput {
    pub fn new(wins: u32, draws: u32, losses: u32, goals_for: u32, goals_against: u32) -> Self {
        Self {
            wins,
            draws,
            losses,
            goals_for,
            goals_against,
        }
    }

    /// Goals for minus goals against (negative for a leaky side)
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    pub fn matches_played(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.draws) + u64::from(self.losses)
    }

    /// Build the model's input row in training column order
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector {
            values: [
                f64::from(self.wins),
                f64::from(self.draws),
                f64::from(self.losses),
                f64::from(self.goals_for),
                f64::from(self.goals_against),
                self.goal_difference() as f64,
            ],
        }
    }
}

/// A single-row feature table: `[W, D, L, GF, GA, GD]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; 6],
}

impl FeatureVector {
    pub fn names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    /// (column, value) pairs, handy for logging
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

/// One row of the historical standings CSV. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Pos")]
    pub pos: u32,
    #[serde(rename = "Team", default)]
    pub team: Option<String>,
    #[serde(rename = "Pts")]
    pub pts: u32,
}

/// Final standings row of a season's champion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalChampionRecord {
    pub season: String,
    pub team: Option<String>,
    pub points: u32,
}

impl HistoricalChampionRecord {
    pub fn team_label(&self) -> &str {
        self.team.as_deref().unwrap_or("-")
    }
}

/// Predicted points and title probability for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub team_name: Option<String>,
    pub predicted_points: f64,
    /// Percentage in [0, 100]
    pub championship_probability: f64,
}

impl PredictionResult {
    pub fn display_name(&self) -> &str {
        match self.team_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Not specified",
        }
    }

    pub fn format(&self) -> String {
        format!(
            "Team: {} | Predicted points: {:.2} | Championship probability: {:.2}%",
            self.display_name(),
            self.predicted_points,
            self.championship_probability
        )
    }
}
