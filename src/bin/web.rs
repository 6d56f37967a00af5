use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use epl_title_odds::charts::HistogramBin;
use epl_title_odds::{
    load_app_data, AppConfig, AppData, PredictionResult, TeamSeasonInput, TitleOddsError,
    SEASON_MATCHES,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{error, info};

// Custom filters for formatting
mod filters {
    pub fn format_points(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}", value))
    }

    pub fn format_percent(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}%", value))
    }

    pub fn format_width(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.1}", value.clamp(0.0, 100.0)))
    }
}

struct ChampionRow {
    season: String,
    team: String,
    points: u32,
}

/// One horizontal bar in a chart
struct Bar {
    label: String,
    value: String,
    width_pct: f64,
    highlight: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    active_page: String,
    champions: Vec<ChampionRow>,
    mean_points: String,
    std_dev_points: String,
    distribution: Vec<Bar>,
    trend: Vec<Bar>,
    form: PredictionForm,
    goal_difference: i64,
    match_total: u64,
    warning: Option<String>,
    error: Option<String>,
    result: Option<PredictionResult>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    active_page: String,
    message: String,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Loaded once at startup; the error message is kept so every page can show it
type SharedData = Arc<Result<AppData, String>>;

// Numbers stay raw strings so a cleared input box becomes an inline warning
// rather than a query rejection.
#[derive(Debug, Clone, Deserialize)]
struct PredictionForm {
    #[serde(default)]
    team: String,
    #[serde(default)]
    wins: String,
    #[serde(default)]
    draws: String,
    #[serde(default)]
    losses: String,
    #[serde(default)]
    goals_for: String,
    #[serde(default)]
    goals_against: String,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            team: String::new(),
            wins: "0".to_string(),
            draws: "0".to_string(),
            losses: "0".to_string(),
            goals_for: "0".to_string(),
            goals_against: "0".to_string(),
        }
    }
}

fn parse_count(raw: &str, label: &str) -> Result<u32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("{} is required", label));
    }
    raw.parse()
        .map_err(|_| format!("{} must be a whole number, got \"{}\"", label, raw))
}

impl PredictionForm {
    fn input(&self) -> Result<TeamSeasonInput, String> {
        Ok(TeamSeasonInput::new(
            parse_count(&self.wins, "Wins (W)")?,
            parse_count(&self.draws, "Draws (D)")?,
            parse_count(&self.losses, "Losses (L)")?,
            parse_count(&self.goals_for, "Goals for (GF)")?,
            parse_count(&self.goals_against, "Goals against (GA)")?,
        ))
    }

    /// Best-effort values for the live GD and match total, unparsable boxes count as 0
    fn partial_input(&self) -> TeamSeasonInput {
        let lenient = |raw: &str| raw.trim().parse::<u32>().unwrap_or(0);
        TeamSeasonInput::new(
            lenient(&self.wins),
            lenient(&self.draws),
            lenient(&self.losses),
            lenient(&self.goals_for),
            lenient(&self.goals_against),
        )
    }
}

fn distribution_bars(bins: &[HistogramBin], mean: Option<f64>) -> Vec<Bar> {
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mean_bin = mean.and_then(|m| bins.iter().position(|b| b.contains(m)));
    bins.iter()
        .enumerate()
        .map(|(i, b)| Bar {
            label: format!("{:.1}–{:.1}", b.lower, b.upper),
            value: b.count.to_string(),
            width_pct: b.count as f64 * 100.0 / max_count as f64,
            highlight: mean_bin == Some(i),
        })
        .collect()
}

/// Per-season bars followed by a highlighted mean reference bar
fn trend_bars(data: &AppData, mean: Option<f64>) -> Vec<Bar> {
    let max_points = data.champions.iter().map(|c| c.points).max().unwrap_or(0).max(1);
    let mut bars: Vec<Bar> = data
        .champions
        .iter()
        .map(|c| Bar {
            label: c.season.clone(),
            value: c.points.to_string(),
            width_pct: f64::from(c.points) * 100.0 / f64::from(max_points),
            highlight: false,
        })
        .collect();

    if let Some(mean) = mean {
        bars.push(Bar {
            label: "Champion mean".to_string(),
            value: format!("{:.1}", mean),
            width_pct: mean * 100.0 / f64::from(max_points),
            highlight: true,
        });
    }
    bars
}

fn render_index(data: &AppData, form: PredictionForm, run_prediction: bool) -> IndexTemplate {
    let shown = form.partial_input();
    let parsed = form
        .input()
        .and_then(|input| input.validate().map(|_| input).map_err(|e| e.to_string()));

    let mut warning = None;
    let mut error = None;
    let mut result = None;
    match parsed {
        Ok(input) if run_prediction => match data.predict(Some(form.team.as_str()), &input) {
            Ok(r) => result = Some(r),
            Err(e) => error = Some(e.to_string()),
        },
        Ok(_) => {}
        Err(message) => warning = Some(message),
    }

    let stats = data.champion_stats().ok();
    let format_stat = |value: Option<f64>| match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    };

    IndexTemplate {
        active_page: "home".to_string(),
        champions: data
            .champions
            .iter()
            .map(|c| ChampionRow {
                season: c.season.clone(),
                team: c.team_label().to_string(),
                points: c.points,
            })
            .collect(),
        mean_points: format_stat(stats.map(|s| s.mean)),
        std_dev_points: format_stat(stats.map(|s| s.std_dev)),
        distribution: distribution_bars(&data.points_histogram(), stats.map(|s| s.mean)),
        trend: trend_bars(data, stats.map(|s| s.mean)),
        goal_difference: shown.goal_difference(),
        match_total: shown.matches_played(),
        form,
        warning,
        error,
        result,
    }
}

fn unavailable(message: &str) -> Response {
    let template = ErrorTemplate {
        active_page: "home".to_string(),
        message: message.to_string(),
    };
    (StatusCode::SERVICE_UNAVAILABLE, HtmlTemplate(template)).into_response()
}

async fn home(State(data): State<SharedData>) -> impl IntoResponse {
    match data.as_ref() {
        Ok(d) => HtmlTemplate(render_index(d, PredictionForm::default(), false)).into_response(),
        Err(message) => unavailable(message),
    }
}

async fn predict(
    State(data): State<SharedData>,
    Query(form): Query<PredictionForm>,
) -> impl IntoResponse {
    match data.as_ref() {
        Ok(d) => HtmlTemplate(render_index(d, form, true)).into_response(),
        Err(message) => unavailable(message),
    }
}

async fn api_predict(
    State(data): State<SharedData>,
    Query(form): Query<PredictionForm>,
) -> Response {
    let data = match data.as_ref() {
        Ok(d) => d,
        Err(message) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response();
        }
    };

    let input = match form.input() {
        Ok(input) => input,
        Err(message) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response();
        }
    };

    match data.predict(Some(form.team.as_str()), &input) {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            let status = match &e {
                TitleOddsError::InvalidMatchCount { .. }
                | TitleOddsError::ZeroVariance { .. }
                | TitleOddsError::EmptyHistory
                | TitleOddsError::FeatureSchemaMismatch { .. }
                | TitleOddsError::InvalidModelOutput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TitleOddsError::MissingArtifact { .. }
                | TitleOddsError::Io(_)
                | TitleOddsError::Csv(_)
                | TitleOddsError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

fn app(data: SharedData) -> Router {
    Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/predict", get(predict))
        .route("/api/predict", get(api_predict))
        .with_state(data)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    info!("Loading model and standings...");
    let data = match load_app_data(&config) {
        Ok(data) => {
            info!(
                "Loaded {} champion seasons, season length {} matches",
                data.champions.len(),
                SEASON_MATCHES
            );
            Arc::new(Ok(data))
        }
        Err(e) => {
            error!("Error loading data: {}", e);
            error!("Server will start but every page will show the error");
            Arc::new(Err(format!(
                "Model or standings file not found! Please provide both files. ({})",
                e
            )))
        }
    };

    info!("Starting web server at http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app(data)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use epl_title_odds::model::LinearModel;
    use epl_title_odds::HistoricalChampionRecord;
    use tower::ServiceExt;

    fn sample_state() -> SharedData {
        state_with_model(LinearModel::new([3.0, 1.0, 0.0, 0.0, 0.0, 0.0], 0.0))
    }

    fn state_with_model(model: LinearModel) -> SharedData {
        let champions = [
            ("2017-18", 100),
            ("2018-19", 98),
            ("2019-20", 99),
            ("2020-21", 86),
            ("2021-22", 93),
        ]
        .iter()
        .map(|(season, points)| HistoricalChampionRecord {
            season: season.to_string(),
            team: None,
            points: *points,
        })
        .collect();
        Arc::new(Ok(AppData::new(champions, model)))
    }

    async fn get_body(state: SharedData, uri: &str) -> (StatusCode, String) {
        let response = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_home_shows_history_and_match_warning() {
        let (status, body) = get_body(sample_state(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("2019-20"));
        assert!(body.contains("Total matches must be 38. Currently: 0."));
    }

    #[tokio::test]
    async fn test_predict_page_renders_result() {
        let (status, body) = get_body(
            sample_state(),
            "/predict?team=Arsenal&wins=30&draws=5&losses=3&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Arsenal"));
        assert!(body.contains("95.00"));
        assert!(!body.contains("Total matches must be 38"));
    }

    #[tokio::test]
    async fn test_predict_page_blocks_invalid_match_count() {
        let (status, body) = get_body(
            sample_state(),
            "/predict?team=&wins=30&draws=5&losses=4&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Currently: 39."));
        assert!(!body.contains("Predicted final points"));
    }

    #[tokio::test]
    async fn test_cleared_input_box_shows_inline_warning() {
        let (status, body) = get_body(
            sample_state(),
            "/predict?team=&wins=30&draws=5&losses=3&goals_for=&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Goals for (GF) is required"));
        assert!(body.contains("Matches entered: 38"));
        assert!(!body.contains("Predicted final points"));

        let (status, body) = get_body(
            sample_state(),
            "/predict?wins=abc&draws=5&losses=3&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Wins (W) must be a whole number"));

        let (status, body) = get_body(
            sample_state(),
            "/api/predict?wins=30&draws=5&losses=3&goals_for=&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Goals for (GF) is required"));
    }

    #[tokio::test]
    async fn test_trend_chart_has_mean_line() {
        let (_, body) = get_body(sample_state(), "/").await;
        assert_eq!(body.matches("mean-line").count(), 1);
        assert!(body.contains("Champion mean"));
        assert!(body.contains("95.2"));
    }

    #[tokio::test]
    async fn test_api_predict_schema_mismatch_is_unprocessable() {
        let mut model = LinearModel::new([3.0, 1.0, 0.0, 0.0, 0.0, 0.0], 0.0);
        model.feature_names.swap(0, 1);

        let (status, body) = get_body(
            state_with_model(model),
            "/api/predict?wins=30&draws=5&losses=3&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Feature schema mismatch"));
    }

    #[tokio::test]
    async fn test_api_predict() {
        let (status, body) = get_body(
            sample_state(),
            "/api/predict?wins=30&draws=5&losses=3&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let result: PredictionResult = serde_json::from_str(&body).unwrap();
        assert_eq!(result.predicted_points, 95.0);
        assert_eq!(result.team_name, None);
        // Just under the 95.2 champion mean
        assert!((result.championship_probability - 49.04).abs() < 0.05);

        let (status, body) = get_body(
            sample_state(),
            "/api/predict?wins=10&draws=5&losses=3&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Currently: 18."));
    }

    #[tokio::test]
    async fn test_missing_artifacts_block_every_page() {
        let state: SharedData = Arc::new(Err("Model file not found: model.json".to_string()));
        let (status, body) = get_body(state.clone(), "/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("Model file not found"));

        let (status, _) = get_body(
            state,
            "/api/predict?wins=30&draws=5&losses=3&goals_for=90&goals_against=25",
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
