use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use epl_title_odds::charts::{render_histogram_text, render_trend_text};
use epl_title_odds::{load_app_data, AppConfig, AppData, TeamSeasonInput};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cli",
    about = "Predict a Premier League side's final points and title chances"
)]
struct Cli {
    /// Model artifact (JSON); overrides MODEL_PATH
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Historical standings CSV; overrides STANDINGS_PATH
    #[arg(long, global = true)]
    standings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show historical champion points with distribution and trend charts
    History,
    /// Predict final points and championship probability
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Team name (optional)
    #[arg(long)]
    team: Option<String>,

    #[arg(short = 'w', long, value_parser = clap::value_parser!(u32).range(0..=38))]
    wins: u32,

    #[arg(short = 'd', long, value_parser = clap::value_parser!(u32).range(0..=38))]
    draws: u32,

    #[arg(short = 'l', long, value_parser = clap::value_parser!(u32).range(0..=38))]
    losses: u32,

    #[arg(long)]
    goals_for: u32,

    #[arg(long)]
    goals_against: u32,
}

fn print_history(data: &AppData) -> Result<()> {
    println!("HISTORICAL CHAMPION POINTS\n");
    for (i, champion) in data.champions.iter().enumerate() {
        println!(
            "{}. {} {} - {} pts",
            i + 1,
            champion.season,
            champion.team_label(),
            champion.points
        );
    }

    let stats = data
        .champion_stats()
        .context("Failed to summarise champion points")?;
    println!(
        "\n{} champions | mean {:.2} | std dev {:.2} | min {} | max {}",
        stats.count, stats.mean, stats.std_dev, stats.min, stats.max
    );

    println!("\nCHAMPION POINTS DISTRIBUTION\n");
    print!("{}", render_histogram_text(&data.points_histogram(), stats.mean));

    println!("\nCHAMPION POINTS PER SEASON\n");
    print!("{}", render_trend_text(&data.champions, stats.mean));
    Ok(())
}

fn run_prediction(data: &AppData, args: &PredictArgs) -> Result<()> {
    let input = TeamSeasonInput::new(
        args.wins,
        args.draws,
        args.losses,
        args.goals_for,
        args.goals_against,
    );
    println!("Goal difference (GD): {}\n", input.goal_difference());

    match data.predict(args.team.as_deref(), &input) {
        Ok(result) => {
            println!("Team: {}", result.display_name());
            println!("Predicted final points: {:.2}", result.predicted_points);
            println!(
                "Championship probability: {:.2}%",
                result.championship_probability
            );
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
        Err(e) => Err(e).context("Prediction failed"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut config = AppConfig::from_env();
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if let Some(standings) = cli.standings {
        config.standings_path = standings;
    }

    println!("Premier League Final Points & Title Probability\n");

    let data = load_app_data(&config).context("Model or standings file could not be loaded")?;

    match &cli.command {
        Command::History => print_history(&data),
        Command::Predict(args) => run_prediction(&data, args),
    }
}
