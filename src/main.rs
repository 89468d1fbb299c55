// src/main.rs
#![recursion_limit = "256"]
use clap::Parser;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use futures::future::join_all;
use mlb_sportsdata::cli::{Args, is_config_operation};
use mlb_sportsdata::config::Config;
use mlb_sportsdata::data_fetcher::api::FeedSource;
use mlb_sportsdata::data_fetcher::cache::FeedCache;
use mlb_sportsdata::error::AppError;
use mlb_sportsdata::logging::setup_logging;
use mlb_sportsdata::mlb::{Game, GameSummary, HttpSportsData, TeamRef};
use std::io::stdout;
use tracing::{info, warn};

/// Outcome of resolving one game for display
enum GameLine {
    Summary(GameSummary),
    Failed { id: String, error: AppError },
}

async fn resolve_game<F: FeedSource, C: FeedCache>(
    game: &Game<F, C>,
    team: Option<&TeamRef>,
) -> Option<GameLine> {
    let result: Result<Option<GameSummary>, AppError> = async {
        if let Some(team) = team
            && !game.team_playing(team).await?
        {
            return Ok(None);
        }
        game.prefetch().await?;
        game.summary().await.map(Some)
    }
    .await;

    match result {
        Ok(summary) => summary.map(GameLine::Summary),
        Err(error) => {
            warn!("Failed to resolve game {}: {}", game.id(), error);
            Some(GameLine::Failed {
                id: game.id().to_string(),
                error,
            })
        }
    }
}

fn status_color(status: &str) -> Color {
    match status {
        "closed" | "complete" => Color::Green,
        "inprogress" => Color::Yellow,
        "postponed" | "cancelled" => Color::DarkGrey,
        _ => Color::White,
    }
}

fn print_lines(lines: &[GameLine]) -> Result<(), AppError> {
    let mut stdout = stdout();

    if lines.is_empty() {
        println!("No games scheduled");
        return Ok(());
    }

    for line in lines {
        match line {
            GameLine::Summary(summary) => execute!(
                stdout,
                SetForegroundColor(status_color(&summary.status)),
                Print(summary.scoreline()),
                ResetColor,
                Print("\n")
            )?,
            GameLine::Failed { id, error } => execute!(
                stdout,
                SetForegroundColor(Color::Red),
                Print(format!("{id}  unavailable: {error}")),
                ResetColor,
                Print("\n")
            )?,
        }
    }

    Ok(())
}

fn print_json(lines: &[GameLine]) -> Result<(), AppError> {
    let summaries: Vec<&GameSummary> = lines
        .iter()
        .filter_map(|line| match line {
            GameLine::Summary(summary) => Some(summary),
            GameLine::Failed { .. } => None,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

async fn update_config(args: &Args) -> Result<(), AppError> {
    let mut config = Config::read().await?;

    if let Some(api_key) = &args.new_api_key {
        config.api_key = api_key.clone();
    }

    if let Some(new_log_path) = &args.new_log_file_path {
        config.log_file_path = Some(new_log_path.clone());
    } else if args.clear_log_file_path {
        config.log_file_path = None;
        println!("Custom log file path cleared. Using default location.");
    }

    config.save().await?;
    println!("Config updated successfully!");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.version {
        println!(
            "{} {}",
            mlb_sportsdata::NAME,
            mlb_sportsdata::VERSION
        );
        return Ok(());
    }

    let (log_file_path, _guard) = setup_logging(&args).await?;
    info!("Logs are being written to: {log_file_path}");

    if args.list_config {
        Config::display().await?;
        return Ok(());
    }

    if is_config_operation(&args) {
        return update_config(&args).await;
    }

    // Load config first to fail early if there's an issue
    let config = Config::load().await?;
    let sports_data = HttpSportsData::from_config(&config)?;

    let dates = args.query_dates()?;
    let partition = args.cache_partition();
    let team = args.team.as_deref().map(TeamRef::mlb);

    let games = sports_data.games(&dates, &partition).await?;
    let lines: Vec<GameLine> = join_all(games.iter().map(|game| resolve_game(game, team.as_ref())))
        .await
        .into_iter()
        .flatten()
        .collect();

    info!(
        "Resolved {} of {} games for partition {}",
        lines.len(),
        games.len(),
        partition
    );

    if args.json {
        print_json(&lines)
    } else {
        print_lines(&lines)
    }
}
