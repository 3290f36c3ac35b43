// src/main.rs
//
// CLI host for the resolution list screen.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use checkpoint_resolver::application::dto::{parse_import_rows, LaunchParams};
use checkpoint_resolver::application::{
    AppState, ConsoleView, ControllerDeps, FlowOutcome, ResolutionListController, ResolverConfig,
};
use checkpoint_resolver::db::{get_database_stats, verify_database_integrity};
use checkpoint_resolver::domain::{LaunchContext, ResolutionDirection, RowResolution};
use checkpoint_resolver::error::AppError;
use checkpoint_resolver::repositories::CheckpointRepository;

/// Exit status when the screen is canceled (bad launch parameters)
const EXIT_CANCELED: u8 = 2;

#[derive(Parser)]
#[command(name = "checkpoint-resolver")]
#[command(about = "Resolve checkpoint conflicts in a local data table", long_about = None)]
struct Cli {
    #[arg(long)]
    app_name: Option<String>,

    #[arg(long)]
    table_id: Option<String>,

    /// SQLite file; overrides CHECKPOINT_RESOLVER_DB
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show rows that still have checkpoints
    List,
    /// Keep the newest checkpoint of every listed row
    TakeNewest,
    /// Discard every checkpoint of every listed row
    TakeOldest,
    /// Load rows from a JSON file
    Import { file: PathBuf },
    /// Resolve a single row
    ResolveRow {
        row_id: String,
        #[arg(long, value_parser = parse_direction)]
        direction: ResolutionDirection,
    },
    /// Database size and integrity
    Stats,
}

fn parse_direction(value: &str) -> Result<ResolutionDirection, String> {
    ResolutionDirection::parse(value)
        .ok_or_else(|| format!("expected 'newest' or 'oldest', got '{}'", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // 1. CONFIGURATION
    let config = ResolverConfig::from_env()?.with_database_override(cli.database.clone());
    log::debug!("Using database {}", config.database_path.display());

    // 2. STATE (pool, schema, repositories, registry)
    let state = AppState::initialize(config)?;

    let params = LaunchParams {
        app_name: cli.app_name,
        table_id: cli.table_id,
    };

    // 3. DISPATCH
    match cli.command {
        Command::List => run_screen(&state, &params, None).await,
        Command::TakeNewest => {
            run_screen(&state, &params, Some(ResolutionDirection::TakeNewest)).await
        }
        Command::TakeOldest => {
            run_screen(&state, &params, Some(ResolutionDirection::TakeOldest)).await
        }
        Command::Import { file } => import_rows(&state, &params, file),
        Command::ResolveRow { row_id, direction } => {
            resolve_row(&state, &params, row_id, direction).await
        }
        Command::Stats => print_stats(&state),
    }
}

/// Drive one resolution list screen to completion.
async fn run_screen(
    state: &AppState,
    params: &LaunchParams,
    action: Option<ResolutionDirection>,
) -> anyhow::Result<ExitCode> {
    let mut controller = match ResolutionListController::create(
        params,
        None,
        ControllerDeps::from(state),
        ConsoleView::new(),
    ) {
        Ok(controller) => controller,
        Err(AppError::LaunchCanceled(reason)) => {
            log::warn!("Launch canceled: {}", reason);
            return Ok(ExitCode::from(EXIT_CANCELED));
        }
        Err(e) => return Err(e.into()),
    };

    controller.on_activity_created().await;
    controller.on_resume().await;

    let screen_done =
        controller.view().outcome().is_some() || controller.view().row_request().is_some();

    if let (false, Some(direction)) = (screen_done, action) {
        match direction {
            ResolutionDirection::TakeNewest => controller.take_all_newest().await,
            ResolutionDirection::TakeOldest => controller.take_all_oldest().await,
        }

        while controller.is_busy() {
            if !controller.pump().await {
                break;
            }
        }
    }

    controller.on_pause();
    controller.on_destroy();

    Ok(match controller.view().outcome() {
        Some(FlowOutcome::Canceled) => ExitCode::from(EXIT_CANCELED),
        _ => ExitCode::SUCCESS,
    })
}

fn launch_context(params: &LaunchParams) -> anyhow::Result<LaunchContext> {
    Ok(LaunchContext::from_params(
        params.app_name.as_deref(),
        params.table_id.as_deref(),
    )?)
}

fn import_rows(state: &AppState, params: &LaunchParams, file: PathBuf) -> anyhow::Result<ExitCode> {
    let context = launch_context(params)?;
    let json = std::fs::read_to_string(&file)?;

    let mut imported = 0;
    for dto in parse_import_rows(&json)? {
        let row = dto.into_checkpoint_row(&context.table_id)?;
        state.repository.save(&row)?;
        imported += 1;
    }

    log::info!("Imported {} row version(s) from {}", imported, file.display());
    println!("Imported {} row version(s) into '{}'", imported, context.table_id);
    Ok(ExitCode::SUCCESS)
}

async fn resolve_row(
    state: &AppState,
    params: &LaunchParams,
    row_id: String,
    direction: ResolutionDirection,
) -> anyhow::Result<ExitCode> {
    let context = launch_context(params)?;

    if state.registry.is_active() {
        anyhow::bail!("{}", AppError::ResolverAlreadyActive);
    }

    let repository = state.repository.clone();
    let table_id = context.table_id.clone();
    let target = row_id.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        repository.resolve_row(&table_id, &target, direction)
    })
    .await??;

    match outcome {
        RowResolution::Resolved => println!("Row '{}' resolved ({})", row_id, direction),
        RowResolution::Skipped(reason) => println!("Row '{}' not resolved: {}", row_id, reason),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_stats(state: &AppState) -> anyhow::Result<ExitCode> {
    let conn = state.pool.get()?;
    verify_database_integrity(&conn)?;
    let stats = get_database_stats(&conn)?;

    println!("Database:        {}", state.config.database_path.display());
    println!("Size:            {} bytes", stats.size_bytes);
    println!("Pages:           {} x {} bytes", stats.page_count, stats.page_size);
    println!("Tables:          {}", stats.table_count);
    println!("Checkpoints:     {}", stats.checkpoint_count);
    println!("Conflicted rows: {}", stats.conflicted_row_count);
    Ok(ExitCode::SUCCESS)
}
