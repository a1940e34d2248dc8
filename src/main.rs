use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};

use ctab::controller::Controller;
use ctab::domain::{CtConfig, CtError, PAGE_SIZE_OPTIONS};
use ctab::loader::load_dataset;
use ctab::model::{Model, Status};
use ctab::record::{FieldKey, Identity};
use ctab::state::{SortDirection, TableState};
use ctab::ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Data file in CSV, JSON, Parquet or Arrow format.
    path: String,
    /// Rows per page.
    #[arg(long, default_value_t = PAGE_SIZE_OPTIONS[0], value_parser = parse_page_size)]
    page_size: usize,
    /// Column to sort by initially.
    #[arg(long, default_value = "campaign_id")]
    sort_by: FieldKey,
    /// Start with a descending sort.
    #[arg(long)]
    descending: bool,
    /// Comma separated fields that identify a row for selection.
    #[arg(long, default_value = "ad_id,day")]
    identity: Identity,
    /// Write logs to this file. Filter with CTAB_LOG (default "info").
    #[arg(long)]
    log_file: Option<String>,
    /// Print the selected row identities as JSON on exit.
    #[arg(long)]
    print_selection: bool,
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{e}"))?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}"))
    }
}

fn expand_path(path: &str) -> Result<PathBuf, CtError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| CtError::InvalidArgument(e.to_string()))
}

/// Logs go to a file only, the terminal belongs to the table.
fn start_logging(log_file: Option<&Path>) -> Result<(), CtError> {
    let file_layer = match log_file {
        Some(path) => {
            let filter = EnvFilter::try_from_env("CTAB_LOG").unwrap_or_else(|_| "info".into());
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter),
            )
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(ErrorLayer::default())
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CtError::LoggingFailed(e.to_string()))
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args).and_then(|state| report(&args, &state)) {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn report(args: &Args, state: &TableState) -> Result<(), CtError> {
    if args.print_selection {
        println!("{}", state.selection_json()?);
    }
    Ok(())
}

fn run(args: &Args) -> Result<TableState, CtError> {
    let log_file = args.log_file.as_deref().map(expand_path).transpose()?;
    start_logging(log_file.as_deref())?;

    let direction = if args.descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let cfg = CtConfig::default()
        .with_page_size(args.page_size)
        .with_sort_field(args.sort_by)
        .with_sort_direction(direction)
        .with_identity(args.identity.clone());
    info!("Starting ctab with {cfg:?}");

    let dataset = load_dataset(&expand_path(&args.path)?)?;
    let (width, _height) = ratatui::crossterm::terminal::size()?;
    let mut model = Model::init(&cfg, dataset, width as usize)?;
    let ui = TableUI;
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut model, &ui, &controller, &mut terminal);
    ratatui::restore();
    result?;

    info!(
        "Quit with {} selected rows ({:?})",
        model.state().selection.len(),
        model.identity().fields()
    );
    Ok(model.state().clone())
}

fn event_loop(
    model: &mut Model,
    ui: &TableUI,
    controller: &Controller,
    terminal: &mut ratatui::DefaultTerminal,
) -> Result<(), CtError> {
    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(model, f))?;

        if let Some(message) = controller.handle_event()? {
            model.update(Some(message))?;
        };
    }
    Ok(())
}
