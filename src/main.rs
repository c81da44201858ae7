use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
    process,
};

use lectio::{
    application::{
        error::AppError,
        indexer::{HeadingIndexer, apply_heading_ids, render_outline},
        replay::replay_str,
        tracker::TrackerConfig,
    },
    config::{self, Command, IdsArgs, IndexArgs, ReplayArgs},
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Command::Index(args) => run_index(args),
        Command::Ids(args) => run_ids(args),
        Command::Replay(args) => run_replay(&settings, args),
    }
}

fn run_index(args: IndexArgs) -> Result<(), AppError> {
    let source = read_source(&args.file)?;
    let format = args.source_format();
    let markers = HeadingIndexer::new(args.region.as_str()).index(&source, format)?;

    info!(
        target = "lectio::index",
        path = %args.file.display(),
        ?format,
        headings = markers.len(),
        "Indexed document"
    );

    let mut out = BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut out, &markers)
            .map_err(|err| AppError::unexpected(format!("failed to encode markers: {err}")))?;
        writeln!(out).map_err(InfraError::from)?;
    } else {
        out.write_all(render_outline(&markers).as_bytes())
            .map_err(InfraError::from)?;
    }
    out.flush().map_err(InfraError::from)?;
    Ok(())
}

fn run_ids(args: IdsArgs) -> Result<(), AppError> {
    let html = read_source(&args.file)?;
    let markers = HeadingIndexer::new("document").index_html(&html)?;
    let rewritten = apply_heading_ids(&html, &markers)?;

    let mut out = io::stdout().lock();
    out.write_all(rewritten.as_bytes())
        .and_then(|()| out.flush())
        .map_err(InfraError::from)?;
    Ok(())
}

fn run_replay(settings: &config::Settings, args: ReplayArgs) -> Result<(), AppError> {
    let trace = read_source(&args.trace)?;
    let records = replay_str(
        &trace,
        TrackerConfig::from(&settings.tracker),
        settings.tracker.header_offset_px,
    )?;

    info!(
        target = "lectio::replay",
        path = %args.trace.display(),
        records = records.len(),
        "Replayed trace"
    );

    let mut out = BufWriter::new(io::stdout().lock());
    for record in &records {
        serde_json::to_writer(&mut out, record)
            .map_err(|err| AppError::unexpected(format!("failed to encode record: {err}")))?;
        writeln!(out).map_err(InfraError::from)?;
    }
    out.flush().map_err(InfraError::from)?;
    Ok(())
}

fn read_source(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|err| {
        AppError::validation(format!("failed to read {}: {err}", path.display()))
    })
}
