//! CLI entry point for the station traffic tool.
//!
//! Loads bike-share stations and trips once, then answers time-of-day
//! queries: a single slider position, a sweep over the whole day, or the
//! unfiltered station list.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use station_traffic::{
    TimeFilter, TrafficAggregator,
    config::Config,
    fetch::BasicClient,
    loader::try_load_dataset,
    model::Station,
    output::{append_record, print_json, print_pretty, write_json, write_pretty, write_records},
    scales::{RadiusScale, StationMarker, build_markers, max_traffic},
    stats::TrafficStats,
    time_filter::MINUTES_PER_DAY,
};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "station_traffic")]
#[command(about = "Bike-share station traffic by time of day", long_about = None)]
struct Cli {
    /// Stations JSON file or URL (overrides STATIONS_URL)
    #[arg(long, global = true)]
    stations: Option<String>,

    /// Trips CSV file or URL (overrides TRIPS_URL)
    #[arg(long, global = true)]
    trips: Option<String>,

    /// Minutes on each side of the selected time (overrides TRAFFIC_WINDOW_MINUTES)
    #[arg(short, long, global = true)]
    window: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Station traffic for one slider position
    Snapshot {
        /// Minute of the day in [0, 1439], or -1 for any time
        #[arg(short, long, default_value = "-1", allow_negative_numbers = true)]
        time: TimeFilter,

        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,

        /// File to write to instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Move the slider across the whole day and append one summary row per position
    Sweep {
        /// Minutes between slider positions
        #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u16).range(1..=1440))]
        step: u16,

        /// CSV file to append summaries to
        #[arg(short, long, default_value = "sweep.csv")]
        output: String,
    },
    /// List stations with their unfiltered traffic
    Stations,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    time_filter: TimeFilter,
    label: String,
    stats: &'a TrafficStats,
    stations: &'a [StationMarker],
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.stations, cli.trips, cli.window);

    let client = BasicClient::with_timeout(Duration::from_secs(60))?;
    let Some(dataset) = try_load_dataset(&client, &config.sources).await else {
        return Ok(ExitCode::FAILURE);
    };
    let (stations, aggregator) = dataset.into_aggregator(config.window_radius);

    match cli.command {
        Commands::Snapshot {
            time,
            format,
            output,
        } => snapshot(&aggregator, &stations, time, format, output.as_deref())?,
        Commands::Sweep { step, output } => sweep(&aggregator, &stations, step, &output)?,
        Commands::Stations => {
            let traffic = aggregator.compute_station_traffic(&stations, TimeFilter::AnyTime);
            for (station, traffic) in stations.iter().zip(&traffic) {
                info!(
                    short_name = %station.short_name,
                    name = station.name.as_deref().unwrap_or(""),
                    lon = station.lon,
                    lat = station.lat,
                    departures = traffic.departures,
                    arrivals = traffic.arrivals,
                    total_traffic = traffic.total_traffic,
                    "Station"
                );
            }
            print_json(&TrafficStats::from_traffic(
                TimeFilter::AnyTime,
                aggregator.window_radius(),
                &traffic,
            ))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/station_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("station_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn open_output(output: Option<&str>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {path}"))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    Ok(writer)
}

/// Computes markers and a summary for one slider position.
#[tracing::instrument(skip_all, fields(filter = %filter))]
fn snapshot(
    aggregator: &TrafficAggregator,
    stations: &[Station],
    filter: TimeFilter,
    format: Format,
    output: Option<&str>,
) -> Result<()> {
    // the radius domain always comes from the unfiltered maximum
    let baseline = aggregator.compute_station_traffic(stations, TimeFilter::AnyTime);
    let scale = RadiusScale::for_filter(filter, max_traffic(&baseline));

    let traffic = aggregator.compute_station_traffic(stations, filter);
    let markers = build_markers(stations, &traffic, &scale);
    let stats = TrafficStats::from_traffic(filter, aggregator.window_radius(), &traffic);

    match format {
        Format::Pretty => {
            let active = markers.iter().filter(|m| m.total_traffic > 0);
            match output {
                Some(_) => {
                    let mut writer = open_output(output)?;
                    writeln!(writer, "Slider position: {filter}")?;
                    for marker in active {
                        writeln!(writer, "{}", marker.tooltip)?;
                    }
                    write_pretty(writer, &stats)?;
                }
                None => {
                    info!(selected_time = %filter, "Slider position");
                    for marker in active {
                        info!(
                            short_name = %marker.short_name,
                            radius = marker.radius,
                            departure_flow = ?marker.departure_flow,
                            "{}",
                            marker.tooltip
                        );
                    }
                    print_pretty(&stats);
                }
            }
        }
        Format::Json => {
            let snapshot = Snapshot {
                time_filter: filter,
                label: filter.label(),
                stats: &stats,
                stations: &markers,
            };
            write_json(open_output(output)?, &snapshot)?;
        }
        Format::Csv => write_records(open_output(output)?, &markers)?,
    }

    info!(
        stations_with_traffic = stats.stations_with_traffic,
        active_pct = stats.active_pct,
        "Snapshot complete"
    );
    Ok(())
}

/// Drags the slider from "any time" across the day in `step`-minute moves.
#[tracing::instrument(skip(aggregator, stations))]
fn sweep(
    aggregator: &TrafficAggregator,
    stations: &[Station],
    step: u16,
    output: &str,
) -> Result<()> {
    let positions = std::iter::once(TimeFilter::AnyTime).chain(
        (0..MINUTES_PER_DAY)
            .step_by(usize::from(step))
            .map(|minute| TimeFilter::try_from(i32::from(minute)))
            .collect::<Result<Vec<_>, _>>()?,
    );

    let mut rows = 0;
    for filter in positions {
        let traffic = aggregator.compute_station_traffic(stations, filter);
        let stats = TrafficStats::from_traffic(filter, aggregator.window_radius(), &traffic);
        append_record(output, &stats)?;
        rows += 1;
    }

    info!(rows, output, "Sweep complete");
    Ok(())
}
