//! Parkwatch CLI
//!
//! Command-line interface for the parking violation monitoring backend and
//! the camera board.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use parkwatch::api::{ApiResponse, CameraListParams, ViolationQueryParams};
use parkwatch::client::DEFAULT_LATEST_LIMIT;
use parkwatch::{load_config, Config, Session};
use serde::Serialize;
use tracing::Level;

#[derive(Parser)]
#[command(name = "parkwatch")]
#[command(about = "Parking violation camera monitoring client")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the JSON status server
    Serve {
        /// Status server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    #[command(flatten)]
    Client(ClientCommand),
}

#[derive(Subcommand)]
enum ClientCommand {
    /// Show the cached camera connection status
    Status,
    /// Connect or disconnect the camera
    Toggle {
        #[arg(long, conflicts_with = "disconnect", required_unless_present = "disconnect")]
        connect: bool,
        #[arg(long)]
        disconnect: bool,
    },
    /// List video devices detected on the camera board
    Devices,
    /// List violation records
    Violations(ViolationFilter),
    /// Show one violation record
    Violation { id: i64 },
    /// Show violation statistics
    Stats,
    /// Show the most recent violation records
    Latest {
        #[arg(long, default_value_t = DEFAULT_LATEST_LIMIT)]
        limit: u32,
    },
    /// Show the system changelog
    Updates,
    /// List registered cameras
    Cameras {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        #[arg(long)]
        connected: Option<bool>,
    },
    /// Show the statistics overview
    Overview,
    /// Show every dashboard statistic in one report
    AllStats,
    /// Export violation records to a spreadsheet
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: ViolationFilter,
    },
}

#[derive(ClapArgs)]
struct ViolationFilter {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    camera_id: Option<i64>,
}

impl From<ViolationFilter> for ViolationQueryParams {
    fn from(filter: ViolationFilter) -> Self {
        Self {
            page_num: filter.page,
            page_size: filter.page_size,
            location: filter.location,
            start_date: filter.start_date,
            end_date: filter.end_date,
            camera_id: filter.camera_id,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> parkwatch::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_data<T: Serialize>(response: ApiResponse<T>) -> parkwatch::Result<()> {
    match response.into_result()? {
        Some(data) => print_json(&data),
        None => Ok(()),
    }
}

async fn run(command: Command, mut config: Config) -> parkwatch::Result<()> {
    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.dashboard.port = port;
            }
            tracing::info!("Starting status server");
            parkwatch::serve(config).await
        }
        Command::Client(command) => {
            let session = Session::new(&config)?;
            run_client(command, &session).await
        }
    }
}

async fn run_client(command: ClientCommand, session: &Session) -> parkwatch::Result<()> {
    match command {
        ClientCommand::Status => {
            let view = session.store.get_status().await;
            print_json(&view)?;
            if let Some(url) = session.store.stream_url().await {
                println!("Stream: {}", url);
            }
        }
        ClientCommand::Toggle { connect, .. } => {
            let message = session.store.toggle(connect).await?;
            println!("{}", message);
        }
        ClientCommand::Devices => print_data(session.camera.devices().await?)?,
        ClientCommand::Violations(filter) => {
            let page = session
                .backend
                .violation_list(&filter.into())
                .await?
                .into_data()?;
            for record in &page.records {
                let confidence = record.confidence();
                println!(
                    "#{:<6} camera {:<4} {:<20} {:>6}% ({})  {}",
                    record.id,
                    record.camera_id,
                    record.upload_time.as_deref().unwrap_or("-"),
                    confidence.display(),
                    confidence.level(),
                    record.location
                );
            }
            println!("{} of {} records", page.records.len(), page.total);
        }
        ClientCommand::Violation { id } => {
            print_data(session.backend.violation_detail(id).await?)?;
        }
        ClientCommand::Stats => print_data(session.backend.violation_stats().await?)?,
        ClientCommand::Latest { limit } => print_data(session.backend.latest_records(limit).await?)?,
        ClientCommand::Updates => print_data(session.backend.system_updates().await?)?,
        ClientCommand::Cameras {
            page,
            page_size,
            connected,
        } => {
            let params = CameraListParams {
                page_num: page,
                page_size,
                connected,
                ..Default::default()
            };
            print_data(session.backend.camera_list(&params).await?)?;
        }
        ClientCommand::Overview => print_data(session.backend.overview_stats().await?)?,
        ClientCommand::AllStats => print_data(session.backend.all_stats().await?)?,
        ClientCommand::Export { output, filter } => {
            let bytes = session.backend.export_violations(&filter.into()).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "violations-{}.xlsx",
                    chrono::Local::now().format("%Y%m%d-%H%M%S")
                ))
            });
            std::fs::write(&path, &bytes)?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}",
        args.config,
        args.log_level
    );

    let config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    run(args.command, config).await?;
    Ok(())
}
