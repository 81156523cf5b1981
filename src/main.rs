use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gce_igm_datasource::config::Config;
use gce_igm_datasource::gcp::client::GcpClient;
use gce_igm_datasource::gcp::http::format_gcp_error;
use gce_igm_datasource::resource::{DataSourceInput, InstanceGroupManagerDataSource, ReadOutcome};
use gce_igm_datasource::ReadError;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Read a Compute Engine instance group manager and print it as JSON
#[derive(Parser, Debug)]
#[command(name = "gce-igm-datasource", version, about, long_about = None)]
struct Args {
    /// Name of the instance group manager
    #[arg(short, long)]
    name: Option<String>,

    /// Self-link of the instance group manager (overrides name and location)
    #[arg(long)]
    self_link: Option<String>,

    /// Project of the instance group manager
    #[arg(short, long)]
    project: Option<String>,

    /// Zone of a zonal instance group manager
    #[arg(short, long)]
    zone: Option<String>,

    /// Region of a regional instance group manager
    #[arg(short, long)]
    region: Option<String>,

    /// Read a regional instance group manager
    #[arg(long)]
    regional: bool,

    /// Recorded as wait_for_instances
    #[arg(long)]
    wait_for_instances: bool,

    /// Recorded as wait_for_instances_status (STABLE or UPDATED)
    #[arg(long, default_value = "STABLE")]
    wait_for_instances_status: String,

    /// OAuth2 access token to use instead of Application Default Credentials
    #[arg(long)]
    access_token: Option<String>,

    /// Compute Engine API endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Print the data source schema and exit
    #[arg(long)]
    schema: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

impl Args {
    fn input(&self) -> DataSourceInput {
        DataSourceInput {
            name: self.name.clone(),
            self_link: self.self_link.clone(),
            zone: self.zone.clone(),
            region: self.region.clone(),
            project: self.project.clone(),
            wait_for_instances: self.wait_for_instances,
            wait_for_instances_status: self.wait_for_instances_status.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gce-igm-datasource started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir
            .join("gce-igm-datasource")
            .join("gce-igm-datasource.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gce-igm-datasource").join("gce-igm-datasource.log");
    }
    PathBuf::from("gce-igm-datasource.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let data_source = if args.regional {
        InstanceGroupManagerDataSource::regional()
    } else {
        InstanceGroupManagerDataSource::zonal()
    };

    if args.schema {
        println!("{}", serde_json::to_string_pretty(data_source.schema())?);
        return Ok(());
    }

    let mut config = Config::load();
    if args.endpoint.is_some() {
        config.compute_endpoint = args.endpoint.clone();
    }
    let mut provider = config.into_provider_config();
    provider.access_token = args.access_token.clone();

    tracing::info!(
        "Default project: {:?}, zone: {:?}, region: {:?}",
        provider.project,
        provider.zone,
        provider.region
    );

    let client = GcpClient::new(&provider).await?;
    let mut record = data_source.new_record();

    match data_source.read(&client, &provider, &args.input(), &mut record).await {
        Ok(ReadOutcome::Found) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        },
        Ok(ReadOutcome::Cleared) => {
            println!("null");
        },
        Err(ReadError::Api { resource, source }) => {
            tracing::error!("Reading {} failed: {}", resource, source);
            anyhow::bail!("{}: {}", resource, format_gcp_error(&source));
        },
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
