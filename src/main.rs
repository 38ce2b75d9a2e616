//! LRV Meter - live Light Reflectance Value readings from an RGBC sensor
//!
//! Calibrates (or loads a stored calibration), then samples continuously,
//! printing every reading and serving the latest one on a status page until
//! interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Use stored calibration, serve on 0.0.0.0:8080
//! lrv-meter
//!
//! # Recalibrate, then take ten readings without the status page
//! lrv-meter --recalibrate --no-web --cycles 10
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lrv_meter::app::{
    self, resolve_scaling_factor_until_cancelled, run_sampling_loop, warm_up, CalibrationMode,
    ConsolePrompt, LoopSettings,
};
use lrv_meter::config::Config;
use lrv_meter::constants::APP_NAME;
use lrv_meter::sensor::IlluminatedSensor;
use lrv_meter::services::naming::NameLookup;
use lrv_meter::services::{CalibrationEngine, CalibrationStore};
use lrv_meter::sinks::SnapshotSlot;

/// LRV Meter - color and reflectance readings from an RGBC sensor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run calibration even if a stored factor exists
    #[arg(long)]
    recalibrate: bool,

    /// Use the default scaling factor without calibrating
    #[arg(long, conflicts_with = "recalibrate")]
    skip_calibration: bool,

    /// Print the stored scaling factor and exit
    #[arg(long)]
    show_calibration: bool,

    /// Do not serve the status page
    #[arg(long)]
    no_web: bool,

    /// Status page port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Status page host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Stop after this many readings
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Configuration directory.
    /// Defaults to $LRV_METER_CONFIG_DIR, then the platform config directory:
    /// - Linux: ~/.config/LrvMeter/
    /// - macOS: ~/Library/Application Support/LrvMeter/
    /// - Windows: %APPDATA%\LrvMeter\
    #[arg(short, long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    const fn calibration_mode(&self) -> CalibrationMode {
        if self.skip_calibration {
            CalibrationMode::Skip
        } else if self.recalibrate {
            CalibrationMode::Force
        } else {
            CalibrationMode::Auto
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_dir = match args.config_dir.clone() {
        Some(dir) => dir,
        None => Config::config_dir()?,
    };
    let mut config = Config::load_or_init(&config_dir)?;
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.web.host = host;
    }
    config.validate()?;

    let store = CalibrationStore::new(config.calibration_file_path(&config_dir));
    if args.show_calibration {
        match store.load() {
            Some(state) => println!("Scaling factor: {:.4}", state.scaling_factor),
            None => println!("No calibration stored at {}", store.path().display()),
        }
        return Ok(());
    }

    info!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());

    // Listen for Ctrl-C before the LEDs go on so every later stage can stop
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
        }
        interrupt.cancel();
    });

    let sensor = IlluminatedSensor::new(app::build_sensor(&config)?)
        .context("Failed to switch sensor illumination on")?;
    let Some(sensor) = warm_up(sensor, config.sensor.warmup(), &cancel).await? else {
        return Ok(());
    };

    let Some((scaling_factor, sensor)) = resolve_scaling_factor_until_cancelled(
        args.calibration_mode(),
        store,
        CalibrationEngine::from_config(&config.calibration),
        sensor,
        ConsolePrompt::stdio(),
        &cancel,
    )
    .await?
    else {
        return Ok(());
    };

    let pipeline = app::build_pipeline(&config, scaling_factor)?;
    let naming = build_naming(&config)?;

    let slot = SnapshotSlot::new();
    let server = spawn_status_page(&config, &args, &slot, &cancel)?;
    let mut sinks = app::build_sinks(&config, server.is_some().then_some(slot));

    let result = run_sampling_loop(
        sensor,
        &pipeline,
        naming.as_deref(),
        &mut sinks,
        LoopSettings::from_config(&config.sensor, args.cycles),
        cancel.clone(),
    )
    .await;

    cancel.cancel();
    if let Some(handle) = server {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Status page error: {:#}", e),
            Err(e) => warn!("Status page task failed: {}", e),
        }
    }

    let summary = result?;
    info!("Done after {} reading(s)", summary.cycles);
    Ok(())
}

#[cfg(feature = "remote-names")]
fn build_naming(config: &Config) -> Result<Option<Box<dyn NameLookup>>> {
    use lrv_meter::services::HttpNameLookup;

    Ok(HttpNameLookup::from_config(&config.naming)?.map(|lookup| {
        info!("Remote color naming enabled");
        Box::new(lookup) as Box<dyn NameLookup>
    }))
}

#[cfg(not(feature = "remote-names"))]
fn build_naming(config: &Config) -> Result<Option<Box<dyn NameLookup>>> {
    if config.naming.remote_url.is_some() {
        warn!("Remote color naming configured but not compiled in; using the palette");
    }
    Ok(None)
}

type ServerHandle = tokio::task::JoinHandle<Result<()>>;

#[cfg(feature = "web")]
fn spawn_status_page(
    config: &Config,
    args: &Args,
    slot: &SnapshotSlot,
    cancel: &CancellationToken,
) -> Result<Option<ServerHandle>> {
    if args.no_web || !config.web.enabled {
        return Ok(None);
    }
    let addr = config.web.socket_addr()?;
    Ok(Some(tokio::spawn(lrv_meter::web::run_server(
        slot.reader(),
        addr,
        cancel.clone(),
    ))))
}

#[cfg(not(feature = "web"))]
fn spawn_status_page(
    config: &Config,
    args: &Args,
    _slot: &SnapshotSlot,
    _cancel: &CancellationToken,
) -> Result<Option<ServerHandle>> {
    if !args.no_web && config.web.enabled {
        warn!("Status page not compiled in");
    }
    Ok(None)
}
