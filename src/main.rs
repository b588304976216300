// src/main.rs - Hand follower entry point
use clap::Parser;
use hand_follow_rs::communication::{PositionFeed, SharedLatestPosition};
use hand_follow_rs::config::{self, Config};
use hand_follow_rs::scheduler::{shutdown_channel, watch_interrupts, IntervalTicker};
use hand_follow_rs::simulator::SimulatedRobot;
use hand_follow_rs::tracking::ControlLoop;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "hand-follow", version, about = "Drive a robot end-effector to follow a tracked hand")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();

    tracing::info!("Starting hand follower {}", env!("CARGO_PKG_VERSION"));

    let config = match cli.config.as_deref() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            config::load_config(path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path, e);
                Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
            })?
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    let bounds = &config.workspace;
    tracing::info!("Robot: {}:{}", config.robot.address, config.robot.port);
    tracing::info!(
        "Workspace: X [{}, {}] Y [{}, {}] Z [{}, {}] m",
        bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max, bounds.z_min, bounds.z_max
    );
    tracing::info!("Max speed: {} m/s, gain: {}", config.control.max_speed, config.control.gain);

    let (shutdown, signal) = shutdown_channel();
    let latest = SharedLatestPosition::new();

    let feed = PositionFeed::bind(&config.feed, latest.clone()).await?;
    let feed_task = tokio::spawn(feed.run(signal.clone()));

    // The vendor session is opened by an external link; without one, drive the simulator.
    let link = SimulatedRobot::new(&config.simulator);
    let ticker = IntervalTicker::new(config.control.tick_period());
    let control_loop = ControlLoop::new(&config, link, latest, ticker)?;

    tokio::spawn(watch_interrupts(shutdown.clone(), tokio::signal::ctrl_c, || {
        std::process::exit(130);
    }));

    tracing::info!("Press Ctrl+C to stop at any time, twice to force exit.");
    let result = control_loop.run(signal).await;

    shutdown.trigger();
    match feed_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Position feed ended with error: {}", e),
        Err(e) => tracing::warn!("Position feed task failed: {}", e),
    }

    let report = result?;
    tracing::info!(
        "Disconnected. Session {} done after {} ticks.",
        report.session_id,
        report.stats.ticks
    );
    Ok(())
}
