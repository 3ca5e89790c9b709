use clap::Parser;
use heartbeat_board::config::{Config, load_dotenv};
use heartbeat_board::{
    GameBoard, HeartbeatCoordinator, JsonFileStore, ScoreTracker, ServiceRegistry, TapOutcome,
    serial_context,
};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Headless heartbeat board: monitors the simulated heart rate and keeps the
/// high score up to date.
#[derive(Parser, Debug)]
#[command(name = "heartbeat-board", version)]
struct Args {
    /// Stop monitoring after this many seconds (default: run until Ctrl+C)
    #[arg(long)]
    run_secs: Option<u64>,

    /// Reset the stored high score before starting
    #[arg(long)]
    reset_score: bool,

    /// Cells to tap on a fresh board, e.g. 0,4,8
    #[arg(long, value_delimiter = ',')]
    moves: Vec<usize>,

    /// Preferences file (overrides STORE_PATH)
    #[arg(long, env = "STORE_PATH")]
    store: Option<PathBuf>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn play(moves: &[usize]) {
    let mut board = GameBoard::new();
    for &index in moves {
        match board.tap(index) {
            TapOutcome::Marked(player) => info!("{} takes cell {}", player, index),
            TapOutcome::Occupied => warn!("Cell {} is already taken", index),
            TapOutcome::OutOfRange => warn!("Cell {} is not on the board", index),
        }
        for line in board.to_string().lines() {
            info!("  {}", line);
        }
    }
}

fn main() {
    // Before the runtime exists: load_dotenv mutates the environment.
    let from_dotenv = load_dotenv();
    init_logger();
    let args = Args::parse();
    if from_dotenv > 0 {
        info!("Loaded {} variables from .env", from_dotenv);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    runtime.block_on(run(args));
}

async fn run(args: Args) {
    info!("Starting heartbeat board");

    let mut config = Config::from_env();
    if let Some(path) = args.store {
        config.storage.path = path;
    }
    info!("Configuration loaded:");
    info!(
        "  Sensor: {}..={} from {} (step {}, every {} ms)",
        config.sensor.min,
        config.sensor.max,
        config.sensor.start,
        config.sensor.step_bound,
        config.sensor.interval_ms
    );
    info!("  Store: {:?}", config.storage.path);

    // This task drives the runner, so it is the delivery context.
    let (context, mut runner) = serial_context();
    let registry = match ServiceRegistry::new(&config.sensor, Arc::new(context)) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Invalid sensor configuration: {}", e);
            std::process::exit(1);
        }
    };

    let score = Arc::new(ScoreTracker::load(Arc::new(JsonFileStore::open(
        &config.storage.path,
    ))));
    if args.reset_score {
        score.reset();
    }
    info!("High score: {}", score.score());
    score
        .observable()
        .subscribe(|value| info!("New high score: {}", value));

    let heartbeat = HeartbeatCoordinator::new(registry.sensor());
    let score_for_hook = score.clone();
    heartbeat
        .reading_hook()
        .register_listener(move |bpm| {
            score_for_hook.set_score(*bpm);
        });
    heartbeat.current().subscribe(|bpm| {
        if *bpm > 0 {
            info!("Heartbeat: {} BPM", bpm);
        }
    });

    if !args.moves.is_empty() {
        play(&args.moves);
    }

    heartbeat.set_active(true);
    info!("Monitoring, press Ctrl+C to exit");

    let deadline = async {
        match args.run_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = runner.run() => {}
        _ = deadline => info!("Run time elapsed"),
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        },
    }

    heartbeat.set_active(false);
    info!("Final high score: {}", score.score());
}
