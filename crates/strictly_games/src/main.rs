//! Strictly Games - gesture rock/paper/scissors
//!
//! Plays a session from the command line against a simulated camera.

#![warn(missing_docs)]

mod cli;
mod config;
mod console;
mod simulated;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, PlayArgs};
use config::GameConfig;
use console::ConsoleRenderer;
use strictly_rps::{
    GameSession, Gesture, HandAssignment, RandomChooser, SessionConfig, events, play, warmup,
};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Play(args) => run_play(args).await,
        Command::Rules => {
            print_rules();
            Ok(())
        }
    }
}

/// Logs go to stderr so they never interleave with the game on stdout.
fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Play one session to completion or until stopped.
#[instrument(skip_all, fields(mode = %args.mode, rounds = %args.rounds))]
async fn run_play(args: PlayArgs) -> Result<()> {
    let config = GameConfig::load(args.config.as_deref())?;

    let rounds = SessionConfig::parse_rounds(&args.rounds)?;
    let session_config = SessionConfig::new(args.mode, args.name_a, args.name_b, rounds)?;
    let script = args
        .script
        .as_deref()
        .map(simulated::parse_script)
        .transpose()?;

    let seed = args.seed.or(*config.seed());
    let assignment = if args.wrist_x {
        HandAssignment::WristX
    } else {
        *config.hand_assignment()
    };
    info!(?seed, ?assignment, "Starting session");

    let tracker = simulated::tracker(args.mode, script, seed, *config.hand_presence());
    let (events_tx, events_rx) = events::channel();
    let mut session = GameSession::create(session_config, tracker)?
        .with_timing(config.timing())
        .with_assignment(assignment)
        .with_confidence(
            *config.min_detection_confidence(),
            *config.min_tracking_confidence(),
        )
        .with_chooser(RandomChooser::new(seed.map(|s| s.wrapping_add(2))))
        .with_events(events_tx);

    let mut console = ConsoleRenderer::stdout(
        session.config().name_a().clone(),
        session.config().name_b().clone(),
    );

    let mut warming = warmup::paced(config.warmup_step());
    while let Some(progress) = warming.next_progress().await {
        console.progress(&progress);
    }
    session.mark_ready(warming.join().await?);

    let stop = session.stop_handle();
    tokio::spawn(stop_on_ctrl_c(stop));

    let renderer = tokio::spawn(async move {
        events::pump(events_rx, &mut console).await;
    });

    let result = play(&mut session, config.result_hold()).await?;
    // Dropping the session closes the event channel so the renderer drains.
    drop(session);
    renderer.await?;

    if let Some(reason) = &result.aborted {
        warn!(%reason, rounds_played = result.rounds_played, "Session ended early");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

async fn stop_on_ctrl_c(stop: CancellationToken) {
    tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("Ctrl+C received, stopping after the current phase");
                stop.cancel();
            }
            Err(e) => warn!(error = %e, "Could not listen for Ctrl+C"),
        },
        _ = stop.cancelled() => {}
    }
}

fn print_rules() {
    for gesture in Gesture::iter() {
        let beaten: Vec<String> = Gesture::iter()
            .filter(|other| gesture.beats(*other))
            .map(|other| other.to_string())
            .collect();
        println!("{gesture} beats {}", beaten.join(", "));
    }
}
