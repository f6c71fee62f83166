//! Play command - run a hunt against simulated location, proximity, geocoding
//! and compass services.
//!
//! The simulated player walks toward whatever the latest hint says and asks
//! for a fresh hint on every countdown tick. Ctrl+C ends the hunt early.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use treasurehunt::auth::StaticAuthorization;
use treasurehunt::config::HuntConfig;
use treasurehunt::coord::{Hint, Position, METERS_PER_DEGREE};
use treasurehunt::hunt::{
    Affordance, Collaborators, HuntController, HuntHandle, HuntService, HuntStatus, UiOutput,
};
use treasurehunt::position::LocationFeed;
use treasurehunt::sim::{
    SimulatedCompass, SimulatedGeocoder, SimulatedProximityService, SimulatedWalker,
};

use crate::error::CliError;

/// Compass rotation while walking, in degrees per second.
const COMPASS_TURN_RATE: f32 = 15.0;

/// Arguments for the play command.
pub struct PlayArgs {
    pub start_lat: f64,
    pub start_lon: f64,
    /// Walking speed in meters per second.
    pub speed: f64,
    /// Interval between simulated location fixes.
    pub fix_interval: Duration,
    pub seed: Option<u64>,
    pub json: bool,
}

/// Run the play command.
pub fn run(args: PlayArgs, config: HuntConfig) -> Result<(), CliError> {
    if !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(CliError::Usage(format!(
            "--speed must be a positive number of meters per second, got {}",
            args.speed
        )));
    }
    if args.fix_interval.is_zero() {
        return Err(CliError::Usage("--fix-interval-ms must be greater than zero".into()));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime.block_on(play(args, config))
}

async fn play(args: PlayArgs, config: HuntConfig) -> Result<(), CliError> {
    let start = Position::new(args.start_lat, args.start_lon);
    let step_deg = args.speed * args.fix_interval.as_secs_f64() / METERS_PER_DEGREE;

    let proximity = Arc::new(SimulatedProximityService::new());
    let walker = Arc::new(
        SimulatedWalker::new(start, step_deg)
            .with_period(args.fix_interval)
            .with_proximity(Arc::clone(&proximity)),
    );
    let authorization = Arc::new(StaticAuthorization::granted());
    let collaborators = Collaborators {
        proximity: proximity.clone(),
        geocoder: Arc::new(SimulatedGeocoder::Coordinates),
        authorization: authorization.clone(),
    };

    let controller = match args.seed {
        Some(seed) => HuntController::with_seed(&config, seed),
        None => HuntController::new(&config),
    };
    let (service, handle, mut outputs) =
        HuntService::with_controller(&config, collaborators, controller);

    let shutdown = CancellationToken::new();
    let service_task = tokio::spawn(service.run(shutdown.clone()));
    let compass_task = tokio::spawn(
        SimulatedCompass::new(0.0, COMPASS_TURN_RATE).run(handle.clone(), shutdown.clone()),
    );

    let feed = LocationFeed::start(
        walker.clone(),
        &*authorization,
        config.location.clone(),
        handle.clone(),
    )
    .await?;

    let stop_handle = handle.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received stop signal, ending hunt...");
        request_stop(&stop_handle);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    if !args.json {
        println!("Treasure Hunt v{}", treasurehunt::VERSION);
        println!("==================");
        println!();
        println!("Start:    {}", start);
        println!("Speed:    {} m/s", args.speed);
        println!("Duration: {}", format_remaining(config.hunt_duration));
        println!();
        println!("Press Ctrl+C to end the hunt");
        println!();
    }

    info!(start = %start, speed = args.speed, seed = ?args.seed, "Starting simulated hunt");
    handle.start_hunt()?;

    let mut printer = Printer::new(args.json);
    let mut active = false;
    let mut finished = false;

    while let Some(output) = outputs.recv().await {
        match &output {
            UiOutput::Hint(hint) => walker.steer(*hint),
            UiOutput::RemainingTime(_) => {
                request_hint(&handle);
            }
            UiOutput::Status(HuntStatus::BeginSearch) => active = true,
            _ => {}
        }

        printer.print(&output, walker.position());

        match &output {
            UiOutput::Finished(_) => finished = true,
            UiOutput::PlaceMarker { .. } if finished => break,
            // Registration failed or the hunt was cancelled while arming
            UiOutput::Affordance(Affordance::StartHunt) if !active => break,
            _ => {}
        }
    }

    info!(finished, "Simulated hunt session over");
    feed.stop();
    shutdown.cancel();
    if let Err(e) = compass_task.await {
        warn!(error = %e, "Compass task failed");
    }
    if let Err(e) = service_task.await {
        warn!(error = %e, "Hunt service task failed");
    }
    Ok(())
}

/// Ask the service to end the hunt. Returns whether the request was queued.
fn request_stop(handle: &HuntHandle) -> bool {
    match handle.stop_hunt() {
        Ok(()) => {
            info!("Stop requested");
            true
        }
        Err(e) => {
            debug!(error = %e, "Stop request after service shutdown");
            false
        }
    }
}

/// Ask the service for a fresh hint. Returns whether the request was queued.
fn request_hint(handle: &HuntHandle) -> bool {
    match handle.request_hint() {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Hint request after service shutdown");
            false
        }
    }
}

/// Renders UI outputs as text or JSON lines.
struct Printer {
    json: bool,
    heading: Option<f32>,
    hint: Option<Hint>,
}

impl Printer {
    fn new(json: bool) -> Self {
        Self {
            json,
            heading: None,
            hint: None,
        }
    }

    fn print(&mut self, output: &UiOutput, position: Position) {
        if self.json {
            println!("{}", to_json(output));
            return;
        }

        match output {
            UiOutput::Status(status) => {
                let text = match status {
                    HuntStatus::Found => style(status.message()).green().bold(),
                    HuntStatus::TimesUp => style(status.message()).red().bold(),
                    _ => style(status.message()).cyan().bold(),
                };
                println!("{}", text);
            }
            UiOutput::Hint(hint) => {
                if self.hint != Some(*hint) {
                    println!("{} {}", style("Hint:").yellow(), output);
                }
                self.hint = Some(*hint);
            }
            UiOutput::RemainingTime(remaining) => {
                // One progress line every ten seconds
                if remaining.as_secs() % 10 == 0 {
                    let heading = self
                        .heading
                        .map(|h| format!("{:>3.0}°", h))
                        .unwrap_or_else(|| " --".to_string());
                    println!(
                        "[{}] at {} heading {}",
                        format_remaining(*remaining),
                        position,
                        heading
                    );
                }
            }
            UiOutput::Heading(update) => self.heading = Some(update.heading),
            UiOutput::PlaceMarker { position, label } => {
                println!("{} {} ({})", style("Treasure:").bold(), label, position);
            }
            UiOutput::RemoveMarker => {}
            UiOutput::Affordance(_) => {}
            UiOutput::Finished(summary) => {
                println!();
                println!("Hunt Summary");
                println!("────────────");
                println!("  Hunt:    {}", summary.hunt);
                println!("  Outcome: {}", summary.outcome);
                println!("  Target:  {}", summary.target);
                println!("  Elapsed: {}", format_remaining(Duration::from_secs(summary.elapsed_secs)));
            }
            UiOutput::Error(err) => eprintln!("{} {}", style("Error:").red().bold(), err),
        }
    }
}

fn to_json(output: &UiOutput) -> serde_json::Value {
    match output {
        UiOutput::Status(status) => json!({ "type": "status", "status": status, "message": status.message() }),
        UiOutput::Hint(hint) => json!({ "type": "hint", "hint": hint, "text": hint.to_string() }),
        UiOutput::RemainingTime(remaining) => {
            json!({ "type": "remaining", "seconds": remaining.as_secs() })
        }
        UiOutput::PlaceMarker { position, label } => {
            json!({ "type": "marker", "position": position, "label": label })
        }
        UiOutput::RemoveMarker => json!({ "type": "remove_marker" }),
        UiOutput::Affordance(affordance) => json!({ "type": "affordance", "affordance": affordance }),
        UiOutput::Heading(update) => json!({ "type": "heading", "update": update }),
        UiOutput::Finished(summary) => json!({ "type": "finished", "summary": summary }),
        UiOutput::Error(err) => json!({ "type": "error", "message": err.to_string() }),
    }
}

/// `mm:ss`, or `h:mm:ss` past an hour.
fn format_remaining(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
