#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Tropical Trouble headlessly.

mod autopilot;
mod script;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tropical_trouble_core::{
    Event, GameConfig, SessionCommand, SessionEvent, WorldId, WELCOME_BANNER,
};
use tropical_trouble_minigame::{self as minigame, query as session_query, Session};
use tropical_trouble_rendering::{ArcadeFrame, Frame, Presenter};
use tropical_trouble_simulation::Simulation;
use tropical_trouble_world::query;

/// Runs the overworld or the rock climbing mini-game without a window.
#[derive(Debug, Parser)]
#[command(name = "tropical-trouble", version, about)]
struct Cli {
    /// TOML file overriding the default tuning.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Walks the overworld while replaying a key script.
    Explore(ExploreArgs),
    /// Plays rock climbing runs with a simple autopilot until attempts run out.
    Climb(ClimbArgs),
}

#[derive(Debug, Args)]
struct ExploreArgs {
    /// Scene to start in.
    #[arg(long, default_value = "city")]
    scene: WorldId,
    /// Key script such as `ArrowLeft@0,Space@40,-Space@41`.
    #[arg(long, default_value = "")]
    keys: String,
    /// Host frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Real time elapsed per host frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

#[derive(Debug, Args)]
struct ClimbArgs {
    /// Host frames to simulate per run at most.
    #[arg(long, default_value_t = 4_000)]
    frames: u32,
    /// Real time elapsed per host frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    match cli.command {
        Mode::Explore(args) => explore(config, &args),
        Mode::Climb(args) => climb(config, &args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str::<GameConfig>(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn explore(config: GameConfig, args: &ExploreArgs) -> Result<()> {
    let script = script::parse(&args.keys)?;
    let mut presenter = Presenter::headless();
    let mut simulation = Simulation::new(config);
    let mut events = Vec::new();
    simulation.enter(args.scene, None, &mut events);
    println!("{WELCOME_BANNER}");

    let frame_time = Duration::from_millis(args.frame_ms);
    let mut steps = 0_u64;
    for frame in 0..args.frames {
        for key in script::due(&script, frame) {
            simulation.handle_key(key);
        }
        steps += u64::from(simulation.advance(frame_time, &mut events));
        presenter.present(&Frame::capture(simulation.world())?)?;
    }

    for event in &events {
        if let Event::PortalTraversed {
            from, destination, ..
        } = event
        {
            println!("portal: {from} -> {destination}");
        }
    }
    let shots = events
        .iter()
        .filter(|event| matches!(event, Event::BulletSpawned { .. }))
        .count();
    let world = simulation.world();
    let character = query::character(world);
    println!(
        "{steps} steps, scene {}, character at ({:.1}, {:.1}) facing {}, {shots} shots, {} in flight",
        query::scene(world),
        character.position.x(),
        character.position.y(),
        character.facing.label(),
        query::bullet_view(world).len(),
    );
    Ok(())
}

fn climb(config: GameConfig, args: &ClimbArgs) -> Result<()> {
    let mut presenter = Presenter::headless();
    let pilot = autopilot::Autopilot::new(&config.session);
    let mut session = Session::new(config.session);
    let frame_time = Duration::from_millis(args.frame_ms);

    loop {
        let mut events = Vec::new();
        minigame::apply(&mut session, SessionCommand::Start, &mut events);
        if let Some(SessionEvent::StartRejected { reason }) = events.first() {
            tracing::debug!(?reason, "no further runs");
            break;
        }
        let mut ended = None;
        for _ in 0..args.frames {
            if let Some(steer) = pilot.steer(&session_query::snapshot(&session)) {
                minigame::apply(&mut session, SessionCommand::Nudge { steer }, &mut events);
            }
            events.clear();
            minigame::apply(&mut session, SessionCommand::Advance { dt: frame_time }, &mut events);
            presenter.present_arcade(&ArcadeFrame::capture(
                &session_query::snapshot(&session),
                session_query::outcome(&session),
            ))?;
            ended = events.iter().find_map(|event| match event {
                SessionEvent::RunEnded {
                    final_score,
                    attempts_remaining,
                    ..
                } => Some((*final_score, *attempts_remaining)),
                _ => None,
            });
            if ended.is_some() {
                break;
            }
        }
        match ended {
            Some((score, attempts)) => println!("run scored {score}, {attempts} attempts left"),
            None => {
                println!("frame budget exhausted mid-run");
                break;
            }
        }
    }

    let frame = ArcadeFrame::capture(
        &session_query::snapshot(&session),
        session_query::outcome(&session),
    );
    let mut events = Vec::new();
    minigame::apply(&mut session, SessionCommand::Teardown, &mut events);
    println!(
        "{} (high score {})",
        frame.headline.unwrap_or("Rock Climbing"),
        frame.high_score
    );
    Ok(())
}
