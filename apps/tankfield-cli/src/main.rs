use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tankfield_common::SceneGraph;
use tankfield_input::{InputSnapshot, InputState, Key};
use tankfield_kernel::{FrameClock, FrameReport, Game, GameConfig, GameEvent};
use tankfield_render::{DebugTextRenderer, Hud, RenderView, Renderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tankfield-cli", about = "Headless driver for the tankfield demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default configuration as JSON
    Config,
    /// Drive the tank with a scripted input pattern
    Run {
        #[command(flatten)]
        session: SessionArgs,
        /// Dump the full scene after the last frame
        #[arg(long)]
        dump: bool,
        /// Print a one-line report every N frames (0 disables)
        #[arg(long, default_value = "60")]
        report_every: u64,
    },
    /// Run the same script twice and compare the resulting state hashes
    Replay {
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(clap::Args, Clone)]
struct SessionArgs {
    /// Number of frames to simulate
    #[arg(short, long, default_value = "600")]
    frames: u64,
    /// World seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Hold the forward key for the whole run
    #[arg(long)]
    forward: bool,
    /// Hold a turn key for the whole run
    #[arg(long, value_enum)]
    turn: Option<Turn>,
    /// Start a charge every N frames (0 never fires)
    #[arg(long, default_value = "0")]
    fire_every: u64,
    /// Frames to hold the fire key before releasing
    #[arg(long, default_value = "15")]
    charge_frames: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Turn {
    Left,
    Right,
}

impl SessionArgs {
    fn load_config(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.terrain.seed = seed;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// Key state for `frame`, applied through the same path a window would use.
    fn drive(&self, input: &mut InputState, frame: u64) -> InputSnapshot {
        if self.forward {
            input.press(Key::Forward);
        }
        match self.turn {
            Some(Turn::Left) => input.press(Key::TurnLeft),
            Some(Turn::Right) => input.press(Key::TurnRight),
            None => {}
        }
        if self.fire_every > 0 {
            let phase = frame % self.fire_every;
            if phase < self.charge_frames {
                input.press(Key::Fire);
            } else if input.is_held(Key::Fire) {
                input.release(Key::Fire);
            }
        }
        input.snapshot()
    }
}

struct Session {
    game: Game,
    scene: SceneGraph,
    shots: u64,
    hits: u64,
}

fn run_session(
    args: &SessionArgs,
    config: GameConfig,
    mut on_frame: impl FnMut(&Session, &FrameReport),
) -> anyhow::Result<Session> {
    let mut scene = SceneGraph::new();
    let game = Game::new(config, &mut scene).context("starting game")?;
    let mut session = Session {
        game,
        scene,
        shots: 0,
        hits: 0,
    };

    let mut input = InputState::new();
    let mut clock = FrameClock::sixty_hz();
    for frame in 0..args.frames {
        // Simulated host timestamps at a steady 60 Hz.
        let dt = clock.tick(frame as f64 / 60.0);
        let snapshot = args.drive(&mut input, frame);
        let report = session.game.frame(&snapshot, dt, &mut session.scene);
        for event in &report.events {
            match event {
                GameEvent::ProjectileFired(_) => session.shots += 1,
                GameEvent::ScoreChanged { .. } => session.hits += 1,
                _ => {}
            }
        }
        on_frame(&session, &report);
    }
    Ok(session)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tankfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", tankfield_input::crate_info());
            println!("stream: {}", tankfield_stream::crate_info());
            println!("render: {}", tankfield_render::crate_info());
            let config = GameConfig::default();
            println!(
                "defaults: seed={}, tile_size={}, retention_radius={}",
                config.terrain.seed, config.terrain.tile_size, config.terrain.retention_radius
            );
        }
        Commands::Config => {
            println!("{}", GameConfig::default().to_json_pretty()?);
        }
        Commands::Run {
            session,
            dump,
            report_every,
        } => {
            let config = session.load_config()?;
            println!(
                "Running {} frames: seed={}",
                session.frames, config.terrain.seed
            );
            let renderer = DebugTextRenderer::summary();
            let result = run_session(&session, config, |s, report| {
                if report_every > 0 && report.tick % report_every == 0 {
                    let p = report.tank.position;
                    println!(
                        "tick={:>5} pos=({:.2}, {:.2}, {:.2}) yaw={:.3} tiles={} obstacles={} shells={} score={}",
                        report.tick,
                        p.x,
                        p.y,
                        p.z,
                        report.tank.yaw,
                        s.game.terrain().live_count(),
                        s.game.obstacles().len(),
                        s.game.projectiles().len(),
                        report.score
                    );
                    tracing::debug!(
                        "{}",
                        renderer.render(&s.scene, &RenderView::from(report.camera), Some(Hud::from(report)))
                    );
                }
            })?;

            let stats = result.game.terrain().stats();
            println!(
                "Done: tick={}, score={}, shots={}, hits={}, live_tiles={}, hash={:#018x}",
                result.game.tick(),
                result.game.score(),
                result.shots,
                result.hits,
                stats.total_live_tiles,
                result.game.state_hash()
            );
            if dump {
                let view = RenderView::from(result.game.camera_pose());
                let hud = Hud {
                    tick: result.game.tick(),
                    score: result.game.score(),
                };
                print!("{}", DebugTextRenderer::new().render(&result.scene, &view, Some(hud)));
            }
        }
        Commands::Replay { session } => {
            let config = session.load_config()?;
            println!(
                "Deterministic replay: seed={}, frames={}",
                config.terrain.seed, session.frames
            );

            let first = run_session(&session, config.clone(), |_, _| {})?;
            let second = run_session(&session, config, |_, _| {})?;
            let (h1, h2) = (first.game.state_hash(), second.game.state_hash());

            println!("Run 1: tick={}, score={}, hash={h1:#018x}", first.game.tick(), first.game.score());
            println!("Run 2: tick={}, score={}, hash={h2:#018x}", second.game.tick(), second.game.score());
            println!("Match: {}", if h1 == h2 { "OK" } else { "MISMATCH" });
            anyhow::ensure!(h1 == h2, "replay diverged");
        }
    }

    Ok(())
}
