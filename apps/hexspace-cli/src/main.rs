use clap::{Parser, Subcommand};
use glam::Vec3;
use hexspace_engine::HexEngine;
use hexspace_render::RecordingRenderer;
use hexspace_stream::EngineConfig;
use hexspace_tools::WorldInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexspace-cli", about = "CLI tool for hexspace world operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Generate the origin chunk and print its layout statistics
    Generate {
        /// Chunk radius in rings
        #[arg(short, long, default_value = "10")]
        rings: i32,
        /// World generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Free-text layout constraints (e.g. "a dense clustered town")
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Walk the avatar in a straight line and report streaming activity
    Walk {
        /// Chunk radius in rings
        #[arg(short, long, default_value = "4")]
        rings: i32,
        /// World generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Frames to simulate
        #[arg(short, long, default_value = "2000")]
        frames: u64,
        /// Avatar speed in world units per frame
        #[arg(long, default_value = "0.5")]
        speed: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("hexspace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("hex: {}", hexspace_hex::crate_info());
            println!("kernel: {}", hexspace_kernel::crate_info());
            println!("stream: {}", hexspace_stream::crate_info());
            println!("layout: {}", hexspace_layout::crate_info());
            println!("render: {}", hexspace_render::crate_info());
            println!("engine: {}", hexspace_engine::crate_info());
            println!("tools: {}", hexspace_tools::crate_info());
        }
        Commands::Generate {
            rings,
            seed,
            prompt,
        } => {
            let config = EngineConfig {
                chunk_rings: rings,
                ..EngineConfig::default()
            };
            let mut engine = HexEngine::new(config, seed, RecordingRenderer::new())?;
            if let Some(prompt) = &prompt {
                engine.set_constraints_from_prompt(prompt);
                println!("Constraints: {:?}", engine.constraints());
            }

            let mut layout = None;
            for _ in 0..10_000 {
                let summary = engine.tick(Vec3::ZERO);
                if let Some(outcome) = summary.layout {
                    layout = Some(outcome);
                    break;
                }
            }
            match layout {
                Some(outcome) => {
                    println!(
                        "Generated {} chunk(s): {} tiles, {} roads, {} buildings",
                        outcome.chunks, outcome.tiles, outcome.roads, outcome.buildings
                    );
                }
                None => println!("Generation did not complete"),
            }

            println!("{}", WorldInspector::summary(engine.map()));
            for center in WorldInspector::list_chunks(engine.map()) {
                if let Some(info) = WorldInspector::inspect_chunk(engine.map(), center) {
                    println!("  {info}");
                }
            }
        }
        Commands::Walk {
            rings,
            seed,
            frames,
            speed,
        } => {
            let config = EngineConfig {
                chunk_rings: rings,
                ..EngineConfig::default()
            };
            let mut engine = HexEngine::new(config, seed, RecordingRenderer::new())?;

            println!("Walking {frames} frames at {speed} units/frame (rings={rings})");
            let mut avatar = Vec3::ZERO;
            let mut chunk_changes = 0u64;
            let mut rebases = 0u64;
            let mut last_chunk = None;
            for frame in 0..frames {
                avatar.x += speed;
                let summary = engine.tick(avatar);
                if summary.rebased {
                    rebases += 1;
                }
                if summary.current_chunk != last_chunk {
                    chunk_changes += 1;
                    last_chunk = summary.current_chunk;
                }
                if frame % (frames / 10).max(1) == 0 {
                    tracing::info!(
                        frame,
                        tile = %summary.current_tile,
                        chunk = ?summary.current_chunk,
                        queued = engine.queue_len(),
                        "walk progress"
                    );
                }
            }

            println!("{}", WorldInspector::summary(engine.map()));
            println!(
                "Chunk changes: {chunk_changes}, rebases: {rebases}, instances: {} live / {} created",
                engine.renderer().live_instances(),
                engine.renderer().created(),
            );
        }
    }

    Ok(())
}
