use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DEFAULT_ROWS: u16 = 7;
pub const DEFAULT_COLUMNS: u16 = 9;
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_RENDER_FPS: u64 = 60;

/// Steer a ball out of a freshly carved maze.
#[derive(Debug, Clone, Parser)]
#[command(name = "ball-maze", version)]
pub struct Config {
    /// Maze rows
    #[arg(long, env = "MAZE_ROWS", default_value_t = DEFAULT_ROWS,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub rows: u16,

    /// Maze columns
    #[arg(long, env = "MAZE_COLUMNS", default_value_t = DEFAULT_COLUMNS,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub columns: u16,

    /// Physics step interval in milliseconds
    #[arg(long, env = "MAZE_TICK_MS", default_value_t = DEFAULT_TICK_MS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Render frame rate cap
    #[arg(long, env = "MAZE_FPS", default_value_t = DEFAULT_RENDER_FPS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub fps: u64,

    /// Seed for reproducible mazes
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// Write logs here (the terminal is taken by the game)
    #[arg(long, env = "MAZE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }
}
