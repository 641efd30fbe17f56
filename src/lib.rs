//! Perfect-maze generation and its realization as wall geometry for a small
//! ball-rolling game.

pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod maze;
pub mod physics;
pub mod render;
pub mod session;

pub use collision::is_winning_collision;
pub use error::{MazeError, Result};
pub use geometry::{realize, BallSpawn, BodyLabel, Realization, Rect, Vec2};
pub use maze::{generate, Cell, Direction, Maze};
pub use physics::{ArcadeWorld, PhysicsWorld};
pub use session::{generate_and_realize_maze, GameSession, GameStatus};
