use rand::Rng;
use tracing::{debug, info};

use crate::collision::is_winning_collision;
use crate::error::{MazeError, Result};
use crate::geometry::{realize, BodyLabel, Realization, Vec2};
use crate::maze::{generate, Direction};
use crate::physics::{BodyDef, BodyId, CollisionPair, PhysicsWorld};

/// Velocity added to the ball per directional key press.
pub const STEER_DELTA: f32 = 5.0;
const VICTORY_GRAVITY: Vec2 = Vec2 { x: 0.0, y: 1.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ready,
    Playing,
    Won,
}

/// Carve a fresh maze and turn it into geometry in one go.
pub fn generate_and_realize_maze(
    rows: usize,
    columns: usize,
    cell_width: f32,
    cell_height: f32,
    rng: &mut impl Rng,
) -> Result<Realization> {
    let maze = generate(rows, columns, rng)?;
    let geometry = realize(&maze, cell_width, cell_height)?;
    debug!(
        rows,
        columns,
        walls = geometry.wall_count(),
        "maze realized"
    );
    Ok(geometry)
}

/// One game: the world, the ball in it and whether it has been won.
pub struct GameSession<W> {
    world: W,
    rows: usize,
    columns: usize,
    cell_width: f32,
    cell_height: f32,
    ball: Option<BodyId>,
    status: GameStatus,
    runs: u32,
}

impl<W: PhysicsWorld> GameSession<W> {
    pub fn new(
        world: W,
        rows: usize,
        columns: usize,
        cell_width: f32,
        cell_height: f32,
    ) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(MazeError::InvalidDimensions { rows, columns });
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(cell_width) || !positive(cell_height) {
            return Err(MazeError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            world,
            rows,
            columns,
            cell_width,
            cell_height,
            ball: None,
            status: GameStatus::Ready,
            runs: 0,
        })
    }

    /// Build the first maze.
    pub fn start(&mut self, rng: &mut impl Rng) -> Result<Realization> {
        self.reset(rng)
    }

    /// Throw away the current world contents and play a new maze.
    pub fn reset(&mut self, rng: &mut impl Rng) -> Result<Realization> {
        let geometry = generate_and_realize_maze(
            self.rows,
            self.columns,
            self.cell_width,
            self.cell_height,
            rng,
        )?;

        self.world.set_gravity(Vec2::ZERO);
        self.world.clear();
        self.world
            .add_bodies(geometry.boundaries.iter().map(BodyDef::fixed));
        self.world.add_bodies(geometry.walls.iter().map(BodyDef::fixed));
        self.world.add_body(BodyDef::fixed(&geometry.goal));
        self.ball = Some(self.world.add_body(BodyDef::ball(&geometry.ball)));
        self.status = GameStatus::Playing;
        self.runs += 1;

        info!(
            run = self.runs,
            rows = self.rows,
            columns = self.columns,
            "new maze"
        );
        Ok(geometry)
    }

    /// Nudge the ball one `STEER_DELTA` along `dir`.
    pub fn steer(&mut self, dir: Direction) {
        let Some(ball) = self.ball else {
            return;
        };
        let Some(velocity) = self.world.velocity(ball) else {
            return;
        };
        let (dy, dx) = dir.delta();
        let velocity = Vec2::new(
            velocity.x + dx as f32 * STEER_DELTA,
            velocity.y + dy as f32 * STEER_DELTA,
        );
        self.world.set_velocity(ball, velocity);
    }

    /// Step the world once and return every ball/goal collision that
    /// started during the step.
    pub fn tick(&mut self) -> Vec<CollisionPair> {
        let wins: Vec<CollisionPair> = self
            .world
            .step()
            .into_iter()
            .filter(|pair| is_winning_collision(pair.label_a, pair.label_b))
            .collect();

        if !wins.is_empty() && self.status == GameStatus::Playing {
            self.celebrate();
        }
        wins
    }

    /// Turn gravity on and let the maze walls fall.
    fn celebrate(&mut self) {
        self.status = GameStatus::Won;
        self.world.set_gravity(VICTORY_GRAVITY);
        let walls: Vec<BodyId> = self
            .world
            .bodies()
            .iter()
            .filter(|body| body.label == BodyLabel::Wall)
            .map(|body| body.id)
            .collect();
        for id in &walls {
            self.world.set_static(*id, false);
        }
        info!(run = self.runs, walls = walls.len(), "maze solved");
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn ball(&self) -> Option<BodyId> {
        self.ball
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }
}
