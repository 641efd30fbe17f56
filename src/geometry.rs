use crate::error::{MazeError, Result};
use crate::maze::Maze;

pub const WALL_THICKNESS: f32 = 5.0;
pub const BOUNDARY_THICKNESS: f32 = 2.0;
/// Goal side length as a fraction of the cell.
pub const GOAL_SCALE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLabel {
    Wall,
    Boundary,
    Goal,
    Ball,
}

/// Axis-aligned rectangle given by its center and full size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
    pub label: BodyLabel,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32, label: BodyLabel) -> Self {
        Self {
            center: Vec2::new(x, y),
            size: Vec2::new(width, height),
            label,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSpawn {
    pub center: Vec2,
    pub radius: f32,
}

/// Physical geometry of one maze run, ready to hand to a world.
#[derive(Debug, Clone, PartialEq)]
pub struct Realization {
    pub walls: Vec<Rect>,
    pub boundaries: [Rect; 4],
    pub goal: Rect,
    pub ball: BallSpawn,
    pub width: f32,
    pub height: f32,
}

impl Realization {
    /// Internal walls plus the four boundaries.
    pub fn wall_count(&self) -> usize {
        self.walls.len() + self.boundaries.len()
    }
}

/// Place a wall wherever the maze has no passage, enclose the play area
/// and position the goal and ball.
pub fn realize(maze: &Maze, cell_width: f32, cell_height: f32) -> Result<Realization> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(cell_width) || !valid(cell_height) {
        return Err(MazeError::InvalidCellSize {
            width: cell_width,
            height: cell_height,
        });
    }

    let width = maze.columns() as f32 * cell_width;
    let height = maze.rows() as f32 * cell_height;
    let mut walls = Vec::new();

    for (r, row) in maze.horizontals().iter().enumerate() {
        for (c, &open) in row.iter().enumerate() {
            if open {
                continue;
            }
            walls.push(Rect::new(
                c as f32 * cell_width + cell_width / 2.0,
                r as f32 * cell_height + cell_height,
                cell_width,
                WALL_THICKNESS,
                BodyLabel::Wall,
            ));
        }
    }

    for (r, row) in maze.verticals().iter().enumerate() {
        for (c, &open) in row.iter().enumerate() {
            if open {
                continue;
            }
            walls.push(Rect::new(
                c as f32 * cell_width + cell_width,
                r as f32 * cell_height + cell_height / 2.0,
                WALL_THICKNESS,
                cell_height,
                BodyLabel::Wall,
            ));
        }
    }

    let boundaries = [
        Rect::new(width / 2.0, 0.0, width, BOUNDARY_THICKNESS, BodyLabel::Boundary),
        Rect::new(width / 2.0, height, width, BOUNDARY_THICKNESS, BodyLabel::Boundary),
        Rect::new(0.0, height / 2.0, BOUNDARY_THICKNESS, height, BodyLabel::Boundary),
        Rect::new(width, height / 2.0, BOUNDARY_THICKNESS, height, BodyLabel::Boundary),
    ];

    let goal = Rect::new(
        width - cell_width / 2.0,
        height - cell_height / 2.0,
        cell_width * GOAL_SCALE,
        cell_height * GOAL_SCALE,
        BodyLabel::Goal,
    );

    let ball = BallSpawn {
        center: Vec2::new(cell_width / 2.0, cell_height / 2.0),
        radius: cell_width.min(cell_height) / 4.0,
    };

    Ok(Realization {
        walls,
        boundaries,
        goal,
        ball,
        width,
        height,
    })
}
