use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::error::{MazeError, Result};
use crate::geometry::BodyLabel;
use crate::physics::{Body, PhysicsWorld, Shape};
use crate::session::{GameSession, GameStatus};

/// World units covered by one terminal column.
pub const UNITS_PER_COL: f32 = 10.0;
/// World units covered by one terminal row; glyphs are about twice as tall as wide.
pub const UNITS_PER_ROW: f32 = 20.0;
const HUD_ROWS: u16 = 1;

const WIN_BANNER: &str = "🏆 You win! 🏆  r: new maze  q: quit";

/// Terminal area the maze is drawn into, fixed when the game starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Viewport {
    /// Fit a `maze_rows x maze_columns` grid into a terminal of
    /// `term_cols x term_rows`, keeping one line for the HUD.
    pub fn fit(term_cols: u16, term_rows: u16, maze_rows: u16, maze_columns: u16) -> Result<Self> {
        let needed_cols = maze_columns.saturating_mul(2).saturating_add(1);
        let needed_rows = maze_rows
            .saturating_mul(2)
            .saturating_add(1)
            .saturating_add(HUD_ROWS);
        if term_cols < needed_cols || term_rows < needed_rows {
            return Err(MazeError::TerminalTooSmall {
                needed_cols,
                needed_rows,
                cols: term_cols,
                rows: term_rows,
            });
        }

        let cols = term_cols;
        let rows = term_rows - HUD_ROWS;
        Ok(Self {
            cols,
            rows,
            cell_width: cols as f32 * UNITS_PER_COL / maze_columns as f32,
            cell_height: rows as f32 * UNITS_PER_ROW / maze_rows as f32,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Glyph {
    Empty,
    Wall,
    Boundary,
    Goal,
    Ball,
}

impl Glyph {
    fn for_label(label: BodyLabel) -> Self {
        match label {
            BodyLabel::Wall => Glyph::Wall,
            BodyLabel::Boundary => Glyph::Boundary,
            BodyLabel::Goal => Glyph::Goal,
            BodyLabel::Ball => Glyph::Ball,
        }
    }

    fn text(self) -> (&'static str, Color) {
        match self {
            Glyph::Empty => (" ", Color::Reset),
            Glyph::Wall => ("█", Color::Red),
            Glyph::Boundary => ("█", Color::White),
            Glyph::Goal => ("▒", Color::Green),
            Glyph::Ball => ("●", Color::Blue),
        }
    }

    /// Later layers are drawn over earlier ones.
    fn layer(self) -> u8 {
        match self {
            Glyph::Empty => 0,
            Glyph::Goal => 1,
            Glyph::Wall => 2,
            Glyph::Boundary => 3,
            Glyph::Ball => 4,
        }
    }
}

/// Rasterize every body into a `cols x rows` glyph buffer.
fn rasterize(bodies: &[Body], cols: u16, rows: u16) -> Vec<Glyph> {
    let (cols, rows) = (cols as usize, rows as usize);
    let mut canvas = vec![Glyph::Empty; cols * rows];

    let mut plot = |x: isize, y: isize, glyph: Glyph| {
        if x < 0 || y < 0 || x as usize >= cols || y as usize >= rows {
            return;
        }
        let idx = y as usize * cols + x as usize;
        if glyph.layer() >= canvas[idx].layer() {
            canvas[idx] = glyph;
        }
    };
    // The right and bottom boundaries sit exactly on the far edge.
    let to_col = |x: f32| ((x / UNITS_PER_COL).floor() as isize).min(cols as isize - 1);
    let to_row = |y: f32| ((y / UNITS_PER_ROW).floor() as isize).min(rows as isize - 1);

    for body in bodies {
        let glyph = Glyph::for_label(body.label);
        match body.shape {
            Shape::Rectangle { .. } => {
                let (min, max) = body.bounds();
                if max.y < 0.0 || min.y > rows as f32 * UNITS_PER_ROW {
                    continue;
                }
                for y in to_row(min.y)..=to_row(max.y) {
                    for x in to_col(min.x)..=to_col(max.x) {
                        plot(x, y, glyph);
                    }
                }
            }
            Shape::Circle { radius } => {
                let (min, max) = body.bounds();
                let mut drawn = false;
                for y in to_row(min.y)..=to_row(max.y) {
                    for x in to_col(min.x)..=to_col(max.x) {
                        let cx = (x as f32 + 0.5) * UNITS_PER_COL - body.position.x;
                        let cy = (y as f32 + 0.5) * UNITS_PER_ROW - body.position.y;
                        if cx * cx + cy * cy <= radius * radius {
                            plot(x, y, glyph);
                            drawn = true;
                        }
                    }
                }
                if !drawn {
                    plot(to_col(body.position.x), to_row(body.position.y), glyph);
                }
            }
        }
    }
    canvas
}

/// Diffing terminal renderer: only cells that changed since the last
/// frame are rewritten.
pub struct Renderer {
    viewport: Viewport,
    last: Vec<Glyph>,
    last_hud: String,
    needs_full: bool,
    banner: bool,
}

impl Renderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            last: vec![Glyph::Empty; viewport.cols as usize * viewport.rows as usize],
            last_hud: String::new(),
            needs_full: true,
            banner: false,
        }
    }

    /// Force the next frame to redraw everything.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render<W: PhysicsWorld>(
        &mut self,
        out: &mut impl Write,
        session: &GameSession<W>,
    ) -> io::Result<()> {
        let Viewport { cols, rows, .. } = self.viewport;
        let (term_w, term_h) = terminal::size()?;
        if term_w < cols || term_h < rows + HUD_ROWS {
            out.queue(MoveTo(0, 0))?;
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                cols,
                rows + HUD_ROWS,
                term_w,
                term_h
            )))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        // The banner hides maze cells; bring them back once it goes away.
        if self.banner && session.status() != GameStatus::Won {
            self.banner = false;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = format!(
            "Maze {}x{}  Run {}  arrows/hjkl: steer  r: new maze  q: quit",
            session.rows(),
            session.columns(),
            session.runs()
        );
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(0, 0))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let canvas = rasterize(session.world().bodies(), cols, rows);
        for (idx, glyph) in canvas.iter().enumerate() {
            if self.needs_full || *glyph != self.last[idx] {
                self.last[idx] = *glyph;
                let (text, color) = glyph.text();
                let x = (idx % cols as usize) as u16;
                let y = (idx / cols as usize) as u16 + HUD_ROWS;
                out.queue(MoveTo(x, y))?;
                out.queue(SetForegroundColor(color))?;
                out.queue(Print(text))?;
            }
        }
        out.queue(ResetColor)?;
        self.needs_full = false;

        if session.status() == GameStatus::Won {
            draw_centered(out, WIN_BANNER, cols, HUD_ROWS + rows / 2, Color::Yellow)?;
            self.banner = true;
        }

        out.flush()
    }
}

fn draw_centered(
    out: &mut impl Write,
    text: &str,
    cols: u16,
    y: u16,
    color: Color,
) -> io::Result<()> {
    let width = UnicodeWidthStr::width(text) as u16;
    let x = cols.saturating_sub(width) / 2;
    out.queue(MoveTo(x, y))?;
    out.queue(SetForegroundColor(color))?;
    out.queue(Print(text))?;
    out.queue(ResetColor)?;
    Ok(())
}

/// Title screen shown before the first maze.
pub fn render_title(out: &mut impl Write) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let middle = rows / 2;
    out.queue(Clear(ClearType::All))?;
    draw_centered(out, "🟦 BALL MAZE 🟦", cols, middle.saturating_sub(2), Color::Cyan)?;
    draw_centered(
        out,
        "Roll the ball to the green goal in the bottom-right corner.",
        cols,
        middle,
        Color::White,
    )?;
    draw_centered(
        out,
        "Press any key to start, q to quit",
        cols,
        middle + 2,
        Color::White,
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BallSpawn, Rect, Vec2};
    use crate::physics::{ArcadeWorld, BodyDef};

    #[test]
    fn viewport_divides_terminal_between_cells() {
        let viewport = Viewport::fit(90, 36, 7, 9).unwrap();
        assert_eq!(viewport.cols, 90);
        assert_eq!(viewport.rows, 35);
        assert_eq!(viewport.cell_width, 100.0);
        assert_eq!(viewport.cell_height, 100.0);
    }

    #[test]
    fn viewport_rejects_tiny_terminal() {
        assert!(matches!(
            Viewport::fit(10, 5, 7, 9),
            Err(MazeError::TerminalTooSmall {
                needed_cols: 19,
                needed_rows: 16,
                ..
            })
        ));
    }

    #[test]
    fn rasterized_bodies_land_in_expected_cells() {
        let mut world = ArcadeWorld::new();
        world.add_body(BodyDef::fixed(&Rect::new(50.0, 0.0, 100.0, 2.0, BodyLabel::Boundary)));
        world.add_body(BodyDef::fixed(&Rect::new(100.0, 50.0, 2.0, 100.0, BodyLabel::Boundary)));
        world.add_body(BodyDef::ball(&BallSpawn {
            center: Vec2::new(45.0, 50.0),
            radius: 3.0,
        }));
        let canvas = rasterize(world.bodies(), 10, 5);

        assert!(canvas[..10].iter().all(|g| *g == Glyph::Boundary));
        // Right boundary at x = 100 clamps into the last column.
        assert_eq!(canvas[2 * 10 + 9], Glyph::Boundary);
        assert_eq!(canvas[2 * 10 + 4], Glyph::Ball);
        assert_eq!(canvas.iter().filter(|g| **g == Glyph::Ball).count(), 1);
    }

    #[test]
    fn ball_draws_over_goal() {
        let mut world = ArcadeWorld::new();
        world.add_body(BodyDef::ball(&BallSpawn {
            center: Vec2::new(15.0, 30.0),
            radius: 1.0,
        }));
        world.add_body(BodyDef::fixed(&Rect::new(15.0, 30.0, 30.0, 60.0, BodyLabel::Goal)));
        let canvas = rasterize(world.bodies(), 3, 3);
        assert_eq!(canvas[4], Glyph::Ball);
        assert_eq!(canvas[0], Glyph::Goal);
    }
}
