use std::collections::BTreeSet;

use tracing::trace;

use crate::geometry::{BallSpawn, BodyLabel, Rect, Vec2};

/// Velocity kept per step; the rest is lost to air drag.
const AIR_FRICTION: f32 = 0.01;
/// Acceleration per step for a gravity of 1.
const GRAVITY_ACCEL: f32 = 0.28;
/// Bodies this close count as touching.
const CONTACT_SLOP: f32 = 0.5;
const MAX_SUBSTEPS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(usize);

impl BodyId {
    /// For world implementations minting their own handles.
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// Everything needed to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    pub shape: Shape,
    pub position: Vec2,
    pub label: BodyLabel,
    pub is_static: bool,
}

impl BodyDef {
    /// A static rectangle, the way walls, boundaries and the goal enter the world.
    pub fn fixed(rect: &Rect) -> Self {
        Self {
            shape: Shape::Rectangle {
                width: rect.size.x,
                height: rect.size.y,
            },
            position: rect.center,
            label: rect.label,
            is_static: true,
        }
    }

    pub fn ball(spawn: &BallSpawn) -> Self {
        Self {
            shape: Shape::Circle {
                radius: spawn.radius,
            },
            position: spawn.center,
            label: BodyLabel::Ball,
            is_static: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub label: BodyLabel,
    pub is_static: bool,
}

impl Body {
    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = match self.shape {
            Shape::Rectangle { width, height } => Vec2::new(width / 2.0, height / 2.0),
            Shape::Circle { radius } => Vec2::new(radius, radius),
        };
        (self.position - half, self.position + half)
    }
}

/// Two bodies that started touching during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub a: BodyId,
    pub b: BodyId,
    pub label_a: BodyLabel,
    pub label_b: BodyLabel,
}

/// The body container and stepper the game drives.
pub trait PhysicsWorld {
    fn add_body(&mut self, def: BodyDef) -> BodyId;

    fn add_bodies(&mut self, defs: impl IntoIterator<Item = BodyDef>) -> Vec<BodyId>
    where
        Self: Sized,
    {
        defs.into_iter().map(|def| self.add_body(def)).collect()
    }

    /// Remove every body.
    fn clear(&mut self);

    fn bodies(&self) -> &[Body];

    fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies().iter().find(|body| body.id == id)
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|body| body.velocity)
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);

    fn set_static(&mut self, id: BodyId, is_static: bool);

    fn gravity(&self) -> Vec2;

    fn set_gravity(&mut self, gravity: Vec2);

    /// Advance one tick and return the collision starts it produced.
    fn step(&mut self) -> Vec<CollisionPair>;
}

/// Minimal world: dynamic bodies drift under gravity with air drag, and
/// circles are stopped by static rectangles.
#[derive(Debug, Default)]
pub struct ArcadeWorld {
    bodies: Vec<Body>,
    next_id: usize,
    gravity: Vec2,
    contacts: BTreeSet<(BodyId, BodyId)>,
}

struct Contact {
    normal: Vec2,
    depth: f32,
}

impl ArcadeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|body| body.id == id)
    }

    fn resolve_circle(&mut self, idx: usize, touching: &mut BTreeSet<(BodyId, BodyId)>) {
        let Shape::Circle { radius } = self.bodies[idx].shape else {
            return;
        };
        let id = self.bodies[idx].id;
        for other in 0..self.bodies.len() {
            if other == idx || matches!(self.bodies[other].shape, Shape::Circle { .. }) {
                continue;
            }
            let (min, max) = self.bodies[other].bounds();
            let other_id = self.bodies[other].id;
            let solid = self.bodies[other].is_static;
            let Some(contact) = circle_rect_contact(self.bodies[idx].position, radius, min, max)
            else {
                continue;
            };
            touching.insert((id.min(other_id), id.max(other_id)));
            if !solid || contact.depth <= 0.0 {
                continue;
            }
            let body = &mut self.bodies[idx];
            body.position = body.position + contact.normal * contact.depth;
            let into = body.velocity.x * contact.normal.x + body.velocity.y * contact.normal.y;
            if into < 0.0 {
                body.velocity = body.velocity - contact.normal * into;
            }
        }
    }
}

impl PhysicsWorld for ArcadeWorld {
    fn add_body(&mut self, def: BodyDef) -> BodyId {
        let id = BodyId::new(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body {
            id,
            shape: def.shape,
            position: def.position,
            velocity: Vec2::ZERO,
            label: def.label,
            is_static: def.is_static,
        });
        id
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
    }

    fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(idx) = self.index_of(id) {
            self.bodies[idx].velocity = velocity;
        }
    }

    fn set_static(&mut self, id: BodyId, is_static: bool) {
        if let Some(idx) = self.index_of(id) {
            let body = &mut self.bodies[idx];
            body.is_static = is_static;
            if is_static {
                body.velocity = Vec2::ZERO;
            }
        }
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn step(&mut self) -> Vec<CollisionPair> {
        let pull = self.gravity * GRAVITY_ACCEL;
        let mut touching = BTreeSet::new();

        for idx in 0..self.bodies.len() {
            if self.bodies[idx].is_static {
                continue;
            }
            {
                let body = &mut self.bodies[idx];
                body.velocity = (body.velocity + pull) * (1.0 - AIR_FRICTION);
            }

            match self.bodies[idx].shape {
                Shape::Rectangle { .. } => {
                    let body = &mut self.bodies[idx];
                    body.position = body.position + body.velocity;
                }
                Shape::Circle { radius } => {
                    // Substeps keep a fast ball from skipping over thin walls.
                    let travel = self.bodies[idx].velocity.length();
                    let substeps = ((travel / (radius * 0.5).max(f32::EPSILON)).ceil() as usize)
                        .clamp(1, MAX_SUBSTEPS);
                    for _ in 0..substeps {
                        let body = &mut self.bodies[idx];
                        body.position = body.position + body.velocity * (1.0 / substeps as f32);
                        self.resolve_circle(idx, &mut touching);
                    }
                }
            }
        }

        let started: Vec<CollisionPair> = touching
            .difference(&self.contacts)
            .filter_map(|&(a, b)| {
                let label_a = self.body(a)?.label;
                let label_b = self.body(b)?.label;
                Some(CollisionPair {
                    a,
                    b,
                    label_a,
                    label_b,
                })
            })
            .collect();
        if !started.is_empty() {
            trace!(count = started.len(), "collision start");
        }
        self.contacts = touching;
        started
    }
}

fn circle_rect_contact(center: Vec2, radius: f32, min: Vec2, max: Vec2) -> Option<Contact> {
    let closest = Vec2::new(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
    let offset = center - closest;
    let dist = offset.length();

    if dist > 0.0 {
        if dist >= radius + CONTACT_SLOP {
            return None;
        }
        return Some(Contact {
            normal: offset * (1.0 / dist),
            depth: radius - dist,
        });
    }

    // Center inside the rectangle: leave through the nearest side.
    let sides = [
        (center.x - min.x, Vec2::new(-1.0, 0.0)),
        (max.x - center.x, Vec2::new(1.0, 0.0)),
        (center.y - min.y, Vec2::new(0.0, -1.0)),
        (max.y - center.y, Vec2::new(0.0, 1.0)),
    ];
    let (gap, normal) = sides
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))?;
    Some(Contact {
        normal,
        depth: gap + radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(x: f32, y: f32, radius: f32) -> BodyDef {
        BodyDef::ball(&BallSpawn {
            center: Vec2::new(x, y),
            radius,
        })
    }

    fn wall(x: f32, y: f32, w: f32, h: f32) -> BodyDef {
        BodyDef::fixed(&Rect::new(x, y, w, h, BodyLabel::Wall))
    }

    #[test]
    fn static_bodies_never_move() {
        let mut world = ArcadeWorld::new();
        world.set_gravity(Vec2::new(0.0, 1.0));
        let id = world.add_body(wall(10.0, 10.0, 5.0, 5.0));
        for _ in 0..10 {
            world.step();
        }
        assert_eq!(world.body(id).unwrap().position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn ball_keeps_drifting_without_gravity() {
        let mut world = ArcadeWorld::new();
        let ball = world.add_body(ball_at(0.0, 0.0, 4.0));
        world.set_velocity(ball, Vec2::new(2.0, 0.0));
        world.step();
        let body = world.body(ball).unwrap();
        assert!(body.position.x > 1.9 && body.position.x < 2.0);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn wall_stops_ball_and_reports_start_once() {
        let mut world = ArcadeWorld::new();
        let ball = world.add_body(ball_at(0.0, 0.0, 4.0));
        let block = world.add_body(wall(20.0, 0.0, 5.0, 40.0));
        world.set_velocity(ball, Vec2::new(5.0, 0.0));

        let mut starts = Vec::new();
        for _ in 0..20 {
            starts.extend(world.step());
        }

        assert_eq!(starts.len(), 1);
        assert_eq!((starts[0].a, starts[0].b), (ball, block));
        assert_eq!(starts[0].label_a, BodyLabel::Ball);
        assert_eq!(starts[0].label_b, BodyLabel::Wall);
        let body = world.body(ball).unwrap();
        assert!(body.position.x <= 17.5 - 4.0 + 0.01);
        assert!(body.velocity.x.abs() < 1e-4);
    }

    #[test]
    fn fast_ball_does_not_tunnel() {
        let mut world = ArcadeWorld::new();
        let ball = world.add_body(ball_at(0.0, 0.0, 4.0));
        world.add_body(wall(30.0, 0.0, 2.0, 40.0));
        world.set_velocity(ball, Vec2::new(60.0, 0.0));
        world.step();
        assert!(world.body(ball).unwrap().position.x < 30.0);
    }

    #[test]
    fn gravity_pulls_dynamic_rectangles() {
        let mut world = ArcadeWorld::new();
        let id = world.add_body(wall(0.0, 0.0, 5.0, 5.0));
        world.set_static(id, false);
        world.set_gravity(Vec2::new(0.0, 1.0));
        for _ in 0..5 {
            world.step();
        }
        assert!(world.body(id).unwrap().position.y > 0.0);
    }

    #[test]
    fn clear_drops_bodies_but_not_ids() {
        let mut world = ArcadeWorld::new();
        let first = world.add_body(ball_at(0.0, 0.0, 1.0));
        world.clear();
        assert!(world.bodies().is_empty());
        assert!(world.body(first).is_none());
        let second = world.add_body(ball_at(0.0, 0.0, 1.0));
        assert_ne!(first, second);
    }
}
