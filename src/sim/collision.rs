//! Collision detection and response for axis-aligned boxes
//!
//! The subtle part is side disambiguation: the axis with the *smaller*
//! overlap is the one we resolve on, which decides whether a corner clip
//! reads as a floor landing or a wall bump.

use std::ops::{BitOr, BitOrAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp;

/// Vertical tolerance (units) above a slope surface that still counts as support
pub const SLOPE_SNAP: f32 = 8.0;

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Which side of the moving body made contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Body landed on top of the other box
    Bottom,
    /// Body hit the underside of the other box
    Top,
    /// Body is left of the other box and hit its left face
    Right,
    /// Body is right of the other box and hit its right face
    Left,
}

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub collided: bool,
    pub overlap_x: f32,
    pub overlap_y: f32,
    pub side: Option<Side>,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            collided: false,
            overlap_x: 0.0,
            overlap_y: 0.0,
            side: None,
        }
    }
}

/// Strict AABB overlap; touching edges do not count
#[inline]
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Measure the overlap between `a` (moving) and `b` and pick the impact side
pub fn resolve(a: &Aabb, b: &Aabb) -> CollisionResult {
    let overlap_x = a.right().min(b.right()) - a.x.max(b.x);
    let overlap_y = a.bottom().min(b.bottom()) - a.y.max(b.y);

    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return CollisionResult::miss();
    }

    let (ca, cb) = (a.center(), b.center());
    let side = if overlap_x < overlap_y {
        if ca.x < cb.x { Side::Right } else { Side::Left }
    } else if ca.y < cb.y {
        Side::Bottom
    } else {
        Side::Top
    };

    CollisionResult {
        collided: true,
        overlap_x,
        overlap_y,
        side: Some(side),
    }
}

/// Contact flags produced by resolving a body against the world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    pub grounded: bool,
    pub ceiling: bool,
    /// Wall on the body's left
    pub left_wall: bool,
    /// Wall on the body's right
    pub right_wall: bool,
}

impl Contacts {
    pub fn on_wall(&self) -> bool {
        self.left_wall || self.right_wall
    }
}

impl BitOr for Contacts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            grounded: self.grounded || rhs.grounded,
            ceiling: self.ceiling || rhs.ceiling,
            left_wall: self.left_wall || rhs.left_wall,
            right_wall: self.right_wall || rhs.right_wall,
        }
    }
}

impl BitOrAssign for Contacts {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Push a moving body out of `solid` along the resolved axis only.
///
/// Zeroes the velocity component on that axis and reports which contact
/// the push produced.
pub fn resolve_body(pos: &mut Vec2, vel: &mut Vec2, size: Vec2, solid: &Aabb) -> Contacts {
    let mut contacts = Contacts::default();
    let info = resolve(&Aabb::from_pos_size(*pos, size), solid);

    match info.side {
        Some(Side::Bottom) => {
            pos.y = solid.y - size.y;
            vel.y = 0.0;
            contacts.grounded = true;
        }
        Some(Side::Top) => {
            pos.y = solid.bottom();
            vel.y = 0.0;
            contacts.ceiling = true;
        }
        Some(Side::Left) => {
            pos.x = solid.right();
            vel.x = 0.0;
            contacts.left_wall = true;
        }
        Some(Side::Right) => {
            pos.x = solid.x - size.x;
            vel.x = 0.0;
            contacts.right_wall = true;
        }
        None => {}
    }

    contacts
}

/// Direction a slope descends toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeDir {
    /// High on the left, low on the right ( \ )
    Left,
    /// Low on the left, high on the right ( / )
    Right,
}

/// Surface height of a slope under the body's horizontal center
pub fn slope_surface_y(body: &Aabb, slope: &Aabb, dir: SlopeDir) -> f32 {
    let t = clamp((body.center().x - slope.x) / slope.width, 0.0, 1.0);
    match dir {
        SlopeDir::Left => slope.y + t * slope.height,
        SlopeDir::Right => slope.y + (1.0 - t) * slope.height,
    }
}

/// Vertical correction that puts the body on the slope surface, if supported.
///
/// Support requires overlap, a non-rising body (`vy >= 0`) and the body's
/// bottom within `SLOPE_SNAP` above the surface (or anywhere below it).
pub fn check_slope(body: &Aabb, vy: f32, slope: &Aabb, dir: SlopeDir) -> Option<f32> {
    if !overlaps(body, slope) || vy < 0.0 {
        return None;
    }

    let surface = slope_surface_y(body, slope, dir);
    if body.bottom() >= surface - SLOPE_SNAP {
        Some(surface - body.bottom())
    } else {
        None
    }
}
