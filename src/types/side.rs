//! The six block sides a mount point can be placed on.

use super::BoxCorner;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Dot product of two unit vectors 45 degrees apart.
pub const ANGLE_45: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// A side of the block cube, named the way `<MountPoint Side=...>` names it.
///
/// Left and right are mirrored with respect to the scene: the game looks at
/// blocks from the back, so the scene's +X side is the block's left side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

/// Maps a 3D offset onto a side's plane coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Row producing the first plane coordinate.
    pub u: Vec3,
    /// Row producing the second plane coordinate.
    pub v: Vec3,
}

impl Projection {
    pub const fn new(u: Vec3, v: Vec3) -> Self {
        Self { u, v }
    }

    pub fn project(&self, offset: Vec3) -> Vec2 {
        Vec2::new(self.u.dot(offset), self.v.dot(offset))
    }
}

/// Static description of a side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideDescriptor {
    /// Direction a polygon must roughly face to lie on this side.
    pub normal: Vec3,
    pub name: &'static str,
    pub projection: Projection,
    /// Corner that is the origin of the side's plane coordinates.
    pub start: BoxCorner,
    /// Corner opposite to `start` on the side.
    pub end: BoxCorner,
}

const X: Vec3 = Vec3::X;
const Y: Vec3 = Vec3::Y;
const Z: Vec3 = Vec3::Z;

const SIDES: [SideDescriptor; 6] = [
    SideDescriptor {
        normal: Z,
        name: "Top",
        projection: Projection::new(Vec3::NEG_X, Vec3::NEG_Y),
        start: BoxCorner::Btr,
        end: BoxCorner::Ftl,
    },
    SideDescriptor {
        normal: Vec3::NEG_Z,
        name: "Bottom",
        projection: Projection::new(Vec3::NEG_X, Y),
        start: BoxCorner::Fbr,
        end: BoxCorner::Bbl,
    },
    SideDescriptor {
        normal: X,
        name: "Left",
        projection: Projection::new(Y, Z),
        start: BoxCorner::Fbr,
        end: BoxCorner::Btr,
    },
    SideDescriptor {
        normal: Vec3::NEG_X,
        name: "Right",
        projection: Projection::new(Vec3::NEG_Y, Z),
        start: BoxCorner::Bbl,
        end: BoxCorner::Ftl,
    },
    SideDescriptor {
        normal: Vec3::NEG_Y,
        name: "Front",
        projection: Projection::new(X, Z),
        start: BoxCorner::Fbl,
        end: BoxCorner::Ftr,
    },
    SideDescriptor {
        normal: Y,
        name: "Back",
        projection: Projection::new(Vec3::NEG_X, Z),
        start: BoxCorner::Bbr,
        end: BoxCorner::Btl,
    },
];

impl Side {
    /// All sides in selection order.
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Bottom,
        Side::Left,
        Side::Right,
        Side::Front,
        Side::Back,
    ];

    pub fn descriptor(&self) -> &'static SideDescriptor {
        &SIDES[*self as usize]
    }

    pub fn normal(&self) -> Vec3 {
        self.descriptor().normal
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// The first side, in [`Side::ALL`] order, that `normal` faces by more
    /// than 45 degrees.
    ///
    /// Selection is by declaration order, not by best match, and a dot
    /// product of exactly `ANGLE_45` does not qualify.
    pub fn facing(normal: Vec3) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| normal.dot(side.normal()) > ANGLE_45)
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        Side::ALL
            .into_iter()
            .find(|side| side.name().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
