//! Axis-aligned bounding boxes addressed by named corners.

use glam::Vec3;
use std::ops::Index;

/// Corner of a bounding box, letter-coded Front/Back, Top/Bottom, Left/Right.
///
/// Directions are relative to a viewer in front of the block looking along +Y
/// with +Z up: front is -Y, top is +Z, left is -X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxCorner {
    Fbl = 0,
    Ftl = 1,
    Btl = 2,
    Bbl = 3,
    Fbr = 4,
    Ftr = 5,
    Btr = 6,
    Bbr = 7,
}

impl BoxCorner {
    /// All eight corners in storage order.
    pub const ALL: [BoxCorner; 8] = [
        BoxCorner::Fbl,
        BoxCorner::Ftl,
        BoxCorner::Btl,
        BoxCorner::Bbl,
        BoxCorner::Fbr,
        BoxCorner::Ftr,
        BoxCorner::Btr,
        BoxCorner::Bbr,
    ];

    /// Whether the corner sits on the max side of x, y and z respectively.
    fn max_axes(&self) -> (bool, bool, bool) {
        match self {
            BoxCorner::Fbl => (false, false, false),
            BoxCorner::Ftl => (false, false, true),
            BoxCorner::Btl => (false, true, true),
            BoxCorner::Bbl => (false, true, false),
            BoxCorner::Fbr => (true, false, false),
            BoxCorner::Ftr => (true, false, true),
            BoxCorner::Btr => (true, true, true),
            BoxCorner::Bbr => (true, true, false),
        }
    }
}

/// The eight corners of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    corners: [Vec3; 8],
}

impl BoundingBox {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let corners = BoxCorner::ALL.map(|corner| {
            let (mx, my, mz) = corner.max_axes();
            Vec3::new(
                if mx { max.x } else { min.x },
                if my { max.y } else { min.y },
                if mz { max.z } else { min.z },
            )
        });
        Self { corners }
    }

    pub fn corner(&self, corner: BoxCorner) -> Vec3 {
        self.corners[corner as usize]
    }

    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    pub fn min(&self) -> Vec3 {
        self.corner(BoxCorner::Fbl)
    }

    pub fn max(&self) -> Vec3 {
        self.corner(BoxCorner::Btr)
    }

    pub fn dimensions(&self) -> Vec3 {
        self.max() - self.min()
    }
}

impl Index<BoxCorner> for BoundingBox {
    type Output = Vec3;

    fn index(&self, corner: BoxCorner) -> &Vec3 {
        &self.corners[corner as usize]
    }
}

/// Calculate the bounding box around the given points.
///
/// Returns `None` for an empty point set.
pub fn bounds(points: impl IntoIterator<Item = Vec3>) -> Option<BoundingBox> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
    Some(BoundingBox::from_min_max(min, max))
}
