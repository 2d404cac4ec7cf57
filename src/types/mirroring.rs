//! Block mirroring settings derived from helper objects.
//!
//! A scene marks mirroring with helper objects named like `MirrorLeftRight` or
//! `MirroringZ`. The object's rotation decides which mirroring the game should
//! apply along that axis.

use glam::{EulerRot, Mat3, Vec3};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A mirroring the game supports, named as in `<MirroringX>` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirroring {
    None,
    X,
    Y,
    Z,
    HalfX,
    HalfY,
    HalfZ,
    MinusHalfX,
    MinusHalfY,
    MinusHalfZ,
    XHalfY,
    XHalfZ,
    YHalfX,
    YHalfZ,
    ZHalfX,
    ZHalfY,
}

/// XYZ Euler angles in degrees for each supported mirroring.
const SUPPORTED: [(Mirroring, [f32; 3]); 16] = [
    (Mirroring::None, [0.0, 0.0, 0.0]),
    (Mirroring::X, [180.0, 0.0, 0.0]),
    (Mirroring::Y, [180.0, 180.0, 0.0]),
    (Mirroring::Z, [0.0, 180.0, 0.0]),
    (Mirroring::HalfX, [90.0, 0.0, 0.0]),
    (Mirroring::HalfY, [0.0, 0.0, -90.0]),
    (Mirroring::HalfZ, [0.0, -90.0, 0.0]),
    (Mirroring::MinusHalfX, [-90.0, 0.0, 0.0]),
    (Mirroring::MinusHalfY, [0.0, 0.0, 90.0]),
    (Mirroring::MinusHalfZ, [0.0, 90.0, 0.0]),
    (Mirroring::XHalfY, [180.0, 0.0, -90.0]),
    (Mirroring::XHalfZ, [180.0, 90.0, 0.0]),
    (Mirroring::YHalfX, [90.0, 0.0, 180.0]),
    (Mirroring::YHalfZ, [0.0, -90.0, 180.0]),
    (Mirroring::ZHalfX, [-90.0, 0.0, 180.0]),
    (Mirroring::ZHalfY, [0.0, 180.0, -90.0]),
];

/// Axis-aligned rotations the game has no mirroring for.
const UNSUPPORTED: [[f32; 3]; 8] = [
    [90.0, 0.0, 90.0],
    [-90.0, 0.0, 90.0],
    [90.0, 0.0, -90.0],
    [-90.0, 0.0, -90.0],
    [90.0, 90.0, 0.0],
    [-90.0, 90.0, 0.0],
    [90.0, -90.0, 0.0],
    [-90.0, -90.0, 0.0],
];

/// How well a rotation maps onto a game mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirroringFit {
    Supported(Mirroring),
    /// A right-angle rotation the game cannot express.
    Unsupported,
    /// Not a right-angle rotation at all.
    NonRectangular,
}

/// Rotation matrix rounded to four decimals, so equal rotations compare equal.
fn rotation_key(degrees: [f32; 3]) -> [i32; 9] {
    let [x, y, z] = degrees.map(f32::to_radians);
    // XYZ Euler order: rotate about x first, then y, then z.
    let m = Mat3::from_euler(EulerRot::ZYX, z, y, x);
    m.to_cols_array().map(|c| (c * 10_000.0).round() as i32)
}

impl Mirroring {
    pub fn name(&self) -> &'static str {
        match self {
            Mirroring::None => "None",
            Mirroring::X => "X",
            Mirroring::Y => "Y",
            Mirroring::Z => "Z",
            Mirroring::HalfX => "HalfX",
            Mirroring::HalfY => "HalfY",
            Mirroring::HalfZ => "HalfZ",
            Mirroring::MinusHalfX => "MinusHalfX",
            Mirroring::MinusHalfY => "MinusHalfY",
            Mirroring::MinusHalfZ => "MinusHalfZ",
            Mirroring::XHalfY => "XHalfY",
            Mirroring::XHalfZ => "XHalfZ",
            Mirroring::YHalfX => "YHalfX",
            Mirroring::YHalfZ => "YHalfZ",
            Mirroring::ZHalfX => "ZHalfX",
            Mirroring::ZHalfY => "ZHalfY",
        }
    }

    /// The Euler angles (degrees) that produce this mirroring.
    pub fn euler_degrees(&self) -> Vec3 {
        let angles = SUPPORTED
            .iter()
            .find(|(m, _)| m == self)
            .map(|(_, a)| *a)
            .unwrap_or_default();
        Vec3::from_array(angles)
    }

    /// Classify an object rotation given as XYZ Euler angles in degrees.
    pub fn from_euler_degrees(degrees: Vec3) -> MirroringFit {
        let key = rotation_key(degrees.to_array());
        if let Some((mirroring, _)) = SUPPORTED.iter().find(|(_, a)| rotation_key(*a) == key) {
            MirroringFit::Supported(*mirroring)
        } else if UNSUPPORTED.iter().any(|a| rotation_key(*a) == key) {
            MirroringFit::Unsupported
        } else {
            MirroringFit::NonRectangular
        }
    }
}

impl std::fmt::Display for Mirroring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The axis a mirroring helper object applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirroringAxis {
    X,
    Y,
    Z,
}

impl MirroringAxis {
    pub const ALL: [MirroringAxis; 3] = [MirroringAxis::X, MirroringAxis::Y, MirroringAxis::Z];

    /// Element name in a block definition.
    pub fn tag(&self) -> &'static str {
        match self {
            MirroringAxis::X => "MirroringX",
            MirroringAxis::Y => "MirroringY",
            MirroringAxis::Z => "MirroringZ",
        }
    }
}

fn mirror_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^Mirror(?:ing)?(",
            r"(X|LR|RL|Left|LeftRight|RightLeft|Right|Side)|",
            r"(Y|TB|BT|Top|TopBottom|BottomTop|Bottom)|",
            r"(Z|FB|BF|Front|FrontBack|BackFront|Back))",
        ))
        .expect("mirror name pattern is valid")
    })
}

/// Axis named by a mirroring helper object, e.g. `MirrorTopBottom` -> Y.
pub fn mirroring_axis_from_name(name: &str) -> Option<MirroringAxis> {
    let captures = mirror_name_pattern().captures(name)?;
    if captures.get(2).is_some() {
        Some(MirroringAxis::X)
    } else if captures.get(3).is_some() {
        Some(MirroringAxis::Y)
    } else {
        Some(MirroringAxis::Z)
    }
}

/// Per-axis mirroring of a block definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirroringAxes {
    pub x: Option<Mirroring>,
    pub y: Option<Mirroring>,
    pub z: Option<Mirroring>,
}

impl MirroringAxes {
    pub fn get(&self, axis: MirroringAxis) -> Option<Mirroring> {
        match axis {
            MirroringAxis::X => self.x,
            MirroringAxis::Y => self.y,
            MirroringAxis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: MirroringAxis, mirroring: Option<Mirroring>) {
        match axis {
            MirroringAxis::X => self.x = mirroring,
            MirroringAxis::Y => self.y = mirroring,
            MirroringAxis::Z => self.z = mirroring,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Collect mirroring from helper objects given as `(name, rotation in degrees)`.
    ///
    /// Objects whose name names no axis are ignored. Rotations the game cannot
    /// express are logged and ignored. A later helper for the same axis wins.
    pub fn from_helpers<'a>(helpers: impl IntoIterator<Item = (&'a str, Vec3)>) -> Self {
        let mut axes = Self::default();
        for (name, rotation) in helpers {
            let Some(axis) = mirroring_axis_from_name(name) else {
                continue;
            };
            if axes.get(axis).is_some() {
                continue;
            }
            match Mirroring::from_euler_degrees(rotation) {
                MirroringFit::Supported(mirroring) => axes.set(axis, Some(mirroring)),
                MirroringFit::Unsupported => {
                    log::warn!("{}: rotation {:?} has no matching block mirroring", name, rotation)
                }
                MirroringFit::NonRectangular => {
                    log::warn!("{}: rotation {:?} is not a multiple of 90 degrees", name, rotation)
                }
            }
        }
        axes
    }
}
