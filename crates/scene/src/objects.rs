//! Scene object model: linear features (road/wall/water) and sited objects
//! (buildings, trees) placed on the ground plane.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::occupancy::Footprint;
use crate::path::PathPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinearKind {
    Road,
    Wall,
    Water,
}

impl LinearKind {
    /// Minimum number of path points a committed feature needs. A single
    /// water point is a circular pond; roads and walls need a span.
    pub fn min_points(self) -> usize {
        match self {
            LinearKind::Road | LinearKind::Wall => 2,
            LinearKind::Water => 1,
        }
    }

    pub fn default_variant(self) -> &'static str {
        match self {
            LinearKind::Road => "residential",
            LinearKind::Wall => "brick",
            LinearKind::Water => "pond",
        }
    }
}

/// Per-variant sizing and presentation defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub width: f32,
    pub color: [f32; 4],
    pub elevation: f32,
    pub thickness: f32,
}

/// Look up the defaults for a kind/variant pair. Unknown variants fall back
/// to the kind's default variant so a stale variant string never produces a
/// zero-width feature.
pub fn style_for(kind: LinearKind, variant: &str) -> FeatureStyle {
    match (kind, variant) {
        (LinearKind::Road, "highway") => FeatureStyle {
            width: 10.0,
            color: [0.10, 0.10, 0.12, 1.0],
            elevation: 0.04,
            thickness: 0.3,
        },
        (LinearKind::Road, "dirt") => FeatureStyle {
            width: 4.0,
            color: [0.52, 0.47, 0.36, 1.0],
            elevation: 0.02,
            thickness: 0.15,
        },
        (LinearKind::Road, "footpath") => FeatureStyle {
            width: 2.0,
            color: [0.58, 0.56, 0.53, 1.0],
            elevation: 0.02,
            thickness: 0.1,
        },
        (LinearKind::Road, _) => FeatureStyle {
            // "residential"
            width: 6.0,
            color: [0.32, 0.32, 0.34, 1.0],
            elevation: 0.04,
            thickness: 0.2,
        },
        (LinearKind::Wall, "stone") => FeatureStyle {
            width: 0.6,
            color: [0.55, 0.55, 0.52, 1.0],
            elevation: 0.0,
            thickness: 2.2,
        },
        (LinearKind::Wall, "fence") => FeatureStyle {
            width: 0.15,
            color: [0.45, 0.33, 0.22, 1.0],
            elevation: 0.0,
            thickness: 1.2,
        },
        (LinearKind::Wall, _) => FeatureStyle {
            // "brick"
            width: 0.4,
            color: [0.60, 0.30, 0.25, 1.0],
            elevation: 0.0,
            thickness: 1.8,
        },
        (LinearKind::Water, "lake") => FeatureStyle {
            width: 24.0,
            color: [0.15, 0.35, 0.55, 0.9],
            elevation: -0.1,
            thickness: 2.0,
        },
        (LinearKind::Water, "river") => FeatureStyle {
            width: 6.0,
            color: [0.18, 0.40, 0.58, 0.9],
            elevation: -0.1,
            thickness: 1.0,
        },
        (LinearKind::Water, _) => FeatureStyle {
            // "pond"
            width: 8.0,
            color: [0.16, 0.38, 0.56, 0.9],
            elevation: -0.1,
            thickness: 1.5,
        },
    }
}

/// A drawn road, wall, or water body. `points` are never empty; mutation
/// always replaces the whole array rather than editing points in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFeature {
    pub id: ObjectId,
    pub kind: LinearKind,
    pub points: Vec<PathPoint>,
    pub variant: String,
    pub width: f32,
    pub elevation: f32,
    pub thickness: f32,
}

impl LinearFeature {
    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.points.len() >= self.kind.min_points()
            && self.points.iter().all(PathPoint::is_finite)
    }

    /// A single-point water feature renders as a circle of diameter `width`.
    pub fn is_circular(&self) -> bool {
        self.kind == LinearKind::Water && self.points.len() == 1
    }

    /// Straight spans of the raw path. Curved spans are not yielded; junction
    /// detection only tests control-point-free spans (known limitation).
    pub fn straight_segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points
            .windows(2)
            .filter(|pair| pair[0].control.is_none())
            .map(|pair| (pair[0].position, pair[1].position))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SitedKind {
    Building,
    Tree,
}

impl SitedKind {
    /// Footprint extent in grid cells (width, depth).
    pub fn footprint_size(self) -> (f32, f32) {
        match self {
            SitedKind::Building => (4.0, 4.0),
            SitedKind::Tree => (1.0, 1.0),
        }
    }
}

/// A point-footprint object occupying a rectangle of grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitedObject {
    pub id: ObjectId,
    pub kind: SitedKind,
    pub position: Vec2,
    pub grid_width: f32,
    pub grid_depth: f32,
    pub elevation: f32,
}

/// Closed sum over everything that can live in the scene. Adding a feature
/// kind is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneObject {
    Linear(LinearFeature),
    Sited(SitedObject),
}

impl SceneObject {
    pub fn id(&self) -> ObjectId {
        match self {
            SceneObject::Linear(f) => f.id,
            SceneObject::Sited(s) => s.id,
        }
    }

    /// Grid footprint for occupancy tests. Roads and water do not block the
    /// grid; walls occupy the bounding extent of their path inflated by
    /// their width.
    pub fn footprint(&self) -> Option<Footprint> {
        match self {
            SceneObject::Sited(s) => Some(Footprint {
                center: s.position,
                width: s.grid_width,
                depth: s.grid_depth,
            }),
            SceneObject::Linear(f) if f.kind == LinearKind::Wall => {
                let mut min = f.points[0].position;
                let mut max = min;
                for p in &f.points {
                    min = min.min(p.position);
                    max = max.max(p.position);
                }
                Some(Footprint {
                    center: (min + max) * 0.5,
                    width: max.x - min.x + f.width,
                    depth: max.y - min.y + f.width,
                })
            }
            SceneObject::Linear(_) => None,
        }
    }
}
