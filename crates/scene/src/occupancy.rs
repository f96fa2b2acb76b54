//! Grid occupancy tests for point-footprint objects. A footprint covers an
//! inclusive range of integer cells centered on its position; two objects
//! collide when they share any cell.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::config::CELL_SIZE;
use crate::objects::{ObjectId, SceneObject};

/// Axis-aligned extent used for occupancy tests. `width`/`depth` are in
/// world units (whole cells for sited objects).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub center: Vec2,
    pub width: f32,
    pub depth: f32,
}

impl Footprint {
    /// Quantize the center onto the cell grid, for snap-enabled placement.
    pub fn snapped_to_grid(mut self) -> Self {
        self.center = (self.center / CELL_SIZE).round() * CELL_SIZE;
        self
    }

    /// Inclusive cell ranges covered along each axis:
    /// `floor(c - half + 0.5) ..= floor(c + half - 0.5)` in cell units.
    pub fn cell_ranges(&self) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
        (
            axis_cells(self.center.x / CELL_SIZE, self.width * 0.5 / CELL_SIZE),
            axis_cells(self.center.y / CELL_SIZE, self.depth * 0.5 / CELL_SIZE),
        )
    }

    /// All (x, z) cells this footprint covers.
    pub fn cells(&self) -> Vec<(i32, i32)> {
        let (xs, zs) = self.cell_ranges();
        let mut out = Vec::new();
        for x in xs {
            for z in zs.clone() {
                out.push((x, z));
            }
        }
        out
    }
}

fn axis_cells(center: f32, half: f32) -> RangeInclusive<i32> {
    let lo = (center - half + 0.5).floor() as i32;
    let hi = (center + half - 0.5).floor() as i32;
    if lo > hi {
        // Sub-cell extents still occupy the cell under their center, so
        // cells() and overlap tests stay consistent.
        let cell = center.floor() as i32;
        return cell..=cell;
    }
    lo..=hi
}

fn ranges_share_cell(a: &RangeInclusive<i32>, b: &RangeInclusive<i32>) -> bool {
    a.start() <= b.end() && b.start() <= a.end()
}

/// True if the candidate footprint shares a cell with any existing object's
/// footprint. `exclude` skips one id so a move check does not collide with
/// the object being moved. Stops at the first shared cell.
pub fn footprint_overlaps(
    candidate: &Footprint,
    objects: &[SceneObject],
    exclude: Option<ObjectId>,
) -> bool {
    let (cand_x, cand_z) = candidate.cell_ranges();
    for object in objects {
        if exclude == Some(object.id()) {
            continue;
        }
        let Some(footprint) = object.footprint() else {
            continue;
        };
        let (obj_x, obj_z) = footprint.cell_ranges();
        if ranges_share_cell(&cand_x, &obj_x) && ranges_share_cell(&cand_z, &obj_z) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{SitedKind, SitedObject};

    fn building(id: u32, x: f32, z: f32) -> SceneObject {
        SceneObject::Sited(SitedObject {
            id: ObjectId(id),
            kind: SitedKind::Building,
            position: Vec2::new(x, z),
            grid_width: 4.0,
            grid_depth: 4.0,
            elevation: 0.0,
        })
    }

    #[test]
    fn test_footprint_cell_range() {
        // A 4x4 footprint centered on (2, 2) covers cells 0..=3 on each axis.
        let fp = Footprint {
            center: Vec2::new(2.0, 2.0),
            width: 4.0,
            depth: 4.0,
        };
        let (xs, zs) = fp.cell_ranges();
        assert_eq!(xs, 0..=3);
        assert_eq!(zs, 0..=3);
        assert_eq!(fp.cells().len(), 16);
    }

    #[test]
    fn test_single_cell_footprint() {
        let fp = Footprint {
            center: Vec2::new(5.0, 5.0),
            width: 1.0,
            depth: 1.0,
        };
        assert_eq!(fp.cells(), vec![(5, 5)]);
    }

    #[test]
    fn test_sub_cell_extent_occupies_center_cell() {
        // A wall footprint thinner than one cell still occupies the cells
        // under its centerline.
        let fp = Footprint {
            center: Vec2::new(5.0, 5.0),
            width: 0.4,
            depth: 10.4,
        };
        let (xs, zs) = fp.cell_ranges();
        assert_eq!(xs, 5..=5);
        assert_eq!(zs, 0..=9);
        assert_eq!(fp.cells().len(), 10);
    }

    #[test]
    fn test_thin_wall_blocks_straddling_building() {
        use crate::objects::{LinearFeature, LinearKind};
        use crate::path::PathPoint;

        // Brick wall (width 0.4) running along x = 5: its inflated extent is
        // thinner than one cell on the x axis.
        let wall = SceneObject::Linear(LinearFeature {
            id: ObjectId(0),
            kind: LinearKind::Wall,
            points: vec![PathPoint::new(5.0, 0.0), PathPoint::new(5.0, 10.0)],
            variant: "brick".to_string(),
            width: 0.4,
            elevation: 0.0,
            thickness: 1.8,
        });
        let straddling = Footprint {
            center: Vec2::new(5.0, 5.0),
            width: 4.0,
            depth: 4.0,
        };
        assert!(footprint_overlaps(&straddling, std::slice::from_ref(&wall), None));

        // A building clear of the wall's cell column is not blocked.
        let clear = Footprint {
            center: Vec2::new(9.0, 5.0),
            width: 4.0,
            depth: 4.0,
        };
        assert!(!footprint_overlaps(&clear, &[wall], None));
    }

    #[test]
    fn test_overlapping_buildings_detected() {
        let existing = vec![building(0, 2.0, 2.0)];
        let candidate = Footprint {
            center: Vec2::new(4.0, 2.0),
            width: 4.0,
            depth: 4.0,
        };
        assert!(footprint_overlaps(&candidate, &existing, None));
    }

    #[test]
    fn test_adjacent_buildings_do_not_overlap() {
        let existing = vec![building(0, 2.0, 2.0)]; // cells 0..=3
        let candidate = Footprint {
            center: Vec2::new(6.0, 2.0), // cells 4..=7
            width: 4.0,
            depth: 4.0,
        };
        assert!(!footprint_overlaps(&candidate, &existing, None));
    }

    #[test]
    fn test_exclude_id_for_move_checks() {
        let existing = vec![building(0, 2.0, 2.0)];
        let candidate = Footprint {
            center: Vec2::new(3.0, 2.0),
            width: 4.0,
            depth: 4.0,
        };
        assert!(footprint_overlaps(&candidate, &existing, None));
        // Moving the building itself: its old cells do not count.
        assert!(!footprint_overlaps(&candidate, &existing, Some(ObjectId(0))));
    }

    #[test]
    fn test_snap_to_grid() {
        let fp = Footprint {
            center: Vec2::new(2.4, 2.6),
            width: 1.0,
            depth: 1.0,
        }
        .snapped_to_grid();
        assert_eq!(fp.center, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_roads_never_block_placement() {
        use crate::objects::{LinearFeature, LinearKind};
        use crate::path::PathPoint;

        let road = SceneObject::Linear(LinearFeature {
            id: ObjectId(0),
            kind: LinearKind::Road,
            points: vec![PathPoint::new(0.0, 2.0), PathPoint::new(10.0, 2.0)],
            variant: "residential".to_string(),
            width: 6.0,
            elevation: 0.04,
            thickness: 0.2,
        });
        let candidate = Footprint {
            center: Vec2::new(5.0, 2.0),
            width: 4.0,
            depth: 4.0,
        };
        assert!(!footprint_overlaps(&candidate, &[road], None));
    }
}
