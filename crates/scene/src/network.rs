//! Network optimizer: reconciles feature endpoints with detected junction
//! centers so independently-drawn features meet exactly.

use bevy::prelude::*;

use crate::config::ENDPOINT_SNAP_FACTOR;
use crate::junctions::{Junction, JunctionIndex};
use crate::objects::{LinearFeature, SceneObject};
use crate::path::PathPoint;
use crate::store::ObjectStore;

/// Snap a feature's endpoints onto any junction center they sit near.
///
/// Returns the new point array, or None when nothing moved. Pure: the input
/// feature is untouched, so the live session buffer can never alias the
/// committed object. Idempotent: an endpoint already on a center stays put.
pub fn snap_endpoints(feature: &LinearFeature, junctions: &[Junction]) -> Option<Vec<PathPoint>> {
    if feature.points.len() < 2 {
        return None;
    }
    let mut points = feature.points.clone();
    let mut moved = false;
    let last = points.len() - 1;

    for junction in junctions {
        if !junction.connected.contains(&feature.id) {
            continue;
        }
        let snap_dist = junction.radius * ENDPOINT_SNAP_FACTOR;
        for idx in [0, last] {
            let p = points[idx].position;
            if p != junction.position && (p - junction.position).length() <= snap_dist {
                points[idx].position = junction.position;
                moved = true;
            }
        }
    }

    moved.then_some(points)
}

/// Apply endpoint snapping to the store after junctions change. Writes are
/// whole-object replacements and only issued when an endpoint actually
/// moved, so the store settles instead of re-dirtying itself every frame.
pub fn apply_endpoint_snapping(index: Res<JunctionIndex>, mut store: ResMut<ObjectStore>) {
    if !index.is_changed() || index.junctions.is_empty() {
        return;
    }

    let updates: Vec<(crate::objects::ObjectId, LinearFeature)> = store
        .linear_features()
        .filter_map(|feature| {
            snap_endpoints(feature, &index.junctions).map(|points| {
                let mut snapped = feature.clone();
                snapped.points = points;
                (feature.id, snapped)
            })
        })
        .collect();

    for (id, snapped) in updates {
        store.update_object(id, SceneObject::Linear(snapped));
    }
}
