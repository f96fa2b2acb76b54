//! Junction detection between independently-drawn linear features.
//!
//! Only straight (control-point-free) spans are tested; curved spans are
//! skipped. Crossings are clustered by proximity and classified purely by
//! how many features meet, not by their geometry — a true geometric cross of
//! exactly two roads still reports as a T-junction.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::config::{
    JUNCTION_CLUSTER_TOLERANCE, JUNCTION_RADIUS_FACTOR, SEGMENT_PARALLEL_EPS,
};
use crate::objects::{LinearFeature, LinearKind, ObjectId};
use crate::store::ObjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionKind {
    /// A dangling feature endpoint. Not produced by pairwise detection.
    End,
    /// A corner within a single feature's own polyline. Reserved; the
    /// detector only reports crossings between different features.
    LCorner,
    TJunction,
    YJunction,
    Cross,
    MultiWay,
}

/// Classification is a pure function of the connected-feature count.
pub fn classify(connected: usize) -> JunctionKind {
    match connected {
        0 | 1 => JunctionKind::End,
        2 => JunctionKind::TJunction,
        3 => JunctionKind::YJunction,
        4 => JunctionKind::Cross,
        _ => JunctionKind::MultiWay,
    }
}

/// A point where two or more features cross. Derived state: recomputed from
/// the current object set whenever it changes, never persisted.
#[derive(Debug, Clone)]
pub struct Junction {
    pub id: JunctionId,
    pub position: Vec2,
    pub connected: Vec<ObjectId>,
    pub connected_kinds: Vec<LinearKind>,
    pub kind: JunctionKind,
    pub angle: f32,
    pub radius: f32,
    pub elevation: f32,
}

/// 2D segment-segment intersection via the determinant method, solved in f64
/// so the parallel epsilon matches the reference tolerance. Returns the
/// crossing point only when both parameters lie in [0, 1].
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let d1x = (a2.x - a1.x) as f64;
    let d1y = (a2.y - a1.y) as f64;
    let d2x = (b2.x - b1.x) as f64;
    let d2y = (b2.y - b1.y) as f64;

    let det = d1x * d2y - d1y * d2x;
    if det.abs() < SEGMENT_PARALLEL_EPS {
        return None; // parallel or coincident
    }

    let dx = (b1.x - a1.x) as f64;
    let dy = (b1.y - a1.y) as f64;
    let t = (dx * d2y - dy * d2x) / det;
    let u = (dx * d1y - dy * d1x) / det;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Vec2::new(
            (a1.x as f64 + d1x * t) as f32,
            (a1.y as f64 + d1y * t) as f32,
        ))
    } else {
        None
    }
}

struct Cluster {
    sum: Vec2,
    count: u32,
    connected: Vec<ObjectId>,
    first_dir: Vec2,
}

impl Cluster {
    fn centroid(&self) -> Vec2 {
        self.sum / self.count as f32
    }

    fn absorb(&mut self, point: Vec2, a: ObjectId, b: ObjectId) {
        self.sum += point;
        self.count += 1;
        for id in [a, b] {
            if !self.connected.contains(&id) {
                self.connected.push(id);
            }
        }
    }
}

/// Find and classify all junctions between the given features.
///
/// The result does not depend on feature order: crossings merge into the
/// nearest existing cluster (nearest-centroid-wins), and the output is sorted
/// by position before ids are assigned.
pub fn detect_junctions(features: &[&LinearFeature]) -> Vec<Junction> {
    // (owner, start, end) for every straight span
    let mut segments: Vec<(ObjectId, Vec2, Vec2)> = Vec::new();
    for feature in features {
        for (start, end) in feature.straight_segments() {
            segments.push((feature.id, start, end));
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();

    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let (owner_a, a1, a2) = segments[i];
            let (owner_b, b1, b2) = segments[j];
            if owner_a == owner_b {
                continue;
            }
            let Some(point) = segment_intersection(a1, a2, b1, b2) else {
                continue;
            };

            // Nearest-centroid-wins merge keeps clustering stable under
            // pair iteration order.
            let mut best: Option<(usize, f32)> = None;
            for (idx, cluster) in clusters.iter().enumerate() {
                let dist = (cluster.centroid() - point).length();
                if dist <= JUNCTION_CLUSTER_TOLERANCE
                    && best.is_none_or(|(_, d)| dist < d)
                {
                    best = Some((idx, dist));
                }
            }
            match best {
                Some((idx, _)) => clusters[idx].absorb(point, owner_a, owner_b),
                None => clusters.push(Cluster {
                    sum: point,
                    count: 1,
                    connected: vec![owner_a, owner_b],
                    first_dir: (a2 - a1).normalize_or_zero(),
                }),
            }
        }
    }

    let by_id: BTreeMap<ObjectId, &LinearFeature> =
        features.iter().map(|f| (f.id, *f)).collect();

    let mut junctions: Vec<Junction> = clusters
        .into_iter()
        .map(|mut cluster| {
            cluster.connected.sort();
            let connected_kinds = cluster
                .connected
                .iter()
                .filter_map(|id| by_id.get(id).map(|f| f.kind))
                .collect();
            let max_width = cluster
                .connected
                .iter()
                .filter_map(|id| by_id.get(id).map(|f| f.width))
                .fold(0.0_f32, f32::max);
            let elevation = cluster
                .connected
                .iter()
                .filter_map(|id| by_id.get(id).map(|f| f.elevation))
                .fold(f32::MIN, f32::max);
            Junction {
                id: JunctionId(0), // assigned after sorting
                position: cluster.centroid(),
                kind: classify(cluster.connected.len()),
                angle: cluster.first_dir.y.atan2(cluster.first_dir.x),
                radius: max_width * 0.5 * JUNCTION_RADIUS_FACTOR,
                elevation,
                connected: cluster.connected,
                connected_kinds,
            }
        })
        .collect();

    junctions.sort_by(|a, b| {
        a.position
            .x
            .total_cmp(&b.position.x)
            .then(a.position.y.total_cmp(&b.position.y))
    });
    for (idx, junction) in junctions.iter_mut().enumerate() {
        junction.id = JunctionId(idx as u32);
    }
    junctions
}

/// Derived junction set for the current object list.
#[derive(Resource, Default)]
pub struct JunctionIndex {
    pub junctions: Vec<Junction>,
}

/// Recompute junctions from scratch whenever the object list changes.
pub fn recompute_junctions(store: Res<ObjectStore>, mut index: ResMut<JunctionIndex>) {
    if !store.is_changed() {
        return;
    }
    let features: Vec<&LinearFeature> = store.linear_features().collect();
    index.junctions = detect_junctions(&features);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathPoint;

    fn feature(id: u32, kind: LinearKind, points: &[(f32, f32)], width: f32) -> LinearFeature {
        LinearFeature {
            id: ObjectId(id),
            kind,
            points: points.iter().map(|&(x, z)| PathPoint::new(x, z)).collect(),
            variant: kind.default_variant().to_string(),
            width,
            elevation: 0.04,
            thickness: 0.2,
        }
    }

    #[test]
    fn test_two_crossing_roads() {
        let a = feature(0, LinearKind::Road, &[(0.0, 0.0), (10.0, 0.0)], 6.0);
        let b = feature(1, LinearKind::Road, &[(5.0, -5.0), (5.0, 5.0)], 6.0);
        let junctions = detect_junctions(&[&a, &b]);

        assert_eq!(junctions.len(), 1);
        let j = &junctions[0];
        assert!((j.position - Vec2::new(5.0, 0.0)).length() < 0.01);
        assert_eq!(j.connected, vec![ObjectId(0), ObjectId(1)]);
        // Two connected features classify as T-junction regardless of the
        // geometric crossing shape.
        assert_eq!(j.kind, JunctionKind::TJunction);
        assert!((j.radius - 4.5).abs() < 0.01); // 6/2 * 1.5
    }

    #[test]
    fn test_classification_by_count() {
        assert_eq!(classify(2), JunctionKind::TJunction);
        assert_eq!(classify(3), JunctionKind::YJunction);
        assert_eq!(classify(4), JunctionKind::Cross);
        assert_eq!(classify(5), JunctionKind::MultiWay);
        assert_eq!(classify(1), JunctionKind::End);
    }

    #[test]
    fn test_star_of_roads_clusters_into_one_junction() {
        // Four roads through the origin at different angles.
        let a = feature(0, LinearKind::Road, &[(-10.0, 0.0), (10.0, 0.0)], 6.0);
        let b = feature(1, LinearKind::Road, &[(0.0, -10.0), (0.0, 10.0)], 6.0);
        let c = feature(2, LinearKind::Road, &[(-10.0, -10.0), (10.0, 10.0)], 4.0);
        let d = feature(3, LinearKind::Road, &[(-10.0, 10.0), (10.0, -10.0)], 4.0);
        let junctions = detect_junctions(&[&a, &b, &c, &d]);

        assert_eq!(junctions.len(), 1);
        let j = &junctions[0];
        assert_eq!(j.connected.len(), 4);
        assert_eq!(j.kind, JunctionKind::Cross);
        assert!((j.position - Vec2::ZERO).length() < 0.01);
        // Radius comes from the widest connected feature.
        assert!((j.radius - 4.5).abs() < 0.01);
    }

    #[test]
    fn test_order_independence() {
        let a = feature(0, LinearKind::Road, &[(-10.0, 0.0), (10.0, 0.0)], 6.0);
        let b = feature(1, LinearKind::Road, &[(0.0, -10.0), (0.0, 10.0)], 6.0);
        let c = feature(2, LinearKind::Wall, &[(20.0, -5.0), (20.0, 5.0)], 0.4);
        let d = feature(3, LinearKind::Road, &[(15.0, 0.0), (25.0, 0.0)], 6.0);

        let forward = detect_junctions(&[&a, &b, &c, &d]);
        let reversed = detect_junctions(&[&d, &c, &b, &a]);
        let rotated = detect_junctions(&[&b, &c, &d, &a]);

        for other in [&reversed, &rotated] {
            assert_eq!(forward.len(), other.len());
            for (x, y) in forward.iter().zip(other.iter()) {
                assert!((x.position - y.position).length() < 0.01);
                assert_eq!(x.connected, y.connected);
                assert_eq!(x.kind, y.kind);
            }
        }
    }

    #[test]
    fn test_parallel_segments_rejected() {
        let a = feature(0, LinearKind::Road, &[(0.0, 0.0), (10.0, 0.0)], 6.0);
        let b = feature(1, LinearKind::Road, &[(0.0, 1.0), (10.0, 1.0)], 6.0);
        assert!(detect_junctions(&[&a, &b]).is_empty());
    }

    #[test]
    fn test_crossing_outside_segment_extent_rejected() {
        // The infinite lines cross at (5, 0) but segment b ends before it.
        let a = feature(0, LinearKind::Road, &[(0.0, 0.0), (10.0, 0.0)], 6.0);
        let b = feature(1, LinearKind::Road, &[(5.0, -5.0), (5.0, -1.0)], 6.0);
        assert!(detect_junctions(&[&a, &b]).is_empty());
    }

    #[test]
    fn test_curved_spans_skipped() {
        let mut a = feature(0, LinearKind::Road, &[(0.0, 0.0), (10.0, 0.0)], 6.0);
        a.points[0].control = Some(Vec2::new(5.0, 5.0));
        let b = feature(1, LinearKind::Road, &[(5.0, -5.0), (5.0, 5.0)], 6.0);
        assert!(detect_junctions(&[&a, &b]).is_empty());
    }

    #[test]
    fn test_self_crossing_not_reported() {
        // A single feature crossing itself produces no junction; only pairs
        // of different owners are tested.
        let a = feature(
            0,
            LinearKind::Road,
            &[(0.0, 0.0), (10.0, 0.0), (5.0, 5.0), (5.0, -5.0)],
            6.0,
        );
        assert!(detect_junctions(&[&a]).is_empty());
    }

    #[test]
    fn test_segment_intersection_basic() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
        );
        assert!((hit.unwrap() - Vec2::new(5.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_mixed_kinds_classify_by_count_only() {
        let a = feature(0, LinearKind::Road, &[(-5.0, 0.0), (5.0, 0.0)], 6.0);
        let b = feature(1, LinearKind::Wall, &[(0.0, -5.0), (0.0, 5.0)], 0.4);
        let junctions = detect_junctions(&[&a, &b]);
        assert_eq!(junctions.len(), 1);
        assert_eq!(junctions[0].kind, JunctionKind::TJunction);
        assert_eq!(
            junctions[0].connected_kinds,
            vec![LinearKind::Road, LinearKind::Wall]
        );
    }
}
