//! Ribbon tessellation: turns a feature centerline into a triangulated
//! offset strip plus the dense centerline polyline used for previews.

use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_asset::RenderAssetUsages;

use scene::path::{expand_polyline, polyline_length, PathPoint};

/// Consecutive samples closer than this are dropped so zero-length tangents
/// never reach the offset step.
const MIN_SAMPLE_SPACING: f32 = 1e-5;

pub struct RibbonGeometry {
    pub mesh: Mesh,
    pub centerline: Vec<Vec3>,
}

/// Tessellate a path into a ribbon of the given width at the given
/// elevation. Fewer than two distinct samples produce empty geometry, not an
/// error.
///
/// Interior tangents average the incoming and outgoing directions, which
/// rounds sharp corners instead of mitering them exactly — a deliberate
/// simplification.
pub fn tessellate_ribbon(
    points: &[PathPoint],
    width: f32,
    elevation: f32,
    color: [f32; 4],
) -> RibbonGeometry {
    let mut samples = expand_polyline(points);
    samples.dedup_by(|a, b| (*a - *b).length() < MIN_SAMPLE_SPACING);

    if samples.len() < 2 {
        return RibbonGeometry {
            mesh: empty_mesh(),
            centerline: Vec::new(),
        };
    }

    let half_w = width * 0.5;
    let total_len = polyline_length(&samples).max(1.0);
    let dirs: Vec<Vec2> = samples
        .windows(2)
        .map(|w| (w[1] - w[0]).normalize_or_zero())
        .collect();

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(samples.len() * 2);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(samples.len() * 2);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(samples.len() * 2);
    let mut indices: Vec<u32> = Vec::with_capacity((samples.len() - 1) * 6);

    let mut cumulative_len = 0.0_f32;

    for (i, pt) in samples.iter().enumerate() {
        let tangent = if i == 0 {
            dirs[0]
        } else if i == samples.len() - 1 {
            dirs[i - 1]
        } else {
            let avg = dirs[i - 1] + dirs[i];
            if avg.length() < MIN_SAMPLE_SPACING {
                // 180-degree turnback; fall back to the incoming direction.
                dirs[i - 1]
            } else {
                avg.normalize()
            }
        };
        // Left-hand perpendicular of the tangent on the ground plane.
        let perp = Vec2::new(-tangent.y, tangent.x);

        if i > 0 {
            cumulative_len += (samples[i] - samples[i - 1]).length();
        }
        let v = cumulative_len / total_len;

        let left = *pt - perp * half_w;
        let right = *pt + perp * half_w;

        positions.push([left.x, elevation, left.y]);
        colors.push(color);
        uvs.push([0.0, v]);

        positions.push([right.x, elevation, right.y]);
        colors.push(color);
        uvs.push([1.0, v]);

        if i > 0 {
            let base = (i as u32 - 1) * 2;
            let next = i as u32 * 2;
            indices.push(base);
            indices.push(base + 1);
            indices.push(next);

            indices.push(base + 1);
            indices.push(next + 1);
            indices.push(next);
        }
    }

    let mut mesh = Mesh::new(
        bevy::render::mesh::PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices));
    // Normals come from the final vertex/index buffers, not an assumed up
    // vector, so filtered degenerate samples cannot leave NaNs behind.
    mesh.compute_smooth_normals();

    let centerline = samples
        .into_iter()
        .map(|p| Vec3::new(p.x, elevation, p.y))
        .collect();

    RibbonGeometry { mesh, centerline }
}

fn empty_mesh() -> Mesh {
    Mesh::new(
        bevy::render::mesh::PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, Vec::<[f32; 3]>::new())
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, Vec::<[f32; 4]>::new())
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, Vec::<[f32; 2]>::new())
    .with_inserted_indices(Indices::U32(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;
    use scene::config::CURVE_SEGMENTS;

    const GRAY: [f32; 4] = [0.32, 0.32, 0.34, 1.0];

    fn mesh_positions(mesh: &Mesh) -> &Vec<[f32; 3]> {
        match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(p)) => p,
            _ => panic!("missing positions"),
        }
    }

    #[test]
    fn test_straight_ribbon_shape() {
        let points = vec![PathPoint::new(0.0, 0.0), PathPoint::new(10.0, 0.0)];
        let ribbon = tessellate_ribbon(&points, 6.0, 0.04, GRAY);

        let positions = mesh_positions(&ribbon.mesh);
        assert_eq!(positions.len(), 4);
        // Direction (1,0): left-hand perpendicular is (0,1), so vertices
        // sit at z = -3 and z = +3 at the path elevation.
        assert!((positions[0][2] + 3.0).abs() < 0.01);
        assert!((positions[1][2] - 3.0).abs() < 0.01);
        for p in positions {
            assert!((p[1] - 0.04).abs() < 0.001);
        }
        assert_eq!(ribbon.mesh.indices().unwrap().len(), 6);
    }

    #[test]
    fn test_fewer_than_two_points_empty() {
        let ribbon = tessellate_ribbon(&[PathPoint::new(0.0, 0.0)], 6.0, 0.0, GRAY);
        assert_eq!(mesh_positions(&ribbon.mesh).len(), 0);
        assert!(ribbon.centerline.is_empty());

        let ribbon = tessellate_ribbon(&[], 6.0, 0.0, GRAY);
        assert!(ribbon.centerline.is_empty());
    }

    #[test]
    fn test_duplicate_points_filtered_no_nan() {
        let points = vec![
            PathPoint::new(0.0, 0.0),
            PathPoint::new(0.0, 0.0),
            PathPoint::new(10.0, 0.0),
            PathPoint::new(10.0, 0.0),
        ];
        let ribbon = tessellate_ribbon(&points, 6.0, 0.0, GRAY);
        let positions = mesh_positions(&ribbon.mesh);
        assert_eq!(positions.len(), 4); // duplicates collapsed to 2 samples
        for p in positions {
            assert!(p.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_all_duplicates_collapse_to_empty() {
        let points = vec![PathPoint::new(5.0, 5.0), PathPoint::new(5.0, 5.0)];
        let ribbon = tessellate_ribbon(&points, 6.0, 0.0, GRAY);
        assert_eq!(mesh_positions(&ribbon.mesh).len(), 0);
    }

    #[test]
    fn test_curved_span_sample_count() {
        let points = vec![
            PathPoint::with_control(0.0, 0.0, 5.0, 5.0),
            PathPoint::new(10.0, 0.0),
        ];
        let ribbon = tessellate_ribbon(&points, 4.0, 0.0, GRAY);
        let expected_samples = 1 + CURVE_SEGMENTS;
        assert_eq!(mesh_positions(&ribbon.mesh).len(), expected_samples * 2);
        assert_eq!(ribbon.centerline.len(), expected_samples);
        assert_eq!(
            ribbon.mesh.indices().unwrap().len(),
            (expected_samples - 1) * 6
        );
    }

    #[test]
    fn test_centerline_follows_path() {
        let points = vec![PathPoint::new(0.0, 0.0), PathPoint::new(10.0, 0.0)];
        let ribbon = tessellate_ribbon(&points, 6.0, 0.5, GRAY);
        assert_eq!(ribbon.centerline.len(), 2);
        assert_eq!(ribbon.centerline[0], Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(ribbon.centerline[1], Vec3::new(10.0, 0.5, 0.0));
    }

    #[test]
    fn test_normals_recomputed_and_finite() {
        let points = vec![
            PathPoint::new(0.0, 0.0),
            PathPoint::new(10.0, 0.0),
            PathPoint::new(10.0, 10.0),
        ];
        let ribbon = tessellate_ribbon(&points, 2.0, 0.0, GRAY);
        let normals = match ribbon.mesh.attribute(Mesh::ATTRIBUTE_NORMAL) {
            Some(VertexAttributeValues::Float32x3(n)) => n,
            _ => panic!("missing normals"),
        };
        assert_eq!(normals.len(), 6);
        for n in normals {
            assert!(n.iter().all(|c| c.is_finite()));
            // Flat ribbon: normals point up.
            assert!(n[1] > 0.9);
        }
    }
}
