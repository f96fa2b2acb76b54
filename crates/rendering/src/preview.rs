//! Gizmo previews: the in-progress stroke, junction markers, and centerline
//! guide lines while a drawing tool is active.

use bevy::prelude::*;

use scene::junctions::{JunctionIndex, JunctionKind};
use scene::path::expand_polyline;
use scene::session::{ActiveTool, DrawingSessions};

use crate::feature_render::FeatureCenterline;
use crate::input::GroundCursor;

/// Height above the ground plane for preview gizmos.
const GIZMO_Y: f32 = 0.15;

/// Draw the active session's accumulated stroke plus a rubber line to the
/// cursor.
pub fn draw_session_preview(
    sessions: Res<DrawingSessions>,
    tool: Res<ActiveTool>,
    cursor: Res<GroundCursor>,
    mut gizmos: Gizmos,
) {
    let Some(kind) = tool.linear_kind() else {
        return;
    };
    let session = sessions.session(kind);
    if !session.is_drawing() {
        return;
    }

    let line_color = Color::srgba(0.2, 0.9, 0.4, 0.9);
    let point_color = Color::srgba(1.0, 1.0, 1.0, 0.9);

    // Expanded polyline so curved spans preview as curves.
    let polyline: Vec<Vec3> = expand_polyline(&session.points)
        .into_iter()
        .map(|p| Vec3::new(p.x, GIZMO_Y, p.y))
        .collect();
    if polyline.len() >= 2 {
        gizmos.linestrip(polyline, line_color);
    }

    for point in &session.points {
        let pos = Vec3::new(point.position.x, GIZMO_Y, point.position.y);
        gizmos.circle(
            Isometry3d::new(pos, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            0.4,
            point_color,
        );
    }

    // Rubber line from the last point to the cursor.
    if let (Some(last), Some(world)) = (session.points.last(), cursor.world) {
        gizmos.line(
            Vec3::new(last.position.x, GIZMO_Y, last.position.y),
            Vec3::new(world.x, GIZMO_Y, world.y),
            line_color.with_alpha(0.5),
        );
    }
}

/// Circle markers at every detected junction, colored by classification.
pub fn draw_junction_markers(index: Res<JunctionIndex>, mut gizmos: Gizmos) {
    for junction in &index.junctions {
        let color = match junction.kind {
            JunctionKind::TJunction => Color::srgba(0.2, 0.8, 1.0, 0.9),
            JunctionKind::YJunction => Color::srgba(0.9, 0.8, 0.2, 0.9),
            JunctionKind::Cross => Color::srgba(1.0, 0.5, 0.2, 0.9),
            JunctionKind::MultiWay => Color::srgba(1.0, 0.2, 0.2, 0.9),
            JunctionKind::End | JunctionKind::LCorner => Color::srgba(0.6, 0.6, 0.6, 0.9),
        };
        let pos = Vec3::new(junction.position.x, GIZMO_Y, junction.position.y);
        gizmos.circle(
            Isometry3d::new(pos, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            junction.radius,
            color,
        );
    }
}

/// Faint centerline guides for committed features while drawing, so new
/// strokes can line up with existing ones.
pub fn draw_centerline_guides(
    tool: Res<ActiveTool>,
    centerlines: Query<&FeatureCenterline>,
    mut gizmos: Gizmos,
) {
    if tool.linear_kind().is_none() {
        return;
    }
    let guide_color = Color::srgba(1.0, 1.0, 1.0, 0.25);
    for centerline in &centerlines {
        if centerline.points.len() >= 2 {
            let raised: Vec<Vec3> = centerline
                .points
                .iter()
                .map(|p| Vec3::new(p.x, GIZMO_Y, p.z))
                .collect();
            gizmos.linestrip(raised, guide_color);
        }
    }
}
