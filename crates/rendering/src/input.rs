//! Input plumbing: cursor ray to ground plane, click and key events to the
//! scene's sessions, and sited-object placement with occupancy checks.

use bevy::prelude::*;

use scene::objects::{SceneObject, SitedKind, SitedObject};
use scene::occupancy::{footprint_overlaps, Footprint};
use scene::session::{ActiveTool, DrawingSessions, PlacementClick, SessionCommand};
use scene::store::ObjectStore;

/// Where the cursor ray meets the ground plane this frame, if anywhere.
#[derive(Resource, Default)]
pub struct GroundCursor {
    pub world: Option<Vec2>,
}

/// Each frame, intersect the cursor ray with the Y=0 ground plane.
pub fn update_ground_cursor(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursor: ResMut<GroundCursor>,
) {
    cursor.world = None;
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_transform)) = camera_q.get_single() else {
        return;
    };
    let Some(screen_pos) = window.cursor_position() else {
        return;
    };
    if let Ok(ray) = camera.viewport_to_world(cam_transform, screen_pos) {
        if ray.direction.y.abs() > 0.001 {
            let t = -ray.origin.y / ray.direction.y;
            if t > 0.0 {
                let hit = ray.origin + ray.direction * t;
                cursor.world = Some(Vec2::new(hit.x, hit.z));
            }
        }
    }
}

/// Forward left clicks as normalized world-plane clicks while a linear
/// drawing tool is active.
pub fn emit_placement_clicks(
    buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<GroundCursor>,
    tool: Res<ActiveTool>,
    mut clicks: EventWriter<PlacementClick>,
) {
    if tool.linear_kind().is_none() || !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    if let Some(world) = cursor.world {
        clicks.send(PlacementClick { world });
    }
}

/// Place buildings and trees on free grid cells.
pub fn place_sited_objects(
    buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<GroundCursor>,
    tool: Res<ActiveTool>,
    mut store: ResMut<ObjectStore>,
) {
    let kind = match *tool {
        ActiveTool::PlaceBuilding => SitedKind::Building,
        ActiveTool::PlaceTree => SitedKind::Tree,
        _ => return,
    };
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(world) = cursor.world else {
        return;
    };

    let (grid_width, grid_depth) = kind.footprint_size();
    let footprint = Footprint {
        center: world,
        width: grid_width,
        depth: grid_depth,
    }
    .snapped_to_grid();

    if footprint_overlaps(&footprint, store.get_all(), None) {
        info!("{kind:?} placement blocked at {:?}", footprint.center);
        return;
    }

    let id = store.allocate_id();
    store.add_object(SceneObject::Sited(SitedObject {
        id,
        kind,
        position: footprint.center,
        grid_width,
        grid_depth,
        elevation: 0.0,
    }));
}

/// Tool switching and session keys.
///
/// 1-6 select tools; Enter finishes, Backspace undoes a point, Escape
/// cancels, C curves the last span, G toggles grid snap.
pub fn handle_tool_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut sessions: ResMut<DrawingSessions>,
    mut tool: ResMut<ActiveTool>,
    mut commands: EventWriter<SessionCommand>,
) {
    for (key, selected) in [
        (KeyCode::Digit1, ActiveTool::Inspect),
        (KeyCode::Digit2, ActiveTool::DrawRoad),
        (KeyCode::Digit3, ActiveTool::DrawWall),
        (KeyCode::Digit4, ActiveTool::DrawWater),
        (KeyCode::Digit5, ActiveTool::PlaceBuilding),
        (KeyCode::Digit6, ActiveTool::PlaceTree),
    ] {
        if keys.just_pressed(key) && *tool != selected {
            // Tool switching is gated: the old stroke is cancelled before
            // the new tool takes over, never left half-drawn.
            if let Some(old_kind) = tool.linear_kind() {
                sessions.session_mut(old_kind).cancel();
            }
            *tool = selected;
        }
    }

    let Some(kind) = tool.linear_kind() else {
        return;
    };

    if keys.just_pressed(KeyCode::Enter) {
        commands.send(SessionCommand::Finish);
    }
    if keys.just_pressed(KeyCode::Backspace) {
        commands.send(SessionCommand::UndoPoint);
    }
    if keys.just_pressed(KeyCode::Escape) {
        commands.send(SessionCommand::Cancel);
    }
    if keys.just_pressed(KeyCode::KeyC) {
        commands.send(SessionCommand::CurveLastSpan);
    }
    if keys.just_pressed(KeyCode::KeyG) {
        let current = sessions.session(kind).snap_to_grid;
        commands.send(SessionCommand::SetGridSnap(!current));
    }
}
