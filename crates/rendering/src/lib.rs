//! Geometry production and display sync for the site-layout editor: ribbon
//! tessellation, junction discs, preview gizmos, and input plumbing.

use bevy::prelude::*;

pub mod disc;
pub mod feature_render;
pub mod input;
pub mod preview;
pub mod ribbon;

use feature_render::GeometryCache;
use input::GroundCursor;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GroundCursor>()
            .init_resource::<GeometryCache>()
            .add_systems(
                Update,
                (
                    input::update_ground_cursor,
                    input::handle_tool_keys,
                    input::emit_placement_clicks.after(input::update_ground_cursor),
                    input::place_sited_objects.after(input::update_ground_cursor),
                    feature_render::sync_feature_meshes,
                    feature_render::sync_junction_discs,
                    preview::draw_session_preview.after(input::update_ground_cursor),
                    preview::draw_junction_markers,
                    preview::draw_centerline_guides,
                ),
            );
    }
}
