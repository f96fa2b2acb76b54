//! Core scene model for the site-layout editor: path model, object store,
//! junction detection, endpoint snapping, grid occupancy, and the
//! interactive drawing sessions.
//!
//! Everything here is synchronous and single-threaded; tessellation and
//! junction detection are pure functions re-run when the object list
//! changes. The systems registered by [`ScenePlugin`] run in a fixed chain
//! so a frame's clicks are applied before junctions are recomputed and
//! endpoints snapped.

use bevy::prelude::*;

pub mod config;
pub mod junctions;
pub mod network;
pub mod objects;
pub mod occupancy;
pub mod path;
pub mod session;
pub mod store;

use junctions::JunctionIndex;
use session::{ActiveTool, DrawingSessions, PlacementClick, SessionCommand};
use store::ObjectStore;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObjectStore>()
            .init_resource::<JunctionIndex>()
            .init_resource::<DrawingSessions>()
            .init_resource::<ActiveTool>()
            .add_event::<PlacementClick>()
            .add_event::<SessionCommand>()
            .add_systems(
                Update,
                (
                    session::handle_session_input,
                    junctions::recompute_junctions,
                    network::apply_endpoint_snapping,
                )
                    .chain(),
            );
    }
}
