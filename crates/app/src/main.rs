use bevy::prelude::*;
use bevy::window::PresentMode;

use scene::config::{WORLD_HEIGHT, WORLD_WIDTH};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "SitePlan".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins((scene::ScenePlugin, rendering::RenderingPlugin))
        .add_systems(Startup, setup_scene)
        .run();
}

/// Fixed camera over the site center, a sun light, and the ground plane.
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let center = Vec3::new(WORLD_WIDTH * 0.5, 0.0, WORLD_HEIGHT * 0.5);

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(center + Vec3::new(0.0, 180.0, 120.0))
            .looking_at(center, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -1.0, 0.4, 0.0)),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(WORLD_WIDTH, WORLD_HEIGHT))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.42, 0.55, 0.35),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_translation(center),
    ));
}
