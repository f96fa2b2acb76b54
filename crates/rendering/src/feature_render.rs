//! Synchronize feature and junction meshes with the scene model.
//!
//! Geometry is rebuilt only when an object's tessellation inputs change:
//! each linear feature is keyed by an xxh32 hash of (points, width,
//! elevation), so unrelated store writes never retrigger tessellation.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use xxhash_rust::xxh32::Xxh32;

use scene::junctions::{JunctionId, JunctionIndex, JunctionKind};
use scene::objects::{style_for, LinearFeature, ObjectId, SceneObject};
use scene::store::ObjectStore;

use crate::disc::build_disc;
use crate::ribbon::tessellate_ribbon;

/// Marker component for linear feature mesh entities.
#[derive(Component)]
pub struct FeatureMesh {
    pub object_id: ObjectId,
}

/// Dense centerline of the feature, kept for preview guide lines.
#[derive(Component)]
pub struct FeatureCenterline {
    pub points: Vec<Vec3>,
}

/// Marker component for junction disc entities.
#[derive(Component)]
pub struct JunctionDisc {
    pub junction_id: JunctionId,
}

/// Content hashes of the geometry inputs last tessellated per object.
#[derive(Resource, Default)]
pub struct GeometryCache {
    hashes: HashMap<ObjectId, u32>,
}

/// Hash of everything that feeds tessellation for one feature.
pub fn content_hash(feature: &LinearFeature) -> u32 {
    let mut hasher = Xxh32::new(0);
    for point in &feature.points {
        hasher.update(&point.position.x.to_le_bytes());
        hasher.update(&point.position.y.to_le_bytes());
        match point.control {
            Some(c) => {
                hasher.update(&[1]);
                hasher.update(&c.x.to_le_bytes());
                hasher.update(&c.y.to_le_bytes());
            }
            None => hasher.update(&[0]),
        }
    }
    hasher.update(&feature.width.to_le_bytes());
    hasher.update(&feature.elevation.to_le_bytes());
    hasher.digest()
}

/// Spawn, rebuild, and despawn feature meshes as the object store changes.
pub fn sync_feature_meshes(
    store: Res<ObjectStore>,
    existing: Query<(Entity, &FeatureMesh)>,
    mut cache: ResMut<GeometryCache>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !store.is_changed() {
        return;
    }

    let live_ids: HashSet<ObjectId> = store.linear_features().map(|f| f.id).collect();

    // Despawn meshes for removed objects and for objects whose geometry
    // inputs changed (those respawn below).
    for (entity, marker) in &existing {
        let stale = match store.get(marker.object_id) {
            Some(SceneObject::Linear(feature)) => {
                cache.hashes.get(&feature.id) != Some(&content_hash(feature))
            }
            _ => true,
        };
        if stale {
            commands.entity(entity).despawn();
        }
    }
    cache.hashes.retain(|id, _| live_ids.contains(id));

    let spawned: HashSet<ObjectId> = existing
        .iter()
        .filter(|(_, m)| {
            matches!(store.get(m.object_id), Some(SceneObject::Linear(f))
                if cache.hashes.get(&f.id) == Some(&content_hash(f)))
        })
        .map(|(_, m)| m.object_id)
        .collect();

    for feature in store.linear_features() {
        if spawned.contains(&feature.id) {
            continue;
        }
        cache.hashes.insert(feature.id, content_hash(feature));

        let style = style_for(feature.kind, &feature.variant);
        let (mesh, centerline) = if feature.is_circular() {
            let center = feature.points[0].position;
            let mesh = build_disc(
                center,
                feature.width * 0.5,
                feature.elevation,
                style.color,
                style.color,
            );
            (mesh, Vec::new())
        } else {
            let ribbon = tessellate_ribbon(
                &feature.points,
                feature.width,
                feature.elevation,
                style.color,
            );
            (ribbon.mesh, ribbon.centerline)
        };

        let material = materials.add(StandardMaterial {
            base_color: Color::srgba(
                style.color[0],
                style.color[1],
                style.color[2],
                style.color[3],
            ),
            perceptual_roughness: 0.9,
            ..default()
        });

        commands.spawn((
            FeatureMesh {
                object_id: feature.id,
            },
            FeatureCenterline { points: centerline },
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material),
            Transform::IDENTITY,
        ));
    }
}

/// Rebuild junction discs whenever the junction set changes. Junction counts
/// are small, so a full rebuild beats dirty tracking here.
pub fn sync_junction_discs(
    index: Res<JunctionIndex>,
    existing: Query<Entity, With<JunctionDisc>>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !index.is_changed() {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    for junction in &index.junctions {
        let fill: [f32; 4] = match junction.kind {
            JunctionKind::MultiWay => [0.22, 0.22, 0.25, 1.0],
            _ => [0.28, 0.28, 0.30, 1.0],
        };
        let border: [f32; 4] = [0.50, 0.48, 0.45, 1.0];

        let mesh = build_disc(
            junction.position,
            junction.radius,
            junction.elevation + 0.01,
            border,
            fill,
        );
        let material = materials.add(StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.9,
            ..default()
        });

        commands.spawn((
            JunctionDisc {
                junction_id: junction.id,
            },
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material),
            Transform::IDENTITY,
        ));
    }
}
