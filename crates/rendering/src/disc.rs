//! Flat disc meshes for junction fills and circular water bodies.

use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_asset::RenderAssetUsages;

const DISC_SEGMENTS: usize = 24;

/// Build a triangle-fan disc on the ground plane: a border ring at the full
/// radius under a fill disc at 85% of it.
pub fn build_disc(
    center: Vec2,
    radius: f32,
    elevation: f32,
    border_color: [f32; 4],
    fill_color: [f32; 4],
) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut colors: Vec<[f32; 4]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let mut add_fan = |radius: f32, y: f32, color: [f32; 4]| {
        let base = positions.len() as u32;
        positions.push([center.x, y, center.y]);
        normals.push([0.0, 1.0, 0.0]);
        colors.push(color);
        uvs.push([0.5, 0.5]);

        for i in 0..=DISC_SEGMENTS {
            let angle = (i as f32 / DISC_SEGMENTS as f32) * std::f32::consts::TAU;
            let x = center.x + radius * angle.cos();
            let z = center.y + radius * angle.sin();
            positions.push([x, y, z]);
            normals.push([0.0, 1.0, 0.0]);
            colors.push(color);
            uvs.push([0.5 + 0.5 * angle.cos(), 0.5 + 0.5 * angle.sin()]);

            if i > 0 {
                let vi = base + 1 + i as u32;
                indices.push(base);
                indices.push(vi - 1);
                indices.push(vi);
            }
        }
    };

    add_fan(radius, elevation, border_color);
    add_fan(radius * 0.85, elevation + 0.02, fill_color);

    Mesh::new(
        bevy::render::mesh::PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices))
}
