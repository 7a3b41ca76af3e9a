use crate::galaxy::GalaxyBuffers;
use bevy::{
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        render_asset::RenderAssetUsages,
    },
};

const CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Builds a point cloud mesh: one quad per particle, all four vertices at
/// the particle centre with the corner in UV0. The vertex shader expands
/// the quad towards the camera.
pub fn points_mesh(buffers: &GalaxyBuffers) -> Mesh {
    let vertex_count = buffers.len() * CORNERS.len();

    let mut positions = Vec::with_capacity(vertex_count);
    let mut corners = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(buffers.len() * QUAD_INDICES.len());

    for (i, (position, color)) in buffers.positions.iter().zip(&buffers.colors).enumerate() {
        let base = (i * CORNERS.len()) as u32;
        for corner in CORNERS {
            positions.push(*position);
            corners.push(corner);
            colors.push([color[0], color[1], color[2], 1.0]);
        }
        indices.extend(QUAD_INDICES.iter().map(|index| base + index));
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
    .with_inserted_indices(Indices::U32(indices))
}
