use bevy::{
    prelude::*,
    reflect::TypePath,
    render::render_resource::{AsBindGroup, ShaderRef, ShaderType},
};
use bytemuck::{Pod, Zeroable};

const SHADER_ASSET_PATH: &str = "shaders/galaxy_points.wgsl";

pub struct PointsMaterialPlugin;

impl Plugin for PointsMaterialPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<PointsMaterial> {
            prepass_enabled: false,
            shadows_enabled: false,
            ..default()
        });
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum PointBlending {
    Normal,
    #[default]
    Additive,
}

// Mirrors `PointSettings` in galaxy_points.wgsl
#[derive(ShaderType, Pod, Zeroable, Clone, Copy, Debug)]
#[repr(C)]
pub struct PointSettings {
    color: Vec4,
    size: f32,
    size_attenuation: u32,
    vertex_colors: u32,
    additive: u32,
}

/// Point sprite material, the counterpart of a `PointsMaterial` in most
/// scene graph libraries.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
#[bind_group_data(PointsMaterialKey)]
#[uniform(0, PointSettings)]
pub struct PointsMaterial {
    pub size: f32,
    /// Shrink points with distance from the camera.
    pub size_attenuation: bool,
    pub depth_write: bool,
    pub blending: PointBlending,
    pub vertex_colors: bool,
    /// Used when `vertex_colors` is off.
    pub color: LinearRgba,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 1.0,
            size_attenuation: true,
            depth_write: true,
            blending: PointBlending::Normal,
            vertex_colors: false,
            color: LinearRgba::WHITE,
        }
    }
}

impl PointsMaterial {
    /// Settings every galaxy is drawn with.
    pub fn galaxy(size: f32) -> Self {
        Self {
            size,
            size_attenuation: true,
            depth_write: false,
            blending: PointBlending::Additive,
            vertex_colors: true,
            ..default()
        }
    }
}

impl From<&PointsMaterial> for PointSettings {
    fn from(material: &PointsMaterial) -> Self {
        Self {
            color: material.color.to_vec4(),
            size: material.size,
            size_attenuation: material.size_attenuation as u32,
            vertex_colors: material.vertex_colors as u32,
            additive: (material.blending == PointBlending::Additive) as u32,
        }
    }
}

use bevy::color::ColorToComponents;
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::render::{
    mesh::MeshVertexBufferLayoutRef,
    render_resource::{RenderPipelineDescriptor, SpecializedMeshPipelineError},
};

impl Material for PointsMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        match self.blending {
            PointBlending::Normal => AlphaMode::Blend,
            PointBlending::Additive => AlphaMode::Add,
        }
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];

        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = key.bind_group_data.depth_write;
        }
        // Points face the camera, both windings are visible.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

#[derive(Eq, PartialEq, Hash, Clone)]
pub struct PointsMaterialKey {
    depth_write: bool,
}

impl From<&PointsMaterial> for PointsMaterialKey {
    fn from(material: &PointsMaterial) -> Self {
        Self {
            depth_write: material.depth_write,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_galaxy_material_settings() {
        let material = PointsMaterial::galaxy(0.02);
        assert_eq!(material.size, 0.02);
        assert!(material.size_attenuation);
        assert!(!material.depth_write);
        assert!(material.vertex_colors);
        assert_eq!(material.blending, PointBlending::Additive);
        assert_eq!(material.alpha_mode(), AlphaMode::Add);
    }

    #[test]
    fn test_uniform_flags() {
        let settings = PointSettings::from(&PointsMaterial::galaxy(0.05));
        assert_eq!(settings.size, 0.05);
        assert_eq!(settings.size_attenuation, 1);
        assert_eq!(settings.vertex_colors, 1);
        assert_eq!(settings.additive, 1);

        let flat = PointSettings::from(&PointsMaterial {
            size_attenuation: false,
            ..default()
        });
        assert_eq!(flat.size_attenuation, 0);
        assert_eq!(flat.vertex_colors, 0);
        assert_eq!(flat.color, Vec4::ONE);
        assert_eq!(flat.additive, 0);
    }

    #[test]
    fn test_additive_output_sums_overlaps() {
        // Add is drawn with premultiplied blending: out = src + (1 - src_a) * dst,
        // which only sums when the fragment alpha is 0.
        let fragment_alpha = |settings: &PointSettings| {
            if settings.additive != 0 {
                0.0
            } else {
                1.0
            }
        };
        let blend = |src: f32, src_a: f32, dst: f32| src + (1.0 - src_a) * dst;

        let additive = PointSettings::from(&PointsMaterial::galaxy(0.02));
        let a = fragment_alpha(&additive);
        let out = blend(0.3, a, blend(0.3, a, 0.0));
        assert!((out - 0.6).abs() < 1e-6);

        let normal = PointSettings::from(&PointsMaterial {
            blending: PointBlending::Normal,
            ..PointsMaterial::galaxy(0.02)
        });
        let a = fragment_alpha(&normal);
        let out = blend(0.3, a, blend(0.3, a, 0.0));
        assert!((out - 0.3).abs() < 1e-6);
    }
}
