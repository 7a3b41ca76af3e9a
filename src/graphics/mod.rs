use bevy::prelude::*;

mod points_material;
mod points_mesh;

pub use points_material::PointsMaterial;
pub use points_mesh::points_mesh;

pub struct GraphicsPlugin;

impl Plugin for GraphicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_plugins(points_material::PointsMaterialPlugin);
    }
}
