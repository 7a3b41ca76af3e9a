use bevy::prelude::*;

mod galaxy_instance;
mod galaxy_parameters;
mod generator;

pub use galaxy_instance::{GenerateGalaxy, GenerationTrigger, GeneratorSettings};
pub use galaxy_parameters::{ColorField, GalaxyParameters, ParameterField};
pub use generator::{generate_galaxy, GalaxyBuffers};

pub struct GalaxyPlugin;

impl Plugin for GalaxyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyParameters>()
            .add_plugins(galaxy_instance::GalaxyInstancePlugin)
            .add_systems(PreStartup, read_generator_settings);
    }
}

// PreStartup, after LogPlugin is built
fn read_generator_settings(mut commands: Commands) {
    let settings = GeneratorSettings::from_env();
    if let Some(seed) = settings.seed {
        info!("Using fixed galaxy seed {seed}");
    }
    commands.insert_resource(settings);
}
