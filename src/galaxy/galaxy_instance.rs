use super::{generate_galaxy, GalaxyBuffers, GalaxyParameters, ParameterField};
use crate::graphics::{points_mesh, PointsMaterial};
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;

/// Environment variable holding a fixed generation seed.
pub const SEED_ENV_VAR: &str = "GALAXY_SEED";

pub struct GalaxyInstancePlugin;

impl Plugin for GalaxyInstancePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<GenerateGalaxy>()
            .init_resource::<GeneratorSettings>()
            .init_resource::<CurrentGalaxy>()
            .add_systems(Startup, request_initial_galaxy)
            .add_systems(Update, regenerate_galaxy);
    }
}

/// Why a generation was requested.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GenerationTrigger {
    Startup,
    /// An edit of the named field was committed in the control panel.
    Commit(ParameterField),
}

#[derive(Event, Clone, Copy, Debug)]
pub struct GenerateGalaxy {
    pub trigger: GenerationTrigger,
}

#[derive(Resource, Clone, Default, Debug)]
pub struct GeneratorSettings {
    /// Reuse this seed for every generation. `None` draws a fresh one each time.
    pub seed: Option<u64>,
}

impl GeneratorSettings {
    pub fn from_env() -> Self {
        Self {
            seed: parse_seed(std::env::var(SEED_ENV_VAR).ok().as_deref()),
        }
    }

    fn next_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

fn parse_seed(value: Option<&str>) -> Option<u64> {
    let value = value?.trim();
    match value.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(err) => {
            warn!("Ignoring {SEED_ENV_VAR}={value:?}: {err}");
            None
        }
    }
}

/// Marks the entity drawing the current galaxy.
#[derive(Component)]
pub struct GalaxyPoints;

/// A generated galaxy attached to the scene.
pub struct GalaxyInstance {
    pub buffers: GalaxyBuffers,
    pub seed: u64,
    entity: Entity,
    mesh: Handle<Mesh>,
    material: Handle<PointsMaterial>,
}

impl GalaxyInstance {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Releases the mesh and material and detaches the entity.
    pub fn dispose(
        self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<PointsMaterial>,
    ) {
        meshes.remove(&self.mesh);
        materials.remove(&self.material);
        if let Ok(mut entity) = commands.get_entity(self.entity) {
            entity.despawn();
        }
    }
}

/// One slot holding whatever galaxy is on screen.
#[derive(Resource, Default)]
pub struct CurrentGalaxy(Option<GalaxyInstance>);

impl CurrentGalaxy {
    pub fn get(&self) -> Option<&GalaxyInstance> {
        self.0.as_ref()
    }

    /// Disposes the current galaxy, if any. Safe to call when empty.
    pub fn dispose(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<PointsMaterial>,
    ) {
        if let Some(instance) = self.0.take() {
            debug!(
                "Disposing galaxy of {} particles ({:?})",
                instance.buffers.len(),
                instance.entity
            );
            instance.dispose(commands, meshes, materials);
        }
    }

    /// Generates a galaxy from `params` and swaps it in for the current one.
    ///
    /// The new galaxy is fully built before the old one is disposed. An
    /// empty galaxy leaves nothing attached.
    pub fn replace(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<PointsMaterial>,
        params: &GalaxyParameters,
        seed: u64,
    ) {
        let buffers = generate_galaxy(params, seed);

        self.dispose(commands, meshes, materials);

        if buffers.is_empty() {
            return;
        }

        let mesh = meshes.add(points_mesh(&buffers));
        let material = materials.add(PointsMaterial::galaxy(params.size));
        let entity = commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::IDENTITY,
                GalaxyPoints,
                NoFrustumCulling,
            ))
            .id();

        self.0 = Some(GalaxyInstance {
            buffers,
            seed,
            entity,
            mesh,
            material,
        });
    }
}

fn request_initial_galaxy(mut events: EventWriter<GenerateGalaxy>) {
    events.write(GenerateGalaxy {
        trigger: GenerationTrigger::Startup,
    });
}

/// Regenerates once per frame at most, however many commits arrived.
fn regenerate_galaxy(
    mut commands: Commands,
    mut events: EventReader<GenerateGalaxy>,
    params: Res<GalaxyParameters>,
    settings: Res<GeneratorSettings>,
    mut current: ResMut<CurrentGalaxy>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<PointsMaterial>>,
) {
    let Some(last) = events.read().last().copied() else {
        return;
    };

    let params = params.clamped();
    let seed = settings.next_seed();
    info!(
        "Generating galaxy ({:?}): {} particles, {} branches, seed {}",
        last.trigger, params.count, params.branches, seed
    );

    current.replace(
        &mut commands,
        &mut meshes,
        &mut materials,
        &params,
        seed,
    );
}
