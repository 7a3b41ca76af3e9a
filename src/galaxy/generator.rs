use super::GalaxyParameters;
use bevy::color::ColorToComponents;
use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::f32::consts::TAU;

/// Particles sharing one seeded rng stream.
pub const CHUNK_SIZE: usize = 4096;

/// Flat per-particle buffers produced by one generation.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct GalaxyBuffers {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

impl GalaxyBuffers {
    fn zeroed(count: usize) -> Self {
        Self {
            positions: vec![[0.0; 3]; count],
            colors: vec![[0.0; 3]; count],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `x, y, z` triples, `3 * len()` floats.
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// `r, g, b` triples in linear space, `3 * len()` floats.
    pub fn flat_colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// The random draws one particle consumes.
#[derive(Clone, Copy, Debug)]
pub struct ParticleSample {
    /// Uniform in `[0, 1)`, scaled by the galaxy radius.
    pub radius_fraction: f32,
    /// Signed, power-biased offset per axis.
    pub jitter: Vec3,
}

impl ParticleSample {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, randomness_power: f32) -> Self {
        let radius_fraction = rng.random::<f32>();
        let mut jitter = Vec3::ZERO;
        for axis in 0..3 {
            let magnitude = rng.random::<f32>().powf(randomness_power);
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            jitter[axis] = magnitude * sign;
        }
        Self {
            radius_fraction,
            jitter,
        }
    }
}

/// Inside/outside colours in linear rgb, interpolated by normalised radius.
#[derive(Clone, Copy, Debug)]
pub struct ColorRamp {
    inside: Vec3,
    outside: Vec3,
}

impl ColorRamp {
    pub fn new(inside: Srgba, outside: Srgba) -> Self {
        Self {
            inside: LinearRgba::from(inside).to_vec3(),
            outside: LinearRgba::from(outside).to_vec3(),
        }
    }

    pub fn sample(&self, t: f32) -> Vec3 {
        self.inside.lerp(self.outside, t)
    }
}

/// Angle of the arm particle `index` is assigned to, round robin.
pub fn branch_angle(index: usize, branches: i32) -> f32 {
    let branches = branches.max(1) as usize;
    (index % branches) as f32 / branches as f32 * TAU
}

/// Position and colour of one particle. Pure, so the same sample always
/// lands in the same place.
pub fn place_particle(
    index: usize,
    params: &GalaxyParameters,
    ramp: &ColorRamp,
    sample: &ParticleSample,
) -> (Vec3, Vec3) {
    let radius = sample.radius_fraction * params.radius;
    let angle = branch_angle(index, params.branches) + radius * params.spin;

    let position = vec3(
        angle.cos() * radius + sample.jitter.x,
        sample.jitter.y,
        angle.sin() * radius + sample.jitter.z,
    );

    let t = if params.radius > 0.0 {
        radius / params.radius
    } else {
        0.0
    };

    (position, ramp.sample(t))
}

fn chunk_rng(seed: u64, chunk: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (chunk as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Generates every particle of the galaxy described by `params`.
///
/// Chunks of [`CHUNK_SIZE`] particles are filled in parallel, each from its
/// own rng seeded by `seed` and the chunk index, so the output only depends
/// on `(params, seed)`.
pub fn generate_galaxy(params: &GalaxyParameters, seed: u64) -> GalaxyBuffers {
    let count = params.count.max(0) as usize;
    let mut buffers = GalaxyBuffers::zeroed(count);
    let ramp = ColorRamp::new(params.inside_color, params.outside_color);

    buffers
        .positions
        .par_chunks_mut(CHUNK_SIZE)
        .zip(buffers.colors.par_chunks_mut(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk, (positions, colors))| {
            let mut rng = chunk_rng(seed, chunk);
            let first = chunk * CHUNK_SIZE;

            for (offset, (position, color)) in
                positions.iter_mut().zip(colors.iter_mut()).enumerate()
            {
                let sample = ParticleSample::draw(&mut rng, params.randomness_power);
                let (p, c) = place_particle(first + offset, params, &ramp, &sample);
                *position = p.to_array();
                *color = c.to_array();
            }
        });

    buffers
}
