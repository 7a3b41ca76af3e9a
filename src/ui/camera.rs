use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, camera_control_system);
    }
}

const START_POSITION: Vec3 = Vec3::new(3.0, 3.0, 3.0);
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;

const ROTATE_SPEED: f32 = 0.005;
const PAN_SPEED: f32 = 0.0015;

fn spawn_camera(mut commands: Commands) {
    let orbit = OrbitCamera::looking_from(START_POSITION, Vec3::ZERO);
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        orbit.transform(),
        orbit,
    ));
}

/// Orbit controls with damping.
///
/// Input accumulates into pending deltas; every frame a `damping` fraction of
/// each delta is applied and the rest carried over, so motion eases out
/// after the mouse stops.
#[derive(Component, Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub damping: f32,
    yaw_delta: f32,
    pitch_delta: f32,
    zoom_delta: f32,
    pan_delta: Vec3,
}

impl OrbitCamera {
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(MIN_DISTANCE);
        Self {
            target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            damping: 0.05,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            zoom_delta: 0.0,
            pan_delta: Vec3::ZERO,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + vec3(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }

    pub fn rotate(&mut self, drag: Vec2) {
        self.yaw_delta -= drag.x * ROTATE_SPEED;
        self.pitch_delta += drag.y * ROTATE_SPEED;
    }

    /// Positive values move towards the target.
    pub fn zoom(&mut self, amount: f32) {
        self.zoom_delta -= amount;
    }

    pub fn pan(&mut self, offset: Vec3) {
        self.pan_delta += offset;
    }

    pub fn is_moving(&self) -> bool {
        self.yaw_delta.abs() > 1e-6
            || self.pitch_delta.abs() > 1e-6
            || self.zoom_delta.abs() > 1e-6
            || self.pan_delta.length_squared() > 1e-12
    }

    pub fn step(&mut self) {
        let f = self.damping.clamp(0.0, 1.0);
        let keep = 1.0 - f;

        self.yaw += self.yaw_delta * f;
        self.pitch = (self.pitch + self.pitch_delta * f).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (self.zoom_delta * f).exp()).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.target += self.pan_delta * f;

        self.yaw_delta *= keep;
        self.pitch_delta *= keep;
        self.zoom_delta *= keep;
        self.pan_delta *= keep;
    }
}

pub fn camera_control_system(
    mut query: Query<(&mut Transform, &mut OrbitCamera)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
) {
    let Ok((mut transform, mut orbit)) = query.single_mut() else {
        return;
    };

    let egui_has_pointer = contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area());

    let drag: Vec2 = motion_evr.read().map(|ev| ev.delta).sum();
    let scroll: f32 = scroll_evr
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y * 0.1,
            MouseScrollUnit::Pixel => ev.y * 0.002,
        })
        .sum();

    if !egui_has_pointer {
        if mouse_buttons.pressed(MouseButton::Left) {
            orbit.rotate(drag);
        }
        if mouse_buttons.pressed(MouseButton::Right) {
            let scale = orbit.distance * PAN_SPEED;
            let offset = (transform.left() * drag.x + transform.up() * drag.y) * scale;
            orbit.pan(offset);
        }
        if scroll != 0.0 {
            orbit.zoom(scroll);
        }
    }

    orbit.step();
    *transform = orbit.transform();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_initial_position() {
        let orbit = OrbitCamera::looking_from(START_POSITION, Vec3::ZERO);
        assert!((orbit.eye() - START_POSITION).length() < 1e-4);
        assert!(!orbit.is_moving());
    }

    #[test]
    fn test_damping_eases_out() {
        let mut orbit = OrbitCamera::looking_from(START_POSITION, Vec3::ZERO);
        let start_yaw = orbit.yaw;
        orbit.rotate(vec2(-100.0, 0.0));

        orbit.step();
        let first = orbit.yaw - start_yaw;
        orbit.step();
        let second = orbit.yaw - start_yaw - first;
        assert!(first > 0.0);
        assert!(second > 0.0 && second < first);

        for _ in 0..2000 {
            orbit.step();
        }
        assert!(!orbit.is_moving());
        // the whole drag is applied in the end
        assert!((orbit.yaw - start_yaw - 100.0 * ROTATE_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut orbit = OrbitCamera::looking_from(START_POSITION, Vec3::ZERO);
        orbit.rotate(vec2(0.0, 1.0e5));
        for _ in 0..500 {
            orbit.step();
        }
        assert!(orbit.pitch <= MAX_PITCH);
        assert!(orbit.eye().is_finite());
    }

    #[test]
    fn test_zoom_clamped() {
        let mut orbit = OrbitCamera::looking_from(START_POSITION, Vec3::ZERO);
        orbit.zoom(1.0e3);
        for _ in 0..500 {
            orbit.step();
        }
        assert_eq!(orbit.distance, MIN_DISTANCE);

        orbit.zoom(-1.0e3);
        for _ in 0..500 {
            orbit.step();
        }
        assert_eq!(orbit.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut orbit = OrbitCamera::looking_from(START_POSITION, Vec3::ZERO);
        orbit.pan(Vec3::X);
        for _ in 0..2000 {
            orbit.step();
        }
        assert!((orbit.target - Vec3::X).length() < 1e-3);
    }
}
