use crate::prelude::*;
use bevy::color::ColorToPacked;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::collections::HashSet;
use std::ops::RangeInclusive;

pub struct ConfigEguiPlugin;

impl Plugin for ConfigEguiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlPanel>()
            .init_resource::<CommitTracker>()
            .add_systems(Startup, configure_visuals_system)
            .add_systems(Update, (toggle_panel_system, ui_system).chain());
    }
}

/// Visibility of the panel and the text buffers behind its hex fields.
#[derive(Resource)]
pub struct ControlPanel {
    pub visible: bool,
    hex_inputs: [String; 2],
}

impl ControlPanel {
    /// Shows or hides the panel. Edits still pending are committed, since
    /// a hidden panel never sees the interaction end.
    pub fn toggle(&mut self, tracker: &mut CommitTracker) -> Vec<ParameterField> {
        self.visible = !self.visible;
        tracker.drain()
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        let params = GalaxyParameters::default();
        Self {
            visible: false,
            hex_inputs: [params.inside_color.to_hex(), params.outside_color.to_hex()],
        }
    }
}

/// Turns the stream of per-frame widget changes into one commit per edit.
///
/// A field becomes pending when its value changes and is committed on the
/// first frame the user is no longer interacting with it.
#[derive(Resource, Default)]
pub struct CommitTracker {
    pending: HashSet<ParameterField>,
}

impl CommitTracker {
    pub fn observe(&mut self, field: ParameterField, changed: bool, interacting: bool) -> bool {
        if changed {
            self.pending.insert(field);
        }
        !interacting && self.pending.remove(&field)
    }

    pub fn is_pending(&self, field: ParameterField) -> bool {
        self.pending.contains(&field)
    }

    /// Commits every pending field at once, in panel order.
    pub fn drain(&mut self) -> Vec<ParameterField> {
        ParameterField::ALL
            .into_iter()
            .filter(|field| self.pending.remove(field))
            .collect()
    }
}

fn configure_visuals_system(mut contexts: EguiContexts) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    ctx.set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..Default::default()
    });
}

fn toggle_panel_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut panel: ResMut<ControlPanel>,
    mut tracker: ResMut<CommitTracker>,
    mut events: EventWriter<GenerateGalaxy>,
) {
    let typing = contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.wants_keyboard_input());
    if typing || !keys.just_pressed(KeyCode::KeyH) {
        return;
    }
    for field in panel.toggle(&mut tracker) {
        events.write(GenerateGalaxy {
            trigger: GenerationTrigger::Commit(field),
        });
    }
}

fn slider<Num: egui::emath::Numeric>(
    ui: &mut egui::Ui,
    value: &mut Num,
    range: RangeInclusive<Num>,
    field: ParameterField,
    tracker: &mut CommitTracker,
) -> bool {
    let mut slider = egui::Slider::new(value, range).text(field.label());
    if let Some(step) = field.step() {
        slider = slider.step_by(step);
    }
    let response = ui.add(slider);
    let interacting = response.dragged() || ui.ctx().is_using_pointer();
    tracker.observe(field, response.changed(), interacting)
}

fn color_field(
    ui: &mut egui::Ui,
    params: &mut GalaxyParameters,
    hex_input: &mut String,
    field: ColorField,
    tracker: &mut CommitTracker,
) -> bool {
    let name = ParameterField::from(field);
    let mut committed = false;

    ui.horizontal(|ui| {
        let mut rgb = params.color(field).to_u8_array_no_alpha();
        let response = ui.color_edit_button_srgb(&mut rgb);
        if response.changed() {
            *params.color_mut(field) = Srgba::from_u8_array_no_alpha(rgb);
        }
        committed |= tracker.observe(name, response.changed(), ui.ctx().is_using_pointer());

        let response = ui.add(egui::TextEdit::singleline(hex_input).desired_width(80.0));
        if response.lost_focus() {
            match params.set_color_hex(field, hex_input) {
                Ok(changed) => committed |= changed,
                Err(err) => warn!("Ignoring {} {hex_input:?}: {err}", name.label()),
            }
        }
        if !response.has_focus() {
            *hex_input = params.color(field).to_hex();
        }

        ui.label(name.label());
    });

    committed
}

fn ui_system(
    mut contexts: EguiContexts,
    mut params: ResMut<GalaxyParameters>,
    mut panel: ResMut<ControlPanel>,
    mut tracker: ResMut<CommitTracker>,
    mut events: EventWriter<GenerateGalaxy>,
) {
    if !panel.visible {
        return;
    }
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    let min = GalaxyParameters::MIN;
    let max = GalaxyParameters::MAX;
    let params = params.bypass_change_detection();
    let tracker = &mut *tracker;
    let mut committed = Vec::new();

    egui::Window::new("Galaxy")
        .default_width(300.0)
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .default_open(false)
        .resizable(false)
        .show(ctx, |ui| {
            use ParameterField as F;

            let mut check = |done: bool, field: ParameterField| {
                if done {
                    committed.push(field);
                }
            };

            check(
                slider(ui, &mut params.count, min.count..=max.count, F::Count, tracker),
                F::Count,
            );
            check(
                slider(ui, &mut params.size, min.size..=max.size, F::Size, tracker),
                F::Size,
            );
            check(
                slider(ui, &mut params.radius, min.radius..=max.radius, F::Radius, tracker),
                F::Radius,
            );
            check(
                slider(
                    ui,
                    &mut params.branches,
                    min.branches..=max.branches,
                    F::Branches,
                    tracker,
                ),
                F::Branches,
            );
            check(
                slider(ui, &mut params.spin, min.spin..=max.spin, F::Spin, tracker),
                F::Spin,
            );
            check(
                slider(
                    ui,
                    &mut params.randomness,
                    min.randomness..=max.randomness,
                    F::Randomness,
                    tracker,
                ),
                F::Randomness,
            );
            check(
                slider(
                    ui,
                    &mut params.randomness_power,
                    min.randomness_power..=max.randomness_power,
                    F::RandomnessPower,
                    tracker,
                ),
                F::RandomnessPower,
            );

            ui.separator();
            let [inside_hex, outside_hex] = &mut panel.hex_inputs;
            check(
                color_field(ui, params, inside_hex, ColorField::Inside, tracker),
                F::InsideColor,
            );
            check(
                color_field(ui, params, outside_hex, ColorField::Outside, tracker),
                F::OutsideColor,
            );
        });

    for field in committed {
        events.write(GenerateGalaxy {
            trigger: GenerationTrigger::Commit(field),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_commits_once_on_release() {
        let mut tracker = CommitTracker::default();

        // press, drag over a few frames
        assert!(!tracker.observe(ParameterField::Spin, true, true));
        assert!(!tracker.observe(ParameterField::Spin, true, true));
        assert!(!tracker.observe(ParameterField::Spin, false, true));
        assert!(tracker.is_pending(ParameterField::Spin));

        // release
        assert!(tracker.observe(ParameterField::Spin, false, false));
        assert!(!tracker.is_pending(ParameterField::Spin));
        assert!(!tracker.observe(ParameterField::Spin, false, false));
    }

    #[test]
    fn test_untouched_field_never_commits() {
        let mut tracker = CommitTracker::default();
        for _ in 0..10 {
            assert!(!tracker.observe(ParameterField::Count, false, false));
            assert!(!tracker.observe(ParameterField::Count, false, true));
        }
    }

    #[test]
    fn test_keyboard_change_commits_immediately() {
        let mut tracker = CommitTracker::default();
        assert!(tracker.observe(ParameterField::Branches, true, false));
    }

    #[test]
    fn test_fields_tracked_separately() {
        let mut tracker = CommitTracker::default();
        tracker.observe(ParameterField::Radius, true, true);
        assert!(!tracker.observe(ParameterField::Size, false, false));
        assert!(tracker.observe(ParameterField::Radius, false, false));
    }

    #[test]
    fn test_hiding_mid_drag_commits_pending_edit() {
        let mut panel = ControlPanel::default();
        let mut tracker = CommitTracker::default();
        assert!(panel.toggle(&mut tracker).is_empty());
        assert!(panel.visible);

        // hidden while the pointer is still down on two sliders
        tracker.observe(ParameterField::Spin, true, true);
        tracker.observe(ParameterField::Count, true, true);
        let committed = panel.toggle(&mut tracker);
        assert!(!panel.visible);
        assert_eq!(committed, vec![ParameterField::Count, ParameterField::Spin]);
        assert!(!tracker.is_pending(ParameterField::Spin));

        // shown again: nothing left over to commit on the next release
        assert!(panel.toggle(&mut tracker).is_empty());
        assert!(!tracker.observe(ParameterField::Spin, false, false));
    }

    #[test]
    fn test_panel_starts_hidden() {
        let panel = ControlPanel::default();
        assert!(!panel.visible);
        assert_eq!(panel.hex_inputs[0].to_lowercase(), "#ff6030");
    }
}
