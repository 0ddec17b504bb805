// src/ui/panel.rs
//! Scene control panel
//!
//! The debug surface over the parameter store: the sun angle and distance,
//! the clear color, and the bloom chain settings. Every widget binds straight
//! to a parameter field, so a value set here reads back identically next
//! frame - there is no clamping beyond the declared slider ranges.

use crate::params::Parameters;

/// Whether the model has arrived yet, for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    AwaitingAssets,
    Active,
}

/// Renders the scene control panel.
pub fn scene_panel(ui: &imgui::Ui, params: &mut Parameters, status: SceneStatus) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Scene Controls")
        .size([400.0, 420.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            match status {
                SceneStatus::AwaitingAssets => ui.text_disabled("Loading model..."),
                SceneStatus::Active => ui.text_disabled("Scene active"),
            }
            ui.separator();

            if ui.collapsing_header("Daylight", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                let (angle_min, angle_max) = Parameters::SUN_ANGLE_RANGE;
                ui.slider("Sun Angle", angle_min, angle_max, &mut params.sun_angle);

                let (dist_min, dist_max) = Parameters::SUN_DISTANCE_RANGE;
                ui.slider(
                    "Sun Distance",
                    dist_min,
                    dist_max,
                    &mut params.sun_distance,
                );
            }

            if ui.collapsing_header("Background", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                ui.color_edit3("Clear Color", &mut params.clear_color);
            }

            if ui.collapsing_header("Bloom", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                ui.checkbox("Enabled", &mut params.bloom.enabled);
                ui.slider("Strength", 0.0, 3.0, &mut params.bloom.strength);
                ui.slider("Radius", 0.0, 1.0, &mut params.bloom.radius);
                ui.slider("Threshold", 0.0, 1.0, &mut params.bloom.threshold);
            }
        });
}
