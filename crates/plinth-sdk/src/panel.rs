// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The debug panel.
//!
//! The panel draws a copy of [`DebugParameters`] and reports every value the
//! user changed as a [`DebugEdit`]. It never touches the world directly.

use egui::{ComboBox, Context, Slider, SliderClamping};
use plinth_agents::{DebugEdit, DebugParameters, ParamRange};
use plinth_core::renderer::ToneMapping;
use plinth_telemetry::FrameSnapshot;

/// Title of the panel window.
pub const PANEL_TITLE: &str = "Debug";

/// One slider of the panel.
struct SliderRow {
    label: &'static str,
    range: ParamRange,
    field: fn(&mut DebugParameters) -> &mut f32,
    edit: fn(f32) -> DebugEdit,
}

/// The sliders in panel order. Rotation only appears once there is a model
/// to rotate.
fn slider_rows(model_loaded: bool) -> Vec<SliderRow> {
    let mut rows = vec![SliderRow {
        label: "Env map intensity",
        range: DebugParameters::ENV_MAP_INTENSITY,
        field: |p| &mut p.env_map_intensity,
        edit: DebugEdit::EnvMapIntensity,
    }];
    if model_loaded {
        rows.push(SliderRow {
            label: "Rotation",
            range: DebugParameters::MODEL_YAW,
            field: |p| &mut p.model_yaw,
            edit: DebugEdit::ModelYaw,
        });
    }
    rows.extend([
        SliderRow {
            label: "Light intensity",
            range: DebugParameters::LIGHT_INTENSITY,
            field: |p| &mut p.light_intensity,
            edit: DebugEdit::LightIntensity,
        },
        SliderRow {
            label: "Light X",
            range: DebugParameters::LIGHT_POSITION,
            field: |p| &mut p.light_x,
            edit: DebugEdit::LightX,
        },
        SliderRow {
            label: "Light Y",
            range: DebugParameters::LIGHT_POSITION,
            field: |p| &mut p.light_y,
            edit: DebugEdit::LightY,
        },
        SliderRow {
            label: "Light Z",
            range: DebugParameters::LIGHT_POSITION,
            field: |p| &mut p.light_z,
            edit: DebugEdit::LightZ,
        },
    ]);
    rows
}

/// Draws the panel if it is visible and returns the edits the user made
/// this frame.
pub fn show_debug_panel(
    ctx: &Context,
    params: &DebugParameters,
    model_loaded: bool,
    stats: FrameSnapshot,
) -> Vec<DebugEdit> {
    if !params.visible {
        return Vec::new();
    }

    let mut values = *params;
    let mut edits = Vec::new();
    egui::Window::new(PANEL_TITLE)
        .resizable(false)
        .default_open(true)
        .show(ctx, |ui| {
            ui.label(format!("{:.1} fps ({:.2} ms)", stats.fps, stats.frame_time_ms));
            ui.separator();

            for row in slider_rows(model_loaded) {
                // Clamping only on edits keeps drawing from snapping the
                // current value to the step grid.
                let slider = Slider::new((row.field)(&mut values), row.range.min..=row.range.max)
                    .step_by(row.range.step as f64)
                    .clamping(SliderClamping::Edits)
                    .text(row.label);
                if ui.add(slider).changed() {
                    edits.push((row.edit)(*(row.field)(&mut values)));
                }
            }

            ComboBox::from_label("Tone mapping")
                .selected_text(values.tone_mapping.label())
                .show_ui(ui, |ui| {
                    for mode in ToneMapping::ALL {
                        if ui
                            .selectable_value(&mut values.tone_mapping, mode, mode.label())
                            .changed()
                        {
                            edits.push(DebugEdit::ToneMapping(mode));
                        }
                    }
                });
        });
    edits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_panel(params: &DebugParameters, model_loaded: bool) -> Option<Vec<DebugEdit>> {
        let ctx = Context::default();
        let mut edits = None;
        // Two passes: egui sizes windows on the first one.
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                edits = Some(show_debug_panel(ctx, params, model_loaded, FrameSnapshot::default()));
            });
        }
        edits
    }

    fn labels(model_loaded: bool) -> Vec<&'static str> {
        slider_rows(model_loaded).iter().map(|row| row.label).collect()
    }

    #[test]
    fn rotation_slider_waits_for_the_model() {
        assert_eq!(
            labels(false),
            ["Env map intensity", "Light intensity", "Light X", "Light Y", "Light Z"]
        );
        assert_eq!(
            labels(true),
            ["Env map intensity", "Rotation", "Light intensity", "Light X", "Light Y", "Light Z"]
        );
    }

    #[test]
    fn rows_write_the_matching_field() {
        let mut params = DebugParameters::default();
        for (i, row) in slider_rows(true).iter().enumerate() {
            *(row.field)(&mut params) = i as f32;
        }
        assert_eq!(params.env_map_intensity, 0.0);
        assert_eq!(params.model_yaw, 1.0);
        assert_eq!(params.light_intensity, 2.0);
        assert_eq!((params.light_x, params.light_y, params.light_z), (3.0, 4.0, 5.0));
        assert_eq!((slider_rows(true)[4].edit)(7.0), DebugEdit::LightY(7.0));
    }

    #[test]
    fn drawing_off_grid_values_is_not_an_edit() {
        let params = DebugParameters {
            visible: true,
            model_yaw: std::f32::consts::FRAC_PI_2,
            light_intensity: 3.000_000_2,
            light_x: 26.740_004,
            light_y: -24.203_999,
            ..DebugParameters::default()
        };
        assert_eq!(run_panel(&params, true), Some(Vec::new()));
        assert_eq!(run_panel(&params, false), Some(Vec::new()));
    }

    #[test]
    fn hidden_panel_draws_nothing() {
        let params = DebugParameters::default();
        assert!(!params.visible);
        assert_eq!(run_panel(&params, true), Some(Vec::new()));
    }
}
