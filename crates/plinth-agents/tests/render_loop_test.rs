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

mod common;

use approx::assert_relative_eq;
use common::{manual_loop, stub_model, world, CountingScheduler, RecordingRenderer};
use plinth_agents::{DebugEdit, RenderLoop, ResizeHandler};
use plinth_core::renderer::RenderError;
use plinth_core::scene::NodeKind;
use plinth_io::{AssetEvent, RequestId};
use std::f32::consts::PI;
use std::time::Duration;

fn model_loaded() -> AssetEvent {
    AssetEvent::ModelLoaded {
        request: RequestId::next(),
        root: stub_model(),
    }
}

#[test]
fn ticks_before_load_do_not_fail() {
    let (mut world, _tx) = world();
    let mut render_loop = manual_loop();
    let mut renderer = RecordingRenderer::default();
    let mut scheduler = CountingScheduler::default();

    for i in 0..100 {
        render_loop.clock().set(i as f64 / 60.0);
        render_loop
            .tick(&mut world, &mut renderer, &mut scheduler)
            .unwrap();
    }
    assert_eq!(renderer.draws, 100);
    assert_eq!(scheduler.requests, 100);
    assert!(world.model_node().is_none());
}

#[test]
fn absent_model_then_load_at_four_seconds() {
    let (mut world, tx) = world();
    let mut render_loop = manual_loop();
    let mut renderer = RecordingRenderer::default();
    let mut scheduler = CountingScheduler::default();

    for _ in 0..10 {
        render_loop
            .tick(&mut world, &mut renderer, &mut scheduler)
            .unwrap();
    }
    assert!(!world.model().is_present());
    assert_eq!(world.scene().mesh_count(), 0);
    assert!(renderer.model_seen.iter().all(|seen| !seen));

    tx.send(model_loaded()).unwrap();
    render_loop.clock().set(4.0);
    render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap();

    let model = world.model_node().expect("model installed during the tick");
    assert_relative_eq!(model.transform.yaw(), PI, epsilon = 1e-5);
    // The completion was applied before the draw of the same tick.
    assert_eq!(renderer.model_seen.last(), Some(&true));
    assert_eq!(renderer.draws, 11);
}

#[test]
fn yaw_is_independent_of_frame_rate() {
    let mut yaws = Vec::new();
    for fps in [7.0, 30.0, 144.0] {
        let (mut world, tx) = world();
        tx.send(model_loaded()).unwrap();
        let mut render_loop = manual_loop();
        let mut renderer = RecordingRenderer::default();
        let mut scheduler = CountingScheduler::default();

        let frames = (3.0 * fps) as usize;
        for i in 0..=frames {
            render_loop.clock().set((i as f64 / fps).min(3.0));
            render_loop
                .tick(&mut world, &mut renderer, &mut scheduler)
                .unwrap();
        }
        render_loop.clock().set(3.0);
        render_loop
            .tick(&mut world, &mut renderer, &mut scheduler)
            .unwrap();
        yaws.push(world.model_node().unwrap().transform.yaw());
    }
    for yaw in yaws {
        assert_relative_eq!(yaw, 3.0 * PI / 4.0, epsilon = 1e-5);
    }
}

#[test]
fn yaw_matches_wall_time_modulo_full_turns() {
    let (mut world, tx) = world();
    tx.send(model_loaded()).unwrap();
    let mut render_loop = manual_loop();
    let mut renderer = RecordingRenderer::default();
    let mut scheduler = CountingScheduler::default();

    for t in [0.0_f64, 0.5, 1.0, 7.9, 13.25, 1001.0] {
        render_loop.clock().set(t);
        render_loop
            .tick(&mut world, &mut renderer, &mut scheduler)
            .unwrap();
        let expected = (t * std::f64::consts::PI / 4.0).rem_euclid(std::f64::consts::TAU) as f32;
        let yaw = world.model_node().unwrap().transform.yaw();
        assert_relative_eq!(yaw, expected, epsilon = 1e-4);
    }
}

#[test]
fn animation_overrides_the_yaw_slider() {
    let (mut world, tx) = world();
    tx.send(model_loaded()).unwrap();
    let mut render_loop = manual_loop();
    let mut renderer = RecordingRenderer::default();
    let mut scheduler = CountingScheduler::default();
    render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap();

    world.apply_edit(DebugEdit::ModelYaw(1.0));
    assert_eq!(world.model_node().unwrap().transform.yaw(), 1.0);

    render_loop.clock().set(2.0);
    render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap();
    assert_relative_eq!(world.model_node().unwrap().transform.yaw(), PI / 2.0);
}

#[test]
fn render_failure_stops_the_loop() {
    let (mut world, _tx) = world();
    let mut render_loop = manual_loop();
    let mut renderer = RecordingRenderer::failing_from(3);
    let mut scheduler = CountingScheduler::default();

    for _ in 0..2 {
        render_loop
            .tick(&mut world, &mut renderer, &mut scheduler)
            .unwrap();
    }
    let err = render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap_err();
    assert!(matches!(err, RenderError::DeviceLost));
    assert!(!render_loop.is_running());
    assert_eq!(scheduler.requests, 2);

    // Nothing runs afterwards.
    render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap();
    assert_eq!(renderer.draws, 3);
    assert_eq!(scheduler.requests, 2);
}

#[test]
fn material_flags_clear_after_a_successful_frame() {
    let (mut world, tx) = world();
    tx.send(model_loaded()).unwrap();
    let mut render_loop = manual_loop();
    let mut renderer = RecordingRenderer::default();
    let mut scheduler = CountingScheduler::default();
    render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap();

    let mut pending = 0;
    world.scene().traverse(|node, _| {
        if let NodeKind::Mesh(mesh) = &node.kind {
            if mesh.material.as_standard().is_some_and(|m| m.needs_update) {
                pending += 1;
            }
        }
    });
    assert_eq!(pending, 0);
}

#[test]
fn resize_sets_exact_aspect_and_capped_ratio() {
    let (mut world, _tx) = world();
    let mut renderer = RecordingRenderer::default();
    let handler = ResizeHandler::default();

    for (w, h, dpr, ratio) in [
        (1280, 720, 1.0, 1.0),
        (1000, 333, 1.5, 1.5),
        (3840, 2160, 3.0, 2.0),
        (1, 4096, 2.0, 2.0),
    ] {
        assert!(handler.on_resize(&mut world, &mut renderer, w, h, dpr));
        assert_eq!(world.camera().aspect_ratio, w as f32 / h as f32);
        assert_eq!(renderer.size, Some((w, h)));
        assert_eq!(renderer.pixel_ratio, Some(ratio));
    }
}

#[test]
fn zero_size_resize_is_ignored() {
    let (mut world, _tx) = world();
    let mut renderer = RecordingRenderer::default();
    let handler = ResizeHandler::default();
    handler.on_resize(&mut world, &mut renderer, 800, 600, 1.0);

    assert!(!handler.on_resize(&mut world, &mut renderer, 0, 600, 1.0));
    assert_eq!(renderer.size, Some((800, 600)));
    assert_eq!(world.camera().aspect_ratio, 800.0 / 600.0);
}

#[test]
fn wall_clock_starts_at_the_first_tick() {
    let (mut world, tx) = world();
    let mut render_loop = RenderLoop::new(Duration::from_secs(3600));
    let mut renderer = RecordingRenderer::default();
    let mut scheduler = CountingScheduler::default();

    // Window and device creation happen between construction and the first frame.
    std::thread::sleep(Duration::from_millis(300));
    assert!(!render_loop.clock().is_started());

    tx.send(model_loaded()).unwrap();
    render_loop
        .tick(&mut world, &mut renderer, &mut scheduler)
        .unwrap();

    let model = world.model_node().expect("model installed during the tick");
    assert!(model.transform.yaw() < 0.01, "yaw was {}", model.transform.yaw());
}
