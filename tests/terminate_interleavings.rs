//! Force-terminate at arbitrary points of the tick loop
//!
//! Aborting a worker mid-tick must never leave the scene half updated: every
//! render command is applied whole by the render context.

use motionbox::config::{Config, HumanDuration};
use motionbox::controller::Controller;
use motionbox::render::{ElementId, RenderContext, Scene, SceneSnapshot};
use motionbox::worker::{Termination, triangle_radius};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::sleep;

const ITERATIONS: usize = 200;
const SEED: u64 = 0x5eed_f00d;

fn assert_scene_consistent(config: &Config, snapshot: &SceneSnapshot) {
    let bounds = snapshot.triangle.bounds;
    let polygon = snapshot
        .triangle
        .polygon
        .as_ref()
        .expect("polygon is drawn before any worker starts");
    let radius = triangle_radius(bounds);
    let center = bounds.center();

    assert_eq!(polygon.len(), config.triangle.sides);
    for vertex in polygon {
        assert!(vertex.is_finite());
        assert!((vertex.distance_to(center) - radius).abs() < 1e-6);
    }

    let label = snapshot.display.elements[&ElementId::DISPLAY_LABEL.to_string()];
    let speed = config.display.step_speed;
    let canvas = snapshot.display.bounds;

    assert!(label.origin.is_finite());
    assert_eq!(label.width, config.display.label.width);
    assert_eq!(label.height, config.display.label.height);
    assert!(label.origin.x >= -speed && label.origin.x + label.width <= canvas.width + speed);
    assert!(label.origin.y >= -speed && label.origin.y + label.height <= canvas.height + speed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_force_terminate_interleavings() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut aborted = 0;

    for _ in 0..ITERATIONS {
        let mut config = Config::default();
        config.display.step_interval = HumanDuration::from_millis(rng.gen_range(0..2));
        config.triangle.step_interval = HumanDuration::from_millis(rng.gen_range(0..2));
        config.display.step_speed = rng.gen_range(0.1..5.0);
        config.triangle.step_speed = rng.gen_range(0.1..5.0);
        // A zero deadline forces the abort path whenever a tick is in flight
        config.shutdown.force_deadline = HumanDuration::from_millis(rng.gen_range(0..2));
        config.validate().unwrap();

        let (render, join) = RenderContext::spawn(Scene::from_config(&config));
        let mut controller = Controller::new(&config, &render).await.unwrap();

        controller.start_display_worker().unwrap();
        controller.start_triangle_worker().unwrap();
        sleep(Duration::from_micros(rng.gen_range(0..2000))).await;

        let report = controller.shutdown_all().await;
        aborted += [report.display, report.triangle]
            .iter()
            .filter(|t| **t == Termination::Aborted)
            .count();

        // An aborted unit is gone as soon as the runtime drops its future
        let settle = tokio::time::timeout(Duration::from_secs(1), async {
            while controller.display().is_active() || controller.triangle().is_active() {
                sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
        assert!(settle.is_ok(), "execution unit outlived force_terminate");

        let snapshot = render.snapshot().await.unwrap();
        assert_scene_consistent(&config, &snapshot);

        // Nothing keeps writing after shutdown
        sleep(Duration::from_millis(2)).await;
        let later = render.snapshot().await.unwrap();
        assert_eq!(later.revision, snapshot.revision);

        render.close().await;
        let scene = join.await.unwrap();
        assert_eq!(scene.snapshot(), later);
    }

    // Informational only; the split depends on scheduling
    println!("aborted units: {aborted} of {}", ITERATIONS * 2);
}
