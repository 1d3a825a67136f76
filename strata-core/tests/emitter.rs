//! Emitter preview behaviour over multi-second runs.

use std::time::Duration;

use strata_core::config::PreviewSettings;
use strata_core::emitter::{EmitterPreview, EmitterSimulator, RecordingCanvas};
use strata_types::{
    CaView, EmitterCell, EmitterContent, Layer, LayerKind, LayerSubtree, Point, Size, ViewKind,
};

const FRAME: f64 = 1.0 / 60.0;

fn content(birth_rate: f64, lifetime: f64) -> EmitterContent {
    EmitterContent {
        cells: vec![EmitterCell {
            birth_rate,
            lifetime,
            ..EmitterCell::default()
        }],
        ..EmitterContent::default()
    }
}

#[test]
fn population_stabilizes_at_rate_times_lifetime() {
    let mut sim = EmitterSimulator::new(content(10.0, 1.0), 0x5eed, 0.1);
    let mut counts = Vec::new();
    for _ in 0..120 {
        sim.step(FRAME);
        counts.push(sim.live_count());
    }

    // Once the first lifetime has elapsed the population hovers around 10.
    for count in &counts[66..] {
        assert!((9..=11).contains(count), "count drifted to {count}");
    }
    assert!(counts.iter().all(|c| *c <= 11));
}

#[test]
fn multiple_cells_spawn_independently() {
    let mut two = content(10.0, 1.0);
    two.cells.push(EmitterCell {
        id: "second".into(),
        birth_rate: 20.0,
        lifetime: 1.0,
        ..EmitterCell::default()
    });
    let mut sim = EmitterSimulator::new(two, 1, 0.1);
    for _ in 0..30 {
        sim.step(FRAME);
    }
    let first = sim.particles().iter().filter(|p| p.cell == 0).count();
    let second = sim.particles().iter().filter(|p| p.cell == 1).count();
    assert!((4..=6).contains(&first), "first cell: {first}");
    assert!((9..=11).contains(&second), "second cell: {second}");
}

#[test]
fn backgrounded_frame_does_not_burst() {
    let mut sim = EmitterSimulator::new(content(100.0, 60.0), 2, 0.1);
    sim.step(5.0);
    assert_eq!(sim.live_count(), 10);
}

#[test]
fn reduced_motion_drains_the_population() {
    let mut view = CaView::new(ViewKind::Floating);
    let layer = Layer::new(LayerKind::Emitter(content(10.0, 1.0)))
        .with_frame(Point::new(195.0, 422.0), Size::new(100.0, 100.0));
    view.tree.append_child(None, LayerSubtree::leaf(layer));

    let settings = PreviewSettings {
        max_frame_delta: Duration::from_millis(100),
        reduced_motion: false,
    };
    let mut preview = EmitterPreview::for_view(&view, Size::new(390.0, 844.0), false, settings);
    for _ in 0..30 {
        preview.frame(Duration::from_secs_f64(FRAME));
    }
    let alive = preview.live_particles();
    assert!(alive > 0);

    preview.set_reduced_motion(true);
    preview.frame(Duration::from_secs_f64(FRAME));
    assert!(preview.live_particles() <= alive);
    for _ in 0..70 {
        preview.frame(Duration::from_secs_f64(FRAME));
    }
    assert_eq!(preview.live_particles(), 0);

    let mut canvas = RecordingCanvas::default();
    preview.draw(&mut canvas);
    assert!(canvas.draws.is_empty());
}
