//! Live preview host: one simulator per emitter layer of a view.

use std::collections::HashMap;
use std::time::Duration;

use kurbo::Affine;

use strata_types::reduce::effective_layer;
use strata_types::{CaView, LayerId, LayerKind, Size};

use super::canvas::ParticleCanvas;
use super::simulator::EmitterSimulator;
use crate::config::PreviewSettings;

pub struct EmitterPreview {
    settings: PreviewSettings,
    simulators: HashMap<LayerId, EmitterSimulator>,
    /// Layer-local to top-left canvas coordinates, per emitter.
    placements: HashMap<LayerId, Affine>,
    paused: bool,
}

impl EmitterPreview {
    pub fn new(settings: PreviewSettings) -> Self {
        Self {
            settings,
            simulators: HashMap::new(),
            placements: HashMap::new(),
            paused: false,
        }
    }

    /// Build simulators for every emitter in `view`.
    pub fn for_view(view: &CaView, canvas: Size, geometry_flipped: bool, settings: PreviewSettings) -> Self {
        let mut preview = Self::new(settings);
        preview.sync(view, canvas, geometry_flipped);
        preview
    }

    /// Reconcile with the current view: new emitters get a simulator,
    /// removed ones are dropped, edited ones keep their particles.
    pub fn sync(&mut self, view: &CaView, canvas: Size, geometry_flipped: bool) {
        let max_dt = self.settings.max_frame_delta.as_secs_f64();
        let mut seen = Vec::new();
        for layer in view.tree.iter() {
            let LayerKind::Emitter(_) = &layer.kind else {
                continue;
            };
            let Some(effective) = effective_layer(view, &layer.id) else {
                continue;
            };
            let LayerKind::Emitter(content) = effective.kind else {
                continue;
            };
            seen.push(layer.id.clone());

            match self.simulators.get_mut(&layer.id) {
                Some(sim) => {
                    if sim.content() != &content {
                        sim.set_content(content);
                    }
                }
                None => {
                    log::debug!(target: "emitter", "starting emitter {}", layer.id);
                    let mut sim = EmitterSimulator::new(content, seed_for(&layer.id), max_dt);
                    sim.set_reduced_motion(self.settings.reduced_motion);
                    self.simulators.insert(layer.id.clone(), sim);
                }
            }
            self.placements.insert(
                layer.id.clone(),
                layer_to_canvas(view, &layer.id, canvas, geometry_flipped),
            );
        }
        self.simulators.retain(|id, _| seen.contains(id));
        self.placements.retain(|id, _| seen.contains(id));
    }

    /// Pause while the preview is off screen; resume when it returns.
    pub fn set_visible(&mut self, visible: bool) {
        self.paused = !visible;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.settings.reduced_motion = reduced;
        for sim in self.simulators.values_mut() {
            sim.set_reduced_motion(reduced);
        }
    }

    pub fn frame(&mut self, dt: Duration) {
        if self.paused {
            return;
        }
        let dt = dt.as_secs_f64();
        for sim in self.simulators.values_mut() {
            sim.step(dt);
        }
    }

    pub fn draw(&self, canvas: &mut dyn ParticleCanvas) {
        for (id, sim) in &self.simulators {
            let placement = self.placements.get(id).copied().unwrap_or(Affine::IDENTITY);
            sim.draw(canvas, placement);
        }
    }

    pub fn simulator(&self, id: &LayerId) -> Option<&EmitterSimulator> {
        self.simulators.get(id)
    }

    pub fn emitter_count(&self) -> usize {
        self.simulators.len()
    }

    pub fn live_particles(&self) -> usize {
        self.simulators.values().map(EmitterSimulator::live_count).sum()
    }
}

/// Stable per-layer seed (FNV-1a over the id).
fn seed_for(id: &LayerId) -> u64 {
    id.as_str()
        .bytes()
        .fold(0xcbf29ce484222325u64, |hash, b| (hash ^ b as u64).wrapping_mul(0x100000001b3))
}

/// Map an emitter's local space to top-left canvas coordinates. Unflipped
/// projects measure y from the bottom edge, so the axis is mirrored.
fn layer_to_canvas(view: &CaView, id: &LayerId, canvas: Size, geometry_flipped: bool) -> Affine {
    let mut origin = (0.0, 0.0);
    let mut cursor = Some(id.clone());
    while let Some(current) = cursor {
        if let Some(layer) = effective_layer(view, &current) {
            origin.0 += layer.position.x - layer.size.width / 2.0;
            origin.1 += layer.position.y - layer.size.height / 2.0;
        }
        cursor = view.tree.parent(&current).cloned();
    }
    if geometry_flipped {
        Affine::translate(origin)
    } else {
        Affine::new([1.0, 0.0, 0.0, -1.0, origin.0, canvas.height - origin.1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use strata_types::{EmitterCell, EmitterContent, Layer, LayerSubtree, ViewKind};

    use crate::emitter::canvas::RecordingCanvas;

    fn settings() -> PreviewSettings {
        PreviewSettings {
            max_frame_delta: Duration::from_millis(100),
            reduced_motion: false,
        }
    }

    fn emitter_view(velocity: f64) -> CaView {
        let content = EmitterContent {
            emitter_position: strata_types::Point::new(5.0, 5.0),
            cells: vec![EmitterCell {
                velocity,
                birth_rate: 10.0,
                lifetime: 5.0,
                ..EmitterCell::default()
            }],
            ..EmitterContent::default()
        };
        let mut view = CaView::new(ViewKind::Floating);
        let layer = Layer::new(LayerKind::Emitter(content))
            .with_id("e")
            .with_frame(strata_types::Point::new(100.0, 100.0), Size::new(20.0, 20.0));
        view.tree.append_child(None, LayerSubtree::leaf(layer));
        view
    }

    #[test]
    fn paused_preview_does_not_step() {
        let view = emitter_view(0.0);
        let mut preview = EmitterPreview::for_view(&view, Size::new(390.0, 844.0), true, settings());
        preview.set_visible(false);
        preview.frame(Duration::from_millis(100));
        assert_eq!(preview.live_particles(), 0);
        preview.set_visible(true);
        preview.frame(Duration::from_millis(100));
        assert_eq!(preview.live_particles(), 1);
    }

    #[test]
    fn sync_drops_removed_emitters() {
        let mut view = emitter_view(0.0);
        let mut preview = EmitterPreview::for_view(&view, Size::new(390.0, 844.0), true, settings());
        assert_eq!(preview.emitter_count(), 1);
        view.tree.delete(&"e".into());
        preview.sync(&view, Size::new(390.0, 844.0), true);
        assert_eq!(preview.emitter_count(), 0);
    }

    #[test]
    fn unflipped_projects_draw_from_the_bottom_edge() {
        let view = emitter_view(0.0);
        let canvas_size = Size::new(390.0, 844.0);

        let mut flipped = EmitterPreview::for_view(&view, canvas_size, true, settings());
        flipped.frame(Duration::from_millis(100));
        let mut canvas = RecordingCanvas::default();
        flipped.draw(&mut canvas);
        let at = canvas.draws[0].transform * Point::ORIGIN;
        assert_eq!((at.x, at.y), (95.0, 95.0));

        let mut unflipped = EmitterPreview::for_view(&view, canvas_size, false, settings());
        unflipped.frame(Duration::from_millis(100));
        let mut canvas = RecordingCanvas::default();
        unflipped.draw(&mut canvas);
        let at = canvas.draws[0].transform * Point::ORIGIN;
        assert_eq!((at.x, at.y), (95.0, 844.0 - 95.0));
    }
}
