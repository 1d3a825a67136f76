//! Particle stepping for one emitter layer.

use kurbo::{Affine, Point, Vec2};

use strata_types::{EmitterCell, EmitterContent, EmitterShape};

use super::canvas::ParticleCanvas;

/// A live particle in the emitter layer's local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub cell: usize,
    pub position: Point,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub scale: f64,
    pub scale_speed: f64,
    pub alpha: f64,
    pub alpha_speed: f64,
    /// Radians.
    pub angle: f64,
    pub spin: f64,
    pub age: f64,
    pub lifetime: f64,
}

impl Particle {
    /// Placement within the layer: translate, then rotate, then scale.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2()) * Affine::rotate(self.angle) * Affine::scale(self.scale)
    }
}

pub struct EmitterSimulator {
    content: EmitterContent,
    particles: Vec<Particle>,
    /// Fractional spawn remainder per cell.
    carry: Vec<f64>,
    rng: u64,
    max_dt: f64,
    reduced_motion: bool,
}

impl EmitterSimulator {
    /// `max_dt` bounds a single step; NaN or negative values freeze the
    /// simulation.
    pub fn new(content: EmitterContent, seed: u64, max_dt: f64) -> Self {
        let carry = vec![0.0; content.cells.len()];
        let max_dt = if max_dt >= 0.0 { max_dt } else { 0.0 };
        Self {
            content,
            particles: Vec::new(),
            carry,
            rng: seed,
            max_dt,
            reduced_motion: false,
        }
    }

    /// Replace the emitter parameters, keeping live particles whose cell
    /// still exists.
    pub fn set_content(&mut self, content: EmitterContent) {
        let cells = content.cells.len();
        self.particles.retain(|p| p.cell < cells);
        self.carry.resize(cells, 0.0);
        self.content = content;
    }

    pub fn content(&self) -> &EmitterContent {
        &self.content
    }

    /// Stop spawning. Particles already alive keep stepping.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced {
            self.carry.iter_mut().for_each(|c| *c = 0.0);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.carry.iter_mut().for_each(|c| *c = 0.0);
    }

    /// Advance by `dt` seconds, clamped to the configured maximum. A
    /// non-finite or negative `dt` is a no-op.
    pub fn step(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.max_dt);
        if dt == 0.0 {
            return;
        }

        for p in &mut self.particles {
            p.age += dt;
            p.velocity += p.acceleration * dt;
            p.position += p.velocity * dt;
            p.scale = (p.scale + p.scale_speed * dt).max(0.0);
            p.alpha = (p.alpha + p.alpha_speed * dt).clamp(0.0, 1.0);
            p.angle += p.spin * dt;
        }
        self.particles.retain(|p| p.age < p.lifetime);

        if self.reduced_motion {
            return;
        }
        for index in 0..self.content.cells.len() {
            let exact = self.content.cells[index].birth_rate.max(0.0) * dt + self.carry[index];
            let count = exact.floor();
            self.carry[index] = exact - count;
            for _ in 0..count as usize {
                let particle = self.spawn(index);
                self.particles.push(particle);
            }
        }
    }

    /// Draw every live particle, mapping layer-local coordinates through
    /// `to_canvas`.
    pub fn draw(&self, canvas: &mut dyn ParticleCanvas, to_canvas: Affine) {
        for p in &self.particles {
            let image = self.content.cells[p.cell].image.as_deref();
            canvas.draw_image(image, to_canvas * p.transform(), p.alpha);
        }
    }

    fn spawn(&mut self, cell_index: usize) -> Particle {
        let cell: EmitterCell = self.content.cells[cell_index].clone();
        let position = self.spawn_point();
        let lifetime = (cell.lifetime + cell.lifetime_range * self.signed()).max(0.0);
        let speed = cell.velocity + cell.velocity_range * self.signed();
        let longitude = cell.emission_longitude + cell.emission_range * (self.unit() - 0.5);
        let planar = speed * cell.emission_latitude.cos();
        Particle {
            cell: cell_index,
            position,
            velocity: Vec2::new(planar * longitude.cos(), planar * longitude.sin()),
            acceleration: Vec2::new(cell.x_acceleration, cell.y_acceleration),
            scale: (cell.scale + cell.scale_range * self.signed()).max(0.0),
            scale_speed: cell.scale_speed,
            alpha: cell.alpha.clamp(0.0, 1.0),
            alpha_speed: cell.alpha_speed,
            angle: 0.0,
            spin: cell.spin + cell.spin_range * self.signed(),
            age: 0.0,
            lifetime,
        }
    }

    fn spawn_point(&mut self) -> Point {
        let center = Point::new(
            self.content.emitter_position.x,
            self.content.emitter_position.y,
        );
        let size = self.content.emitter_size;
        match self.content.shape {
            EmitterShape::Point => center,
            EmitterShape::Line => Point::new(center.x + size.width * (self.unit() - 0.5), center.y),
            EmitterShape::Rectangle => Point::new(
                center.x + size.width * (self.unit() - 0.5),
                center.y + size.height * (self.unit() - 0.5),
            ),
            EmitterShape::Circle => {
                let radius = size.width / 2.0 * self.unit().sqrt();
                let theta = self.unit() * std::f64::consts::TAU;
                center + Vec2::new(radius * theta.cos(), radius * theta.sin())
            }
        }
    }

    /// Uniform in [0, 1).
    fn unit(&mut self) -> f64 {
        self.rng = self.rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.rng >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [-1, 1).
    fn signed(&mut self) -> f64 {
        self.unit() * 2.0 - 1.0
    }
}
