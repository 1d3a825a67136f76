//! Particle emitter preview.
//!
//! An approximation of the runtime's emitter for on-canvas preview only;
//! nothing here feeds back into the document. Each frame spawns particles
//! at `birth_rate × Δt` per cell (fractional remainders carry to the next
//! frame), integrates them, culls expired ones and draws the survivors
//! through a [`ParticleCanvas`].

mod canvas;
mod preview;
mod simulator;

pub use canvas::{DrawCall, ParticleCanvas, RecordingCanvas};
pub use preview::EmitterPreview;
pub use simulator::{EmitterSimulator, Particle};
