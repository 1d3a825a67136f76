use kurbo::Affine;

/// Raster target for particle draws.
pub trait ParticleCanvas {
    /// Draw one cell image (`None` for an untextured cell) at `transform`.
    fn draw_image(&mut self, image: Option<&str>, transform: Affine, alpha: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub image: Option<String>,
    pub transform: Affine,
    pub alpha: f64,
}

/// Canvas that records draw calls instead of rasterizing.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub draws: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl ParticleCanvas for RecordingCanvas {
    fn draw_image(&mut self, image: Option<&str>, transform: Affine, alpha: f64) {
        self.draws.push(DrawCall {
            image: image.map(str::to_string),
            transform,
            alpha,
        });
    }
}
