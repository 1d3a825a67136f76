//! Layer model: common geometry plus a closed set of kind payloads.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::state::KeyPath;
use crate::LayerId;

/// A single node of a CA view's layer tree. Children live in the owning
/// [`LayerTree`](crate::LayerTree), not on the layer itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Anchor-point position in parent coordinates.
    pub position: Point,
    pub z_position: f64,
    pub size: Size,
    /// Degrees about each axis.
    pub rotation: Rotation,
    pub corner_radius: f64,
    pub opacity: f64,
    pub visible: bool,
    #[serde(default)]
    pub background_color: Option<Color>,
    #[serde(default)]
    pub blend_mode: Option<BlendMode>,
    #[serde(default)]
    pub filters: Vec<LayerFilter>,
    pub kind: LayerKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotation {
    pub fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    PlusLighter,
}

impl BlendMode {
    pub const ALL: [BlendMode; 6] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::PlusLighter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normalBlendMode",
            BlendMode::Multiply => "multiplyBlendMode",
            BlendMode::Screen => "screenBlendMode",
            BlendMode::Overlay => "overlayBlendMode",
            BlendMode::SoftLight => "softLightBlendMode",
            BlendMode::PlusLighter => "plusL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerFilter {
    pub kind: FilterKind,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    GaussianBlur,
    ColorSaturate,
    ColorContrast,
    ColorBrightness,
    ColorInvert,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::GaussianBlur,
        FilterKind::ColorSaturate,
        FilterKind::ColorContrast,
        FilterKind::ColorBrightness,
        FilterKind::ColorInvert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::GaussianBlur => "gaussianBlur",
            FilterKind::ColorSaturate => "colorSaturate",
            FilterKind::ColorContrast => "colorContrast",
            FilterKind::ColorBrightness => "colorBrightness",
            FilterKind::ColorInvert => "colorInvert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Kind-specific payload. The set is closed; walkers match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerKind {
    Basic,
    Text(TextContent),
    Image(ImageContent),
    Shape(ShapeContent),
    Gradient(GradientContent),
    Video(VideoContent),
    Emitter(EmitterContent),
    Transform,
    Replicator(ReplicatorContent),
    LiquidGlass(LiquidGlassContent),
}

impl LayerKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            LayerKind::Basic => "basic",
            LayerKind::Text(_) => "text",
            LayerKind::Image(_) => "image",
            LayerKind::Shape(_) => "shape",
            LayerKind::Gradient(_) => "gradient",
            LayerKind::Video(_) => "video",
            LayerKind::Emitter(_) => "emitter",
            LayerKind::Transform => "transform",
            LayerKind::Replicator(_) => "replicator",
            LayerKind::LiquidGlass(_) => "liquidGlass",
        }
    }

    /// Whether layers of this kind may hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            LayerKind::Basic | LayerKind::Transform | LayerKind::Replicator(_)
        )
    }

    /// Asset filenames this payload references.
    pub fn asset_refs(&self) -> Vec<String> {
        match self {
            LayerKind::Image(img) => vec![img.src.clone()],
            LayerKind::Video(video) => video.frame_filenames(),
            LayerKind::Emitter(emitter) => emitter
                .cells
                .iter()
                .filter_map(|c| c.image.clone())
                .collect(),
            LayerKind::Basic
            | LayerKind::Text(_)
            | LayerKind::Shape(_)
            | LayerKind::Gradient(_)
            | LayerKind::Transform
            | LayerKind::Replicator(_)
            | LayerKind::LiquidGlass(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub string: String,
    pub font_family: String,
    pub font_size: f64,
    pub color: Color,
    pub align: TextAlign,
    pub wrapped: bool,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            string: "Text".to_string(),
            font_family: "SFProText-Regular".to_string(),
            font_size: 16.0,
            color: Color::WHITE,
            align: TextAlign::Center,
            wrapped: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
    Justified,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justified => "justified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" | "natural" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justified" => Some(TextAlign::Justified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Asset filename inside the view's `assets/` folder.
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    pub shape: ShapeKind,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width: f64,
}

impl Default for ShapeContent {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            fill: Some(Color::WHITE),
            stroke: None,
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    RoundedRect,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::RoundedRect => "roundedRect",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rectangle" | "rect" => Some(ShapeKind::Rectangle),
            "circle" | "ellipse" => Some(ShapeKind::Circle),
            "roundedRect" => Some(ShapeKind::RoundedRect),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientContent {
    pub gradient_type: GradientType,
    /// Unit-space start point.
    pub start_point: Point,
    /// Unit-space end point.
    pub end_point: Point,
    pub colors: Vec<Color>,
}

impl Default for GradientContent {
    fn default() -> Self {
        Self {
            gradient_type: GradientType::Axial,
            start_point: Point::new(0.5, 0.0),
            end_point: Point::new(0.5, 1.0),
            colors: vec![Color::WHITE, Color::BLACK],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradientType {
    Axial,
    Radial,
    Conic,
}

impl GradientType {
    pub fn as_str(self) -> &'static str {
        match self {
            GradientType::Axial => "axial",
            GradientType::Radial => "radial",
            GradientType::Conic => "conic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "axial" => Some(GradientType::Axial),
            "radial" => Some(GradientType::Radial),
            "conic" => Some(GradientType::Conic),
            _ => None,
        }
    }
}

/// A video imported as a numbered frame sequence (`<prefix><index>.<ext>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoContent {
    pub frame_prefix: String,
    pub frame_extension: String,
    pub frame_count: u32,
    pub fps: f64,
    pub auto_reverses: bool,
}

impl VideoContent {
    pub fn frame_filename(&self, index: u32) -> String {
        format!("{}{}.{}", self.frame_prefix, index, self.frame_extension)
    }

    pub fn frame_filenames(&self) -> Vec<String> {
        (0..self.frame_count).map(|i| self.frame_filename(i)).collect()
    }

    pub fn duration(&self) -> f64 {
        if self.fps > 0.0 {
            f64::from(self.frame_count) / self.fps
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterContent {
    pub emitter_position: Point,
    pub emitter_size: Size,
    pub shape: EmitterShape,
    pub render_mode: RenderMode,
    pub cells: Vec<EmitterCell>,
}

impl Default for EmitterContent {
    fn default() -> Self {
        Self {
            emitter_position: Point::default(),
            emitter_size: Size::default(),
            shape: EmitterShape::Point,
            render_mode: RenderMode::Unordered,
            cells: vec![EmitterCell::default()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmitterShape {
    Point,
    Line,
    Rectangle,
    Circle,
}

impl EmitterShape {
    pub fn as_str(self) -> &'static str {
        match self {
            EmitterShape::Point => "point",
            EmitterShape::Line => "line",
            EmitterShape::Rectangle => "rectangle",
            EmitterShape::Circle => "circle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "point" => Some(EmitterShape::Point),
            "line" => Some(EmitterShape::Line),
            "rectangle" => Some(EmitterShape::Rectangle),
            "circle" => Some(EmitterShape::Circle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    Unordered,
    Additive,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Unordered => "unordered",
            RenderMode::Additive => "additive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unordered" => Some(RenderMode::Unordered),
            "additive" => Some(RenderMode::Additive),
            _ => None,
        }
    }
}

/// A particle archetype. Angles are radians, rates are per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterCell {
    pub id: String,
    pub image: Option<String>,
    pub birth_rate: f64,
    pub lifetime: f64,
    pub lifetime_range: f64,
    pub velocity: f64,
    pub velocity_range: f64,
    pub emission_longitude: f64,
    pub emission_latitude: f64,
    pub emission_range: f64,
    pub scale: f64,
    pub scale_range: f64,
    pub scale_speed: f64,
    pub alpha: f64,
    pub alpha_speed: f64,
    pub spin: f64,
    pub spin_range: f64,
    pub x_acceleration: f64,
    pub y_acceleration: f64,
}

impl Default for EmitterCell {
    fn default() -> Self {
        Self {
            id: "cell".to_string(),
            image: None,
            birth_rate: 10.0,
            lifetime: 1.0,
            lifetime_range: 0.0,
            velocity: 100.0,
            velocity_range: 0.0,
            emission_longitude: 0.0,
            emission_latitude: 0.0,
            emission_range: std::f64::consts::TAU,
            scale: 1.0,
            scale_range: 0.0,
            scale_speed: 0.0,
            alpha: 1.0,
            alpha_speed: 0.0,
            spin: 0.0,
            spin_range: 0.0,
            x_acceleration: 0.0,
            y_acceleration: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicatorContent {
    pub instance_count: u32,
    pub instance_delay: f64,
    pub instance_translation: (f64, f64, f64),
    /// Degrees about z applied per instance.
    pub instance_rotation: f64,
}

impl Default for ReplicatorContent {
    fn default() -> Self {
        Self {
            instance_count: 3,
            instance_delay: 0.0,
            instance_translation: (20.0, 0.0, 0.0),
            instance_rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidGlassContent {
    pub blur_radius: f64,
    pub tint: Option<Color>,
}

impl Default for LiquidGlassContent {
    fn default() -> Self {
        Self {
            blur_radius: 12.0,
            tint: None,
        }
    }
}

impl Layer {
    /// A layer with default geometry and the given payload. Name defaults to
    /// the capitalized kind name.
    pub fn new(kind: LayerKind) -> Self {
        let name = default_name(&kind);
        Self {
            id: LayerId::generate(),
            name,
            position: Point::new(50.0, 50.0),
            z_position: 0.0,
            size: Size::new(100.0, 100.0),
            rotation: Rotation::default(),
            corner_radius: 0.0,
            opacity: 1.0,
            visible: true,
            background_color: None,
            blend_mode: None,
            filters: Vec::new(),
            kind,
        }
    }

    pub fn with_id(mut self, id: impl Into<LayerId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_frame(mut self, position: Point, size: Size) -> Self {
        self.position = position;
        self.size = size;
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Read the numeric property addressed by `key`.
    pub fn property(&self, key: KeyPath) -> f64 {
        match key {
            KeyPath::PositionX => self.position.x,
            KeyPath::PositionY => self.position.y,
            KeyPath::ZPosition => self.z_position,
            KeyPath::BoundsWidth => self.size.width,
            KeyPath::BoundsHeight => self.size.height,
            KeyPath::RotationX => self.rotation.x,
            KeyPath::RotationY => self.rotation.y,
            KeyPath::RotationZ => self.rotation.z,
            KeyPath::Opacity => self.opacity,
            KeyPath::CornerRadius => self.corner_radius,
        }
    }

    /// Write the numeric property addressed by `key`.
    pub fn set_property(&mut self, key: KeyPath, value: f64) {
        match key {
            KeyPath::PositionX => self.position.x = value,
            KeyPath::PositionY => self.position.y = value,
            KeyPath::ZPosition => self.z_position = value,
            KeyPath::BoundsWidth => self.size.width = value,
            KeyPath::BoundsHeight => self.size.height = value,
            KeyPath::RotationX => self.rotation.x = value,
            KeyPath::RotationY => self.rotation.y = value,
            KeyPath::RotationZ => self.rotation.z = value,
            KeyPath::Opacity => self.opacity = value,
            KeyPath::CornerRadius => self.corner_radius = value,
        }
    }

    /// Shallow-merge a patch onto this layer. Id is never patched.
    pub fn apply_patch(&mut self, patch: &LayerPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(z) = patch.z_position {
            self.z_position = z;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(radius) = patch.corner_radius {
            self.corner_radius = radius;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(bg) = patch.background_color {
            self.background_color = bg;
        }
        if let Some(blend) = patch.blend_mode {
            self.blend_mode = blend;
        }
        if let Some(filters) = &patch.filters {
            self.filters = filters.clone();
        }
        if let Some(kind) = &patch.kind {
            self.kind = kind.clone();
        }
    }
}

fn default_name(kind: &LayerKind) -> String {
    match kind {
        LayerKind::Basic => "Layer",
        LayerKind::Text(_) => "Text Layer",
        LayerKind::Image(_) => "Image Layer",
        LayerKind::Shape(_) => "Shape Layer",
        LayerKind::Gradient(_) => "Gradient Layer",
        LayerKind::Video(_) => "Video Layer",
        LayerKind::Emitter(_) => "Emitter Layer",
        LayerKind::Transform => "Transform Layer",
        LayerKind::Replicator(_) => "Replicator Layer",
        LayerKind::LiquidGlass(_) => "Liquid Glass",
    }
    .to_string()
}

/// A partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub position: Option<Point>,
    pub z_position: Option<f64>,
    pub size: Option<Size>,
    pub rotation: Option<Rotation>,
    pub corner_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub background_color: Option<Option<Color>>,
    pub blend_mode: Option<Option<BlendMode>>,
    pub filters: Option<Vec<LayerFilter>>,
    pub kind: Option<LayerKind>,
}

impl LayerPatch {
    /// Split the patch into redirectable numeric writes and the structural
    /// remainder. Numeric fields are expressed per key path.
    pub fn split_numeric(&self) -> (Vec<(KeyPath, f64)>, LayerPatch) {
        let mut numeric = Vec::new();
        if let Some(p) = self.position {
            numeric.push((KeyPath::PositionX, p.x));
            numeric.push((KeyPath::PositionY, p.y));
        }
        if let Some(z) = self.z_position {
            numeric.push((KeyPath::ZPosition, z));
        }
        if let Some(s) = self.size {
            numeric.push((KeyPath::BoundsWidth, s.width));
            numeric.push((KeyPath::BoundsHeight, s.height));
        }
        if let Some(r) = self.rotation {
            numeric.push((KeyPath::RotationX, r.x));
            numeric.push((KeyPath::RotationY, r.y));
            numeric.push((KeyPath::RotationZ, r.z));
        }
        if let Some(o) = self.opacity {
            numeric.push((KeyPath::Opacity, o));
        }
        if let Some(c) = self.corner_radius {
            numeric.push((KeyPath::CornerRadius, c));
        }
        let rest = LayerPatch {
            name: self.name.clone(),
            visible: self.visible,
            background_color: self.background_color,
            blend_mode: self.blend_mode,
            filters: self.filters.clone(),
            kind: self.kind.clone(),
            ..LayerPatch::default()
        };
        (numeric, rest)
    }

    pub fn is_empty(&self) -> bool {
        *self == LayerPatch::default()
    }
}
