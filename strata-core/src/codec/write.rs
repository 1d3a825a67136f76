//! CaView → CAML element tree.

use strata_types::reduce::{derive_transitions, StateTransition};
use strata_types::{
    CaView, Color, EmitterCell, EmitterContent, GradientContent, Layer, LayerKind, LayerSubtree,
    ShapeContent, TextContent, VideoContent, WallpaperParallax,
};

use super::transform::{format_ops, TransformOp};
use super::xml::Element;
use super::{Canvas, CAML_NS, ROOT_LAYER_ID, ROOT_LAYER_NAME};

/// Wrap the view in the synthetic root layer and emit the `<caml>` tree.
pub fn view_to_element(view: &CaView, canvas: &Canvas) -> Element {
    let size = canvas.size;
    let mut root = Element::new("CALayer")
        .attr("id", ROOT_LAYER_ID)
        .attr("name", ROOT_LAYER_NAME)
        .attr("bounds", format!("0 0 {} {}", size.width, size.height))
        .attr("position", format!("{} {}", size.width / 2.0, size.height / 2.0))
        .attr("backgroundColor", format_color(canvas.background_color))
        .attr("geometryFlipped", flag(canvas.geometry_flipped));

    let subtrees = view.tree.to_subtrees();
    if !subtrees.is_empty() {
        let mut sublayers = Element::new("sublayers");
        for subtree in &subtrees {
            sublayers.push(layer_element(subtree));
        }
        root.push(sublayers);
    }
    root.push(states_element(view));
    root.push(transitions_element(&derive_transitions(view)));
    if let Some(parallax) = &view.parallax {
        root.push(parallax_element(parallax));
    }

    Element::new("caml").attr("xmlns", CAML_NS).child(root)
}

fn layer_element(subtree: &LayerSubtree) -> Element {
    let layer = &subtree.layer;
    let mut el = Element::new(class_name(&layer.kind));
    common_attrs(&mut el, layer);
    kind_markup(&mut el, &layer.kind);
    if !subtree.children.is_empty() {
        let mut sublayers = Element::new("sublayers");
        for child in &subtree.children {
            sublayers.push(layer_element(child));
        }
        el.push(sublayers);
    }
    el
}

pub(super) fn class_name(kind: &LayerKind) -> &'static str {
    match kind {
        LayerKind::Basic | LayerKind::Image(_) | LayerKind::Video(_) => "CALayer",
        LayerKind::Text(_) => "CATextLayer",
        LayerKind::Shape(_) => "CAShapeLayer",
        LayerKind::Gradient(_) => "CAGradientLayer",
        LayerKind::Emitter(_) => "CAEmitterLayer",
        LayerKind::Transform => "CATransformLayer",
        LayerKind::Replicator(_) => "CAReplicatorLayer",
        LayerKind::LiquidGlass(_) => "CABackdropLayer",
    }
}

fn common_attrs(el: &mut Element, layer: &Layer) {
    el.set("id", &layer.id);
    el.set("name", &layer.name);
    el.set("position", format!("{} {}", layer.position.x, layer.position.y));
    el.set("bounds", format!("0 0 {} {}", layer.size.width, layer.size.height));
    el.set("zPosition", layer.z_position);
    el.set("opacity", layer.opacity);
    el.set("hidden", flag(!layer.visible));
    el.set("cornerRadius", layer.corner_radius);
    if !layer.rotation.is_identity() {
        let r = layer.rotation;
        let ops: Vec<TransformOp> = [
            (r.x, TransformOp::RotateX(r.x)),
            (r.y, TransformOp::RotateY(r.y)),
            (r.z, TransformOp::RotateZ(r.z)),
        ]
        .into_iter()
        .filter(|(v, _)| *v != 0.0)
        .map(|(_, op)| op)
        .collect();
        el.set("transform", format_ops(&ops));
    }
    if let Some(color) = layer.background_color {
        el.set("backgroundColor", format_color(color));
    }
    if let Some(blend) = layer.blend_mode {
        el.set("compositingFilter", blend.as_str());
    }
    if !layer.filters.is_empty() {
        let mut filters = Element::new("filters");
        for filter in &layer.filters {
            filters.push(
                Element::new("CAFilter")
                    .attr("type", filter.kind.as_str())
                    .attr("amount", filter.amount),
            );
        }
        el.push(filters);
    }
}

fn kind_markup(el: &mut Element, kind: &LayerKind) {
    match kind {
        LayerKind::Basic | LayerKind::Transform => {}
        LayerKind::Image(image) => el.push(image_contents(&image.src)),
        LayerKind::Video(video) => el.push(video_animations(video)),
        LayerKind::Text(text) => text_attrs(el, text),
        LayerKind::Shape(shape) => shape_attrs(el, shape),
        LayerKind::Gradient(gradient) => gradient_markup(el, gradient),
        LayerKind::Emitter(emitter) => emitter_markup(el, emitter),
        LayerKind::Replicator(rep) => {
            let (tx, ty, tz) = rep.instance_translation;
            el.set("instanceCount", rep.instance_count);
            el.set("instanceDelay", rep.instance_delay);
            el.set(
                "instanceTransform",
                format_ops(&[
                    TransformOp::Translate(tx, ty, tz),
                    TransformOp::RotateZ(rep.instance_rotation),
                ]),
            );
        }
        LayerKind::LiquidGlass(glass) => {
            el.set("glass", "1");
            el.set("blurRadius", glass.blur_radius);
            if let Some(tint) = glass.tint {
                el.set("tintColor", format_color(tint));
            }
        }
    }
}

fn image_contents(src: &str) -> Element {
    Element::new("contents")
        .attr("type", "CGImage")
        .attr("src", asset_src(src))
}

fn video_animations(video: &VideoContent) -> Element {
    let mut values = Element::new("values");
    for name in video.frame_filenames() {
        values.push(Element::new("CGImage").attr("src", asset_src(&name)));
    }
    let animation = Element::new("animation")
        .attr("type", "CAKeyframeAnimation")
        .attr("keyPath", "contents")
        .attr("calculationMode", "discrete")
        .attr("duration", video.duration())
        .attr("repeatCount", "inf")
        .attr("autoreverses", flag(video.auto_reverses))
        .attr("framePrefix", &video.frame_prefix)
        .attr("frameExtension", &video.frame_extension)
        .child(values);
    Element::new("animations").child(animation)
}

fn text_attrs(el: &mut Element, text: &TextContent) {
    el.set("string", &text.string);
    el.set("fontFamily", &text.font_family);
    el.set("fontSize", text.font_size);
    el.set("foregroundColor", format_color(text.color));
    el.set("alignmentMode", text.align.as_str());
    el.set("wrapped", flag(text.wrapped));
}

fn shape_attrs(el: &mut Element, shape: &ShapeContent) {
    el.set("shape", shape.shape.as_str());
    if let Some(fill) = shape.fill {
        el.set("fillColor", format_color(fill));
    }
    if let Some(stroke) = shape.stroke {
        el.set("strokeColor", format_color(stroke));
    }
    el.set("lineWidth", shape.line_width);
}

fn gradient_markup(el: &mut Element, gradient: &GradientContent) {
    el.set("type", gradient.gradient_type.as_str());
    el.set(
        "startPoint",
        format!("{} {}", gradient.start_point.x, gradient.start_point.y),
    );
    el.set(
        "endPoint",
        format!("{} {}", gradient.end_point.x, gradient.end_point.y),
    );
    let mut colors = Element::new("colors");
    for color in &gradient.colors {
        colors.push(Element::new("CGColor").attr("value", format_color(*color)));
    }
    el.push(colors);
}

fn emitter_markup(el: &mut Element, emitter: &EmitterContent) {
    el.set(
        "emitterPosition",
        format!("{} {}", emitter.emitter_position.x, emitter.emitter_position.y),
    );
    el.set(
        "emitterSize",
        format!("{} {}", emitter.emitter_size.width, emitter.emitter_size.height),
    );
    el.set("emitterShape", emitter.shape.as_str());
    el.set("renderMode", emitter.render_mode.as_str());
    let mut cells = Element::new("emitterCells");
    for cell in &emitter.cells {
        cells.push(cell_element(cell));
    }
    el.push(cells);
}

fn cell_element(cell: &EmitterCell) -> Element {
    let mut el = Element::new("CAEmitterCell")
        .attr("id", &cell.id)
        .attr("name", &cell.id)
        .attr("birthRate", cell.birth_rate)
        .attr("lifetime", cell.lifetime)
        .attr("lifetimeRange", cell.lifetime_range)
        .attr("velocity", cell.velocity)
        .attr("velocityRange", cell.velocity_range)
        .attr("emissionLongitude", cell.emission_longitude)
        .attr("emissionLatitude", cell.emission_latitude)
        .attr("emissionRange", cell.emission_range)
        .attr("scale", cell.scale)
        .attr("scaleRange", cell.scale_range)
        .attr("scaleSpeed", cell.scale_speed)
        .attr("alphaSpeed", cell.alpha_speed)
        .attr("spin", cell.spin)
        .attr("spinRange", cell.spin_range)
        .attr("xAcceleration", cell.x_acceleration)
        .attr("yAcceleration", cell.y_acceleration)
        .attr("contentsAlpha", cell.alpha);
    if let Some(image) = &cell.image {
        el.push(image_contents(image));
    }
    el
}

fn states_element(view: &CaView) -> Element {
    let mut states = Element::new("states");
    for name in &view.state_names {
        let mut elements = Element::new("elements");
        for o in view.overrides(name) {
            let value = if o.key_path.is_rotation() {
                o.value.to_radians()
            } else {
                o.value
            };
            elements.push(
                Element::new("LKStateSetValue")
                    .attr("targetId", &o.target_id)
                    .attr("keyPath", o.key_path.as_str())
                    .child(Element::new("value").attr("type", "real").attr("value", value)),
            );
        }
        states.push(Element::new("LKState").attr("name", name).child(elements));
    }
    states
}

fn transitions_element(transitions: &[StateTransition]) -> Element {
    let mut out = Element::new("stateTransitions");
    for transition in transitions {
        let mut elements = Element::new("elements");
        for element in &transition.elements {
            let spring = element.animation;
            elements.push(
                Element::new("LKStateTransitionElement")
                    .attr("key", element.key_path.as_str())
                    .attr("targetId", &element.target_id)
                    .child(
                        Element::new("animation")
                            .attr("type", "CASpringAnimation")
                            .attr("damping", spring.damping)
                            .attr("mass", spring.mass)
                            .attr("stiffness", spring.stiffness)
                            .attr("velocity", spring.velocity)
                            .attr("duration", spring.duration)
                            .attr("fillMode", spring.fill_mode)
                            .attr("keyPath", element.key_path.as_str()),
                    ),
            );
        }
        out.push(
            Element::new("LKStateTransition")
                .attr("fromState", &transition.from)
                .attr("toState", &transition.to)
                .child(elements),
        );
    }
    out
}

fn parallax_element(parallax: &WallpaperParallax) -> Element {
    let mut out = Element::new("wallpaperParallaxGroups");
    for group in &parallax.groups {
        out.push(
            Element::new("CAWallpaperParallaxGroup")
                .attr("title", &group.title)
                .attr("layerName", &group.layer_name)
                .attr("keyPath", &group.key_path)
                .attr("axis", group.axis.as_str())
                .attr("mapMinTo", group.map_min_to)
                .attr("mapMaxTo", group.map_max_to),
        );
    }
    out
}

fn asset_src(filename: &str) -> String {
    format!("assets/{filename}")
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Unit-float channels, alpha omitted when opaque.
pub(super) fn format_color(color: Color) -> String {
    let [r, g, b, a] = color.to_unit();
    if color.a == 255 {
        format!("{r} {g} {b}")
    } else {
        format!("{r} {g} {b} {a}")
    }
}
