//! CAML element tree → CaView.

use std::str::FromStr;

use strata_types::reduce::states::upsert_override;
use strata_types::state::view::split_variant;
use strata_types::{
    BlendMode, CaView, Color, EmitterCell, EmitterContent, EmitterShape, FilterKind,
    GradientContent, GradientType, ImageContent, KeyPath, Layer, LayerFilter, LayerId, LayerKind,
    LayerSubtree, LayerTree, LiquidGlassContent, ParallaxAxis, ParallaxGroup, Point, RenderMode,
    ReplicatorContent, Rotation, ShapeContent, ShapeKind, Size, TextAlign, TextContent,
    VideoContent, ViewKind, WallpaperParallax,
};

use super::transform::{parse_ops, TransformOp};
use super::xml::{is_layer_element, Document, Element};
use super::{Canvas, ParsedCaml, ROOT_LAYER_NAME};
use crate::error::{Result, StrataError};

pub fn document_to_view(doc: &Document, kind: ViewKind) -> Result<ParsedCaml> {
    if doc.root.name != "caml" {
        return Err(StrataError::codec(doc.root.name.clone(), "expected <caml> root"));
    }
    let mut view = CaView::new(kind);
    view.header_comments = doc.header_comments.clone();

    let Some(top) = doc.root.children.iter().find(|c| is_layer_element(&c.name)) else {
        return Ok(ParsedCaml { view, canvas: None });
    };

    let (subtrees, canvas) = if top.name == "CALayer" && top.get("name") == Some(ROOT_LAYER_NAME) {
        let children = match top.first("sublayers") {
            Some(sublayers) => layer_children(sublayers)?,
            None => Vec::new(),
        };
        (children, Some(canvas_from(top)?))
    } else {
        (vec![layer_from(top)?], None)
    };

    let expected: usize = subtrees.iter().map(|s| s.iter().count()).sum();
    view.tree = LayerTree::from_subtrees(subtrees);
    if view.tree.len() != expected {
        log::warn!(
            target: "codec",
            "{}: dropped {} layer(s) with duplicate ids",
            kind,
            expected - view.tree.len()
        );
    }

    if let Some(states) = top.first("states") {
        read_states(&mut view, states)?;
    }
    if kind == ViewKind::Wallpaper {
        if let Some(groups) = top.first("wallpaperParallaxGroups") {
            view.parallax = Some(read_parallax(groups)?);
        }
    }
    Ok(ParsedCaml { view, canvas })
}

fn canvas_from(el: &Element) -> Result<Canvas> {
    let (_, _, width, height) = rect_attr(el, "bounds")?.unwrap_or((0.0, 0.0, 0.0, 0.0));
    Ok(Canvas {
        size: Size::new(width, height),
        background_color: color_attr(el, "backgroundColor")?.unwrap_or(Color::BLACK),
        geometry_flipped: flag_attr(el, "geometryFlipped")?.unwrap_or(false),
    })
}

fn layer_children(sublayers: &Element) -> Result<Vec<LayerSubtree>> {
    sublayers
        .children
        .iter()
        .filter(|c| is_layer_element(&c.name))
        .map(layer_from)
        .collect()
}

fn layer_from(el: &Element) -> Result<LayerSubtree> {
    let kind = kind_from(el)?;
    let mut layer = Layer::new(kind);
    if let Some(id) = el.get("id") {
        layer.id = LayerId::new(id);
    }
    if let Some(name) = el.get("name") {
        layer.name = name.to_string();
    }
    if let Some((x, y)) = pair_attr(el, "position")? {
        layer.position = Point::new(x, y);
    }
    if let Some((_, _, w, h)) = rect_attr(el, "bounds")? {
        layer.size = Size::new(w, h);
    }
    layer.z_position = num_attr(el, "zPosition")?.unwrap_or(0.0);
    layer.opacity = num_attr(el, "opacity")?.unwrap_or(1.0);
    layer.visible = !flag_attr(el, "hidden")?.unwrap_or(false);
    layer.corner_radius = num_attr(el, "cornerRadius")?.unwrap_or(0.0);
    if let Some(transform) = el.get("transform") {
        layer.rotation = rotation_from(&parse_ops(transform)?);
    }
    layer.background_color = color_attr(el, "backgroundColor")?;
    layer.blend_mode = el.get("compositingFilter").and_then(BlendMode::parse);
    if let Some(filters) = el.first("filters") {
        layer.filters = filters
            .named("CAFilter")
            .filter_map(|f| {
                let kind = FilterKind::parse(f.get("type")?)?;
                let amount = f.get("amount").and_then(|a| a.parse().ok()).unwrap_or(0.0);
                Some(LayerFilter { kind, amount })
            })
            .collect();
    }
    let children = match el.first("sublayers") {
        Some(sublayers) => layer_children(sublayers)?,
        None => Vec::new(),
    };
    Ok(LayerSubtree::with_children(layer, children))
}

fn rotation_from(ops: &[TransformOp]) -> Rotation {
    let mut rotation = Rotation::default();
    for op in ops {
        match *op {
            TransformOp::RotateX(d) => rotation.x = d,
            TransformOp::RotateY(d) => rotation.y = d,
            TransformOp::RotateZ(d) => rotation.z = d,
            TransformOp::Translate(..) => {}
        }
    }
    rotation
}

fn kind_from(el: &Element) -> Result<LayerKind> {
    Ok(match el.name.as_str() {
        "CALayer" => {
            if let Some(animation) = el
                .first("animations")
                .and_then(|a| a.named("animation").find(|an| an.get("keyPath") == Some("contents")))
            {
                LayerKind::Video(video_from(animation)?)
            } else if let Some(contents) = el.first("contents") {
                LayerKind::Image(ImageContent {
                    src: strip_asset(contents.get("src").unwrap_or_default()),
                })
            } else {
                LayerKind::Basic
            }
        }
        "CATextLayer" => LayerKind::Text(text_from(el)?),
        "CAShapeLayer" => LayerKind::Shape(shape_from(el)?),
        "CAGradientLayer" => LayerKind::Gradient(gradient_from(el)?),
        "CAEmitterLayer" => LayerKind::Emitter(emitter_from(el)?),
        "CATransformLayer" => LayerKind::Transform,
        "CAReplicatorLayer" => LayerKind::Replicator(replicator_from(el)?),
        "CABackdropLayer" => LayerKind::LiquidGlass(LiquidGlassContent {
            blur_radius: num_attr(el, "blurRadius")?.unwrap_or(0.0),
            tint: color_attr(el, "tintColor")?,
        }),
        other => {
            log::debug!(target: "codec", "unknown layer class {other}, reading as basic layer");
            LayerKind::Basic
        }
    })
}

fn video_from(animation: &Element) -> Result<VideoContent> {
    let frames: Vec<String> = animation
        .first("values")
        .map(|values| {
            values
                .children
                .iter()
                .filter_map(|v| v.get("src"))
                .map(strip_asset)
                .collect()
        })
        .unwrap_or_default();
    let frame_count = frames.len() as u32;
    let fallback_ext = animation.get("frameExtension").unwrap_or("png").to_string();
    let (frame_prefix, frame_extension) = match (animation.get("framePrefix"), frames.first()) {
        (Some(prefix), _) => (prefix.to_string(), fallback_ext),
        (None, Some(first)) => split_frame_name(first, &fallback_ext),
        (None, None) => (String::new(), fallback_ext),
    };
    let duration = num_attr(animation, "duration")?.unwrap_or(0.0);
    let fps = if duration > 0.0 {
        round6(f64::from(frame_count) / duration)
    } else {
        0.0
    };
    Ok(VideoContent {
        frame_prefix,
        frame_extension,
        frame_count,
        fps,
        auto_reverses: flag_attr(animation, "autoreverses")?.unwrap_or(false),
    })
}

/// `clip_0.jpg` → (`clip_`, `jpg`). Only for files without `framePrefix`;
/// a prefix ending in a digit cannot be recovered this way.
fn split_frame_name(name: &str, fallback_ext: &str) -> (String, String) {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_string()),
        None => (name, fallback_ext.to_string()),
    };
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    (prefix.to_string(), ext)
}

fn text_from(el: &Element) -> Result<TextContent> {
    let fallback = TextContent::default();
    Ok(TextContent {
        string: el.get("string").map(str::to_string).unwrap_or_default(),
        font_family: el
            .get("fontFamily")
            .map(str::to_string)
            .unwrap_or(fallback.font_family),
        font_size: num_attr(el, "fontSize")?.unwrap_or(fallback.font_size),
        color: color_attr(el, "foregroundColor")?.unwrap_or(fallback.color),
        align: el
            .get("alignmentMode")
            .and_then(TextAlign::parse)
            .unwrap_or(fallback.align),
        wrapped: flag_attr(el, "wrapped")?.unwrap_or(fallback.wrapped),
    })
}

fn shape_from(el: &Element) -> Result<ShapeContent> {
    Ok(ShapeContent {
        shape: el
            .get("shape")
            .and_then(ShapeKind::parse)
            .unwrap_or(ShapeKind::Rectangle),
        fill: color_attr(el, "fillColor")?,
        stroke: color_attr(el, "strokeColor")?,
        line_width: num_attr(el, "lineWidth")?.unwrap_or(1.0),
    })
}

fn gradient_from(el: &Element) -> Result<GradientContent> {
    let fallback = GradientContent::default();
    let colors = match el.first("colors") {
        Some(colors) => colors
            .named("CGColor")
            .filter_map(|c| c.get("value"))
            .map(parse_color)
            .collect::<Result<Vec<_>>>()?,
        None => fallback.colors,
    };
    Ok(GradientContent {
        gradient_type: el
            .get("type")
            .and_then(GradientType::parse)
            .unwrap_or(GradientType::Axial),
        start_point: pair_attr(el, "startPoint")?
            .map(|(x, y)| Point::new(x, y))
            .unwrap_or(fallback.start_point),
        end_point: pair_attr(el, "endPoint")?
            .map(|(x, y)| Point::new(x, y))
            .unwrap_or(fallback.end_point),
        colors,
    })
}

fn emitter_from(el: &Element) -> Result<EmitterContent> {
    let cells = match el.first("emitterCells") {
        Some(cells) => cells
            .named("CAEmitterCell")
            .map(cell_from)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    Ok(EmitterContent {
        emitter_position: pair_attr(el, "emitterPosition")?
            .map(|(x, y)| Point::new(x, y))
            .unwrap_or_default(),
        emitter_size: pair_attr(el, "emitterSize")?
            .map(|(w, h)| Size::new(w, h))
            .unwrap_or_default(),
        shape: el
            .get("emitterShape")
            .and_then(EmitterShape::parse)
            .unwrap_or(EmitterShape::Point),
        render_mode: el
            .get("renderMode")
            .and_then(RenderMode::parse)
            .unwrap_or(RenderMode::Unordered),
        cells,
    })
}

fn cell_from(el: &Element) -> Result<EmitterCell> {
    let d = EmitterCell::default();
    let num = |key: &str, fallback: f64| -> Result<f64> { Ok(num_attr(el, key)?.unwrap_or(fallback)) };
    Ok(EmitterCell {
        id: el
            .get("id")
            .or_else(|| el.get("name"))
            .map(str::to_string)
            .unwrap_or(d.id.clone()),
        image: el
            .first("contents")
            .and_then(|c| c.get("src"))
            .map(strip_asset),
        birth_rate: num("birthRate", d.birth_rate)?,
        lifetime: num("lifetime", d.lifetime)?,
        lifetime_range: num("lifetimeRange", d.lifetime_range)?,
        velocity: num("velocity", d.velocity)?,
        velocity_range: num("velocityRange", d.velocity_range)?,
        emission_longitude: num("emissionLongitude", d.emission_longitude)?,
        emission_latitude: num("emissionLatitude", d.emission_latitude)?,
        emission_range: num("emissionRange", d.emission_range)?,
        scale: num("scale", d.scale)?,
        scale_range: num("scaleRange", d.scale_range)?,
        scale_speed: num("scaleSpeed", d.scale_speed)?,
        alpha: num("contentsAlpha", d.alpha)?,
        alpha_speed: num("alphaSpeed", d.alpha_speed)?,
        spin: num("spin", d.spin)?,
        spin_range: num("spinRange", d.spin_range)?,
        x_acceleration: num("xAcceleration", d.x_acceleration)?,
        y_acceleration: num("yAcceleration", d.y_acceleration)?,
    })
}

fn replicator_from(el: &Element) -> Result<ReplicatorContent> {
    let mut rep = ReplicatorContent {
        instance_count: num_attr(el, "instanceCount")?.map(|n| n.max(0.0) as u32).unwrap_or(1),
        instance_delay: num_attr(el, "instanceDelay")?.unwrap_or(0.0),
        instance_translation: (0.0, 0.0, 0.0),
        instance_rotation: 0.0,
    };
    if let Some(transform) = el.get("instanceTransform") {
        for op in parse_ops(transform)? {
            match op {
                TransformOp::Translate(x, y, z) => rep.instance_translation = (x, y, z),
                TransformOp::RotateZ(d) => rep.instance_rotation = d,
                TransformOp::RotateX(_) | TransformOp::RotateY(_) => {}
            }
        }
    }
    Ok(rep)
}

fn read_states(view: &mut CaView, states: &Element) -> Result<()> {
    view.state_names.clear();
    view.state_overrides.clear();
    for state in states.named("LKState") {
        let Some(name) = state.get("name") else {
            continue;
        };
        if !view.state_names.iter().any(|n| n == name) {
            view.state_names.push(name.to_string());
        }
        let list = view.state_overrides.entry(name.to_string()).or_default();
        let Some(elements) = state.first("elements") else {
            continue;
        };
        for set in elements.named("LKStateSetValue") {
            let (Some(target), Some(key)) = (set.get("targetId"), set.get("keyPath")) else {
                continue;
            };
            let Some(key_path) = KeyPath::parse(key) else {
                log::debug!(target: "codec", "state {name}: skipping key path {key}");
                continue;
            };
            let Some(raw) = set.first("value").and_then(|v| v.get("value")) else {
                continue;
            };
            let mut value: f64 = parse_num("value", raw)?;
            if key_path.is_rotation() {
                value = degrees_for(value);
            }
            upsert_override(list, &LayerId::new(target), key_path, value);
        }
    }
    view.appearance_split = view
        .state_names
        .iter()
        .any(|n| split_variant(n).1.is_some());
    Ok(())
}

fn read_parallax(groups: &Element) -> Result<WallpaperParallax> {
    let mut out = WallpaperParallax::default();
    for group in groups.named("CAWallpaperParallaxGroup") {
        out.groups.push(ParallaxGroup {
            title: group.get("title").unwrap_or_default().to_string(),
            layer_name: group.get("layerName").unwrap_or_default().to_string(),
            key_path: group.get("keyPath").unwrap_or_default().to_string(),
            axis: group
                .get("axis")
                .and_then(ParallaxAxis::parse)
                .unwrap_or(ParallaxAxis::X),
            map_min_to: num_attr(group, "mapMinTo")?.unwrap_or(0.0),
            map_max_to: num_attr(group, "mapMaxTo")?.unwrap_or(0.0),
        });
    }
    Ok(out)
}

fn strip_asset(src: &str) -> String {
    src.strip_prefix("assets/").unwrap_or(src).to_string()
}

/// Shortest decimal degree value that converts back to exactly `radians`,
/// so a written angle reads back as the same number.
fn degrees_for(radians: f64) -> f64 {
    let degrees = radians.to_degrees();
    if !degrees.is_finite() {
        return degrees;
    }
    (0..17)
        .filter_map(|digits| format!("{:.*e}", digits, degrees).parse::<f64>().ok())
        .find(|candidate| candidate.to_radians() == radians)
        .unwrap_or(degrees)
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn parse_num<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| StrataError::codec(key, format!("invalid number {raw:?}")))
}

fn num_attr(el: &Element, key: &str) -> Result<Option<f64>> {
    el.get(key).map(|raw| parse_num(key, raw)).transpose()
}

fn flag_attr(el: &Element, key: &str) -> Result<Option<bool>> {
    Ok(el.get(key).map(|raw| matches!(raw.trim(), "1" | "true" | "YES")))
}

fn numbers(key: &str, raw: &str) -> Result<Vec<f64>> {
    raw.split_whitespace().map(|part| parse_num(key, part)).collect()
}

fn pair_attr(el: &Element, key: &str) -> Result<Option<(f64, f64)>> {
    let Some(raw) = el.get(key) else {
        return Ok(None);
    };
    match numbers(key, raw)?.as_slice() {
        [a, b] => Ok(Some((*a, *b))),
        _ => Err(StrataError::codec(key, format!("expected 2 numbers, got {raw:?}"))),
    }
}

fn rect_attr(el: &Element, key: &str) -> Result<Option<(f64, f64, f64, f64)>> {
    let Some(raw) = el.get(key) else {
        return Ok(None);
    };
    match numbers(key, raw)?.as_slice() {
        [x, y, w, h] => Ok(Some((*x, *y, *w, *h))),
        _ => Err(StrataError::codec(key, format!("expected 4 numbers, got {raw:?}"))),
    }
}

fn color_attr(el: &Element, key: &str) -> Result<Option<Color>> {
    el.get(key).map(parse_color).transpose()
}

/// `r g b [a]` unit floats, or `#rrggbb[aa]`.
fn parse_color(raw: &str) -> Result<Color> {
    if raw.trim_start().starts_with('#') {
        return Color::from_hex(raw)
            .ok_or_else(|| StrataError::codec("color", format!("invalid hex color {raw:?}")));
    }
    match numbers("color", raw)?.as_slice() {
        [r, g, b] => Ok(Color::from_unit(*r, *g, *b, 1.0)),
        [r, g, b, a] => Ok(Color::from_unit(*r, *g, *b, *a)),
        _ => Err(StrataError::codec("color", format!("expected 3 or 4 channels, got {raw:?}"))),
    }
}
