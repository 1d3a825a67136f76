//! The `transform` attribute mini-grammar: a space-separated list of
//! `name(args)` functions, e.g. `rotateZ(45deg) translate(20, 0, 0)`.
//! Angles take a `deg` or `rad` suffix; bare angles are degrees.

use crate::error::{Result, StrataError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Degrees.
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    Translate(f64, f64, f64),
}

pub fn format_ops(ops: &[TransformOp]) -> String {
    ops.iter()
        .map(|op| match op {
            TransformOp::RotateX(d) => format!("rotateX({d}deg)"),
            TransformOp::RotateY(d) => format!("rotateY({d}deg)"),
            TransformOp::RotateZ(d) => format!("rotateZ({d}deg)"),
            TransformOp::Translate(x, y, z) => format!("translate({x}, {y}, {z})"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_ops(text: &str) -> Result<Vec<TransformOp>> {
    let mut ops = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| malformed(text, "expected '('"))?;
        let close = rest[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| malformed(text, "expected ')'"))?;
        let name = rest[..open].trim();
        let args: Vec<&str> = rest[open + 1..close]
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        ops.push(parse_op(name, &args).ok_or_else(|| malformed(text, name))?);
        rest = rest[close + 1..].trim_start();
    }
    Ok(ops)
}

fn parse_op(name: &str, args: &[&str]) -> Option<TransformOp> {
    match (name, args) {
        ("rotateX", [a]) => Some(TransformOp::RotateX(parse_angle(a)?)),
        ("rotateY", [a]) => Some(TransformOp::RotateY(parse_angle(a)?)),
        ("rotateZ" | "rotate", [a]) => Some(TransformOp::RotateZ(parse_angle(a)?)),
        ("translate", [x, y]) => Some(TransformOp::Translate(x.parse().ok()?, y.parse().ok()?, 0.0)),
        ("translate", [x, y, z]) => Some(TransformOp::Translate(
            x.parse().ok()?,
            y.parse().ok()?,
            z.parse().ok()?,
        )),
        _ => None,
    }
}

fn parse_angle(arg: &str) -> Option<f64> {
    if let Some(deg) = arg.strip_suffix("deg") {
        deg.parse().ok()
    } else if let Some(rad) = arg.strip_suffix("rad") {
        rad.parse::<f64>().ok().map(f64::to_degrees)
    } else {
        arg.parse().ok()
    }
}

fn malformed(text: &str, detail: &str) -> StrataError {
    StrataError::codec("transform", format!("{detail} in {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_functions() {
        let ops = parse_ops("rotateX(10deg) rotateZ(45) translate(1, 2.5, -3)").unwrap();
        assert_eq!(
            ops,
            vec![
                TransformOp::RotateX(10.0),
                TransformOp::RotateZ(45.0),
                TransformOp::Translate(1.0, 2.5, -3.0),
            ]
        );
    }

    #[test]
    fn radians_convert_to_degrees() {
        let ops = parse_ops("rotateY(3.141592653589793rad)").unwrap();
        match ops.as_slice() {
            [TransformOp::RotateY(d)] => assert!((d - 180.0).abs() < 1e-9),
            other => panic!("unexpected ops {other:?}"),
        }
    }

    #[test]
    fn format_then_parse() {
        let ops = vec![TransformOp::RotateZ(-12.5), TransformOp::Translate(20.0, 0.0, 0.0)];
        assert_eq!(parse_ops(&format_ops(&ops)).unwrap(), ops);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_ops("skew(1)").is_err());
        assert!(parse_ops("rotateZ(45").is_err());
        assert!(parse_ops("").unwrap().is_empty());
    }
}
