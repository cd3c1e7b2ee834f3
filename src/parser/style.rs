//! Inline CSS style parsing for absolutely-positioned text fragments
//!
//! Manual pages are rendered as position-absolute text layers, so the only
//! reliable layout signal is each element's `style` attribute. This module
//! pulls the three properties the extractor cares about: `top`, `left`, and
//! `font-size`.

/// Positional properties parsed from an inline style string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleProps {
    pub top: i32,
    pub left: i32,
    pub font_size: i32,
}

/// Body-text baseline assumed when a fragment carries no font-size
pub const DEFAULT_FONT_SIZE: i32 = 16;

impl Default for StyleProps {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Parse an inline style attribute into positional properties
///
/// Declarations are split on `;` and `:`; pixel suffixes are stripped and the
/// value parsed as a number (fractional offsets truncate). Missing or
/// malformed declarations fall back to the defaults.
pub fn parse_style(style: &str) -> StyleProps {
    let mut props = StyleProps::default();

    for declaration in style.split(';') {
        let Some((key, value)) = declaration.split_once(':') else {
            continue;
        };

        let value = value.trim().trim_end_matches("px").trim();

        match key.trim().to_lowercase().as_str() {
            "top" => props.top = parse_px(value).unwrap_or(props.top),
            "left" => props.left = parse_px(value).unwrap_or(props.left),
            "font-size" => props.font_size = parse_px(value).unwrap_or(props.font_size),
            _ => {}
        }
    }

    props
}

fn parse_px(value: &str) -> Option<i32> {
    // Renderers emit both "120px" and "120.5px"
    value
        .parse::<i32>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|v| v as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_style() {
        let props = parse_style("position:absolute;top:120px;left:48px;font-size:14px");
        assert_eq!(props.top, 120);
        assert_eq!(props.left, 48);
        assert_eq!(props.font_size, 14);
    }

    #[test]
    fn test_missing_properties_default() {
        let props = parse_style("color:red");
        assert_eq!(props, StyleProps::default());
        assert_eq!(props.top, 0);
        assert_eq!(props.left, 0);
        assert_eq!(props.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_empty_style() {
        assert_eq!(parse_style(""), StyleProps::default());
    }

    #[test]
    fn test_whitespace_tolerance() {
        let props = parse_style(" top : 10px ; left : 20px ; font-size : 24px ");
        assert_eq!(props.top, 10);
        assert_eq!(props.left, 20);
        assert_eq!(props.font_size, 24);
    }

    #[test]
    fn test_fractional_pixels_truncate() {
        let props = parse_style("top:120.7px;left:33.2px");
        assert_eq!(props.top, 120);
        assert_eq!(props.left, 33);
    }

    #[test]
    fn test_malformed_value_falls_back() {
        let props = parse_style("top:auto;font-size:inherit");
        assert_eq!(props.top, 0);
        assert_eq!(props.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_unitless_values() {
        let props = parse_style("top:50;left:10");
        assert_eq!(props.top, 50);
        assert_eq!(props.left, 10);
    }
}
