// Colour parsing for payload attributes

use eyre::{eyre, Result, WrapErr};
use gpui::{hsla, rgb, Hsla};

/// Parses `#rgb`, `#rrggbb` or a basic CSS colour name.
pub fn parse_color(value: &str) -> Result<Hsla> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex_str(hex).wrap_err_with(|| format!("invalid hex colour `{value}`"));
    }
    let named = match value.to_ascii_lowercase().as_str() {
        "black" => 0x000000,
        "white" => 0xffffff,
        "red" => 0xff0000,
        "green" => 0x008000,
        "blue" => 0x0000ff,
        "yellow" => 0xffff00,
        "orange" => 0xffa500,
        "purple" => 0x800080,
        "magenta" | "fuchsia" => 0xff00ff,
        "cyan" | "aqua" => 0x00ffff,
        "gray" | "grey" => 0x808080,
        "brown" => 0xa52a2a,
        "pink" => 0xffc0cb,
        "darkgreen" => 0x006400,
        "darkblue" => 0x00008b,
        "lightblue" => 0xadd8e6,
        other => return Err(eyre!("unknown colour name `{other}`")),
    };
    Ok(rgb(named).into())
}

fn parse_hex_str(hex: &str) -> Result<Hsla> {
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        n => return Err(eyre!("expected 3 or 6 hex digits, got {n}")),
    };
    let value = u32::from_str_radix(&expanded, 16)?;
    Ok(rgb(value).into())
}

/// Colour for the i-th item of a categorical palette.
pub fn palette_color(index: usize) -> Hsla {
    const HUES: [f32; 10] = [0.0, 0.08, 0.16, 0.33, 0.5, 0.58, 0.66, 0.75, 0.83, 0.92];
    let hue = HUES[index % HUES.len()];
    let lightness = if (index / HUES.len()) % 2 == 0 { 0.45 } else { 0.3 };
    hsla(hue, 0.8, lightness, 1.0)
}

/// Heat colour for `a` in `[0, 1]`: blue at 0, red at 1.
pub fn heat_color(a: f32) -> Hsla {
    let a = if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 };
    hsla((1.0 - a) * 240.0 / 360.0, a, 0.5, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        let red: Hsla = rgb(0xff0000).into();
        assert_eq!(parse_color("#ff0000").unwrap(), red);
        assert_eq!(parse_color("#f00").unwrap(), red);
        assert_eq!(parse_color("Red").unwrap(), red);
        assert!(parse_color("#12").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn heat_endpoints() {
        assert_eq!(heat_color(0.0).h, 240.0 / 360.0);
        assert_eq!(heat_color(1.0).h, 0.0);
        assert_eq!(heat_color(2.0).s, 1.0);
    }
}
