/// Text color used on light task backgrounds.
pub const DARK_TEXT: &str = "#2d2a26";
/// Text color used on dark or unreadable task backgrounds.
pub const LIGHT_TEXT: &str = "#ffffff";

const BRIGHTNESS_THRESHOLD: f64 = 128.0;

/// Perceived brightness (0..=255) of a `#rrggbb` color. `None` for anything else.
pub fn brightness(hex: &str) -> Option<f64> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    let r = channel(0..2)? as f64;
    let g = channel(2..4)? as f64;
    let b = channel(4..6)? as f64;
    Some((r * 299.0 + g * 587.0 + b * 114.0) / 1000.0)
}

pub fn contrast_text_color(background: &str) -> &'static str {
    match brightness(background) {
        Some(value) if value > BRIGHTNESS_THRESHOLD => DARK_TEXT,
        _ => LIGHT_TEXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_pick_readable_text() {
        assert_eq!(contrast_text_color("#f4d19b"), DARK_TEXT);
        assert_eq!(contrast_text_color("#7d9bb8"), DARK_TEXT);
        assert_eq!(contrast_text_color("#2d2a26"), LIGHT_TEXT);
        assert_eq!(contrast_text_color("#000000"), LIGHT_TEXT);
    }

    #[test]
    fn malformed_colors_fall_back_to_light_text() {
        assert_eq!(brightness("#fff"), None);
        assert_eq!(brightness("#zzzzzz"), None);
        assert_eq!(contrast_text_color("teal"), LIGHT_TEXT);
    }

    #[test]
    fn brightness_weights_channels() {
        assert_eq!(brightness("#ffffff"), Some(255.0));
        assert_eq!(brightness("#ff0000"), Some(76.245));
    }
}
