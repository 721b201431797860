//! Color utility functions shared across the crate.
//!
//! Label colors travel as CSS-style hex tokens (`#rrggbb`) so that any
//! renderer can consume them without knowing about this crate.

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Format an RGB triple (0.0-1.0 per channel) as `#rrggbb`.
pub fn rgb_to_hex(r: f32, g: f32, b: f32) -> String {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// Parse a `#rrggbb` token back into bytes.
pub fn parse_hex(token: &str) -> Option<[u8; 3]> {
    let hex = token.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Generate `count` well-separated colors by stepping the hue by the golden
/// angle.
pub fn golden_angle_palette(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let hue = (i as f32 * 137.5) % 360.0;
            let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
            rgb_to_hex(r, g, b)
        })
        .collect()
}
