use serde::{Deserialize, Serialize};

/// Colour with channels in [0, 1], as design tools express fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn unit_to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `{r: 1, g: 0, b: 0}` → `"#ff0000"`.
pub fn rgb_to_hex(color: &FillColor) -> String {
    Rgb {
        r: unit_to_byte(color.r),
        g: unit_to_byte(color.g),
        b: unit_to_byte(color.b),
    }
    .to_hex()
}

/// Parse a CSS colour string: `#rgb`, `#rrggbb`, `#rrggbbaa`,
/// `rgb()`/`rgba()` with comma or space separators, `black`, `white`.
/// Alpha is ignored.
pub fn parse_color(value: &str) -> Option<Rgb> {
    let v = value.trim().to_lowercase();

    match v.as_str() {
        "black" => return Some(Rgb { r: 0, g: 0, b: 0 }),
        "white" => {
            return Some(Rgb {
                r: 255,
                g: 255,
                b: 255,
            });
        }
        _ => {}
    }

    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }

    let inner = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    // "255, 0, 0" | "255 0 0" | "255 0 0 / 0.5"
    let color_part = inner.split('/').next()?;
    let channels: Vec<&str> = color_part
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    if channels.len() < 3 || channels.len() > 4 {
        return None;
    }

    Some(Rgb {
        r: parse_channel(channels[0])?,
        g: parse_channel(channels[1])?,
        b: parse_channel(channels[2])?,
    })
}

fn parse_channel(token: &str) -> Option<u8> {
    if let Some(pct) = token.strip_suffix('%') {
        let p: f64 = pct.parse().ok()?;
        if !(0.0..=100.0).contains(&p) {
            return None;
        }
        return Some((p / 100.0 * 255.0).round() as u8);
    }

    let n: f64 = token.parse().ok()?;
    if !(0.0..=255.0).contains(&n) {
        return None;
    }
    Some(n.round() as u8)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 | 4 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Rgb {
                r: digit(0)?,
                g: digit(1)?,
                b: digit(2)?,
            })
        }
        6 | 8 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            })
        }
        _ => None,
    }
}

/// Lowercase `#rrggbb`, or `None` when the value is not a colour we understand.
pub fn normalize_color(value: &str) -> Option<String> {
    parse_color(value).map(|c| c.to_hex())
}

/// `"16px"` or a bare `"16"` → 16.0. Other units are not comparable.
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim().to_lowercase();
    let number = v.strip_suffix("px").unwrap_or(&v).trim();
    let parsed: f64 = number.parse().ok()?;
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

/// `"bold"` → 700, `"normal"` → 400, numeric strings as-is (1..=1000).
/// Relative keywords (`bolder`, `lighter`) have no absolute value.
pub fn parse_font_weight(value: &str) -> Option<f64> {
    let v = value.trim().to_lowercase();
    match v.as_str() {
        "normal" | "regular" => Some(400.0),
        "bold" => Some(700.0),
        _ => {
            let parsed: f64 = v.parse().ok()?;
            (1.0..=1000.0).contains(&parsed).then_some(parsed)
        }
    }
}

/// First family of a CSS font stack, unquoted: `"\"Inter\", sans-serif"` → `"Inter"`.
pub fn primary_font_family(value: &str) -> String {
    value
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Case-insensitive: either name contains the other. Empty names never match.
pub fn font_families_match(expected: &str, actual: &str) -> bool {
    let e = primary_font_family(expected).to_lowercase();
    let a = primary_font_family(actual).to_lowercase();
    if e.is_empty() || a.is_empty() {
        return false;
    }
    e.contains(&a) || a.contains(&e)
}

/// Format a numeric style value without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
