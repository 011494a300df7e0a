use crate::foundation::error::{PosterError, PosterResult};

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> PosterResult<Self> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| PosterError::theme(format!("color '{hex}' must start with '#'")))?;

        let parse = |s: &str| {
            u8::from_str_radix(s, 16)
                .map_err(|_| PosterError::theme(format!("invalid hex color '{hex}'")))
        };

        match digits.len() {
            3 => {
                let mut c = [0u8; 3];
                for (i, ch) in digits.chars().enumerate() {
                    let v = parse(&ch.to_string())?;
                    c[i] = v * 17; // expand nibble: f -> ff
                }
                Ok(Self::new(c[0], c[1], c[2], 255))
            }
            6 => Ok(Self::new(
                parse(&digits[0..2])?,
                parse(&digits[2..4])?,
                parse(&digits[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                parse(&digits[0..2])?,
                parse(&digits[2..4])?,
                parse(&digits[4..6])?,
                parse(&digits[6..8])?,
            )),
            _ => Err(PosterError::theme(format!(
                "color '{hex}' must have 3, 6, or 8 hex digits"
            ))),
        }
    }

    /// Scale the alpha channel by `factor` in `[0, 1]`.
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            a: ((f32::from(self.a) * factor).round() as i32).clamp(0, 255) as u8,
            ..self
        }
    }
}
