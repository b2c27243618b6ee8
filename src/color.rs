/// An RGBA color with components between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0., 0., 0., 1.);
    pub const WHITE: Color = Color::rgba(1., 1., 1., 1.);
    pub const TRANSPARENT: Color = Color::rgba(0., 0., 0., 0.);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// Multiplies the color channels (not alpha) by a factor.
    pub fn dimmed(self, factor: f64) -> Color {
        Color {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Returns the canonical key for this exact color value.
    pub fn key(&self) -> ColorKey {
        ColorKey([
            canonical_bits(self.r),
            canonical_bits(self.g),
            canonical_bits(self.b),
            canonical_bits(self.a),
        ])
    }
}

/// A hashable identity for a color value; equal colors have equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey([u64; 4]);

/// Bit pattern of a float with the two zeros and all NaNs folded together.
pub(crate) fn canonical_bits(value: f64) -> u64 {
    if value == 0. {
        0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

#[test]
fn test_color_key() {
    let red = Color::rgba(1., 0., 0., 1.);
    assert_eq!(red.key(), Color::rgba(1., 0., 0., 1.).key());
    assert_eq!(red.key(), Color::rgba(1., -0., 0., 1.).key());
    assert_ne!(red.key(), Color::rgba(0., 1., 0., 1.).key());
}
