/*
 * Palette Module
 *
 * Color helpers for the renderer: blending between the two palette
 * endpoints and turning an HSL triple into an RGBA color. Conversions go
 * through nannou's color types; blending happens in linear light.
 */

use nannou::color::{hsl, rgba, Mix, Rgb, Rgba};

// Blend between two colors, t in [0, 1]; alpha is taken from a
#[inline]
pub fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let mixed = a.into_linear().mix(&b.into_linear(), t.clamp(0.0, 1.0));
    with_alpha(Rgba::from_linear(mixed), a.alpha)
}

#[inline]
pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    rgba(color.red, color.green, color.blue, alpha.clamp(0.0, 1.0))
}

// Hue in degrees (any range), saturation and lightness in [0, 1]
pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Rgba {
    // nannou takes the hue as a fraction of a full turn
    let turn = hue.rem_euclid(360.0) / 360.0;
    let color: Rgb = hsl(turn, saturation.clamp(0.0, 1.0), lightness.clamp(0.0, 1.0)).into();
    with_alpha(rgba(color.red, color.green, color.blue, 1.0), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{cyan, violet};

    fn close(a: Rgba, b: Rgba) -> bool {
        (a.red - b.red).abs() < 1e-4
            && (a.green - b.green).abs() < 1e-4
            && (a.blue - b.blue).abs() < 1e-4
            && (a.alpha - b.alpha).abs() < 1e-4
    }

    #[test]
    fn lerp_hits_endpoints() {
        assert!(close(lerp(cyan(), violet(), 0.0), cyan()));
        assert!(close(lerp(cyan(), violet(), 1.0), violet()));
    }

    #[test]
    fn lerp_midpoint_lies_between_endpoints() {
        let (a, b) = (cyan(), violet());
        let mid = lerp(a, b, 0.5);
        for (m, x, y) in [(mid.red, a.red, b.red), (mid.green, a.green, b.green), (mid.blue, a.blue, b.blue)] {
            assert!(m >= x.min(y) - 1e-5 && m <= x.max(y) + 1e-5);
        }
        assert_eq!(mid.alpha, a.alpha);
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsla(0.0, 1.0, 0.5, 1.0), rgba(1.0, 0.0, 0.0, 1.0)));
        assert!(close(hsla(120.0, 1.0, 0.5, 1.0), rgba(0.0, 1.0, 0.0, 1.0)));
        assert!(close(hsla(240.0, 1.0, 0.5, 0.5), rgba(0.0, 0.0, 1.0, 0.5)));
        assert!(close(hsla(360.0, 1.0, 0.5, 1.0), rgba(1.0, 0.0, 0.0, 1.0)));
        assert!(close(hsla(-120.0, 1.0, 0.5, 1.0), rgba(0.0, 0.0, 1.0, 1.0)));

        // No saturation: a neutral gray, whatever the hue
        let gray = hsla(200.0, 0.0, 0.25, 1.0);
        assert!((gray.red - gray.green).abs() < 1e-6 && (gray.green - gray.blue).abs() < 1e-6);
        assert!(gray.red > 0.0 && gray.red < 1.0);
    }
}
