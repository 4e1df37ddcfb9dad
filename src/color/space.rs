//! Color space conversions and distance metrics.
//!
//! All metrics return squared distances; the square root never changes the
//! ordering of candidates, so it is skipped.

use super::Rgb;

/// D65 reference white point.
const REF_WHITE: (f64, f64, f64) = (0.95047, 1.00000, 1.08883);

/// sRGB channel to linear light.
fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB to CIE Lab via linear RGB and XYZ (D65).
pub fn rgb_to_lab(rgb: Rgb) -> (f64, f64, f64) {
    let red = linearize(rgb.r);
    let green = linearize(rgb.g);
    let blue = linearize(rgb.b);

    let x = red * 0.4124564 + green * 0.3575761 + blue * 0.1804375;
    let y = red * 0.2126729 + green * 0.7151522 + blue * 0.0721750;
    let z = red * 0.0193339 + green * 0.1191920 + blue * 0.9503041;

    let f = |t: f64| {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };

    let fx = f(x / REF_WHITE.0);
    let fy = f(y / REF_WHITE.1);
    let fz = f(z / REF_WHITE.2);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Squared Lab-space distance. The default perceptual metric.
pub fn lab_distance(a: Rgb, b: Rgb) -> f64 {
    let (la, aa, ba) = rgb_to_lab(a);
    let (lb, ab, bb) = rgb_to_lab(b);
    (la - lb).powi(2) + (aa - ab).powi(2) + (ba - bb).powi(2)
}

/// Squared raw RGB distance. Cheap alternate metric.
pub fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    dr * dr + dg * dg + db * db
}

fn rgb_to_hsl(rgb: Rgb) -> (f64, f64, f64) {
    let fr = rgb.r as f64 / 255.0;
    let fg = rgb.g as f64 / 255.0;
    let fb = rgb.b as f64 / 255.0;

    let max = fr.max(fg).max(fb);
    let min = fr.min(fg).min(fb);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let delta = max - min;
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let mut h = if max == fr {
        let mut h = (fg - fb) / delta;
        if fg < fb {
            h += 6.0;
        }
        h
    } else if max == fg {
        (fb - fr) / delta + 2.0
    } else {
        (fr - fg) / delta + 4.0
    };
    h *= 60.0;

    (h, s, l)
}

/// Squared HSL distance with hue wrap-around. Alternate metric.
pub fn hsl_distance(a: Rgb, b: Rgb) -> f64 {
    let (ha, sa, la) = rgb_to_hsl(a);
    let (hb, sb, lb) = rgb_to_hsl(b);

    let mut dh = (ha - hb).abs();
    if dh > 180.0 {
        dh = 360.0 - dh;
    }
    let ds = sa - sb;
    let dl = la - lb;
    dh * dh + ds * ds + dl * dl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_white_and_black() {
        let (l, a, b) = rgb_to_lab(Rgb::new(255, 255, 255));
        assert!((l - 100.0).abs() < 0.1);
        assert!(a.abs() < 0.1 && b.abs() < 0.1);

        let (l, _, _) = rgb_to_lab(Rgb::new(0, 0, 0));
        assert!(l.abs() < 0.1);
    }

    #[test]
    fn test_distance_is_zero_on_self() {
        let c = Rgb::new(12, 200, 77);
        assert_eq!(lab_distance(c, c), 0.0);
        assert_eq!(rgb_distance(c, c), 0.0);
        assert_eq!(hsl_distance(c, c), 0.0);
    }

    #[test]
    fn test_lab_prefers_near_white_for_white() {
        let white = Rgb::new(255, 255, 255);
        let near_white = Rgb::new(250, 250, 245);
        let near_black = Rgb::new(10, 10, 12);
        assert!(lab_distance(white, near_white) < lab_distance(white, near_black));
    }

    #[test]
    fn test_hsl_hue_wraps() {
        // Hue 350 and hue 10 are 20 degrees apart, not 340.
        let a = Rgb::new(255, 0, 42);
        let b = Rgb::new(255, 42, 0);
        assert!(hsl_distance(a, b) < 45.0 * 45.0);
    }
}
