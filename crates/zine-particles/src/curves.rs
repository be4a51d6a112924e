//! Value-over-lifetime helpers, all in reference-frame time

use zine_core::Color;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two RGBA colors
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        lerp_f32(a.r, b.r, t),
        lerp_f32(a.g, b.g, t),
        lerp_f32(a.b, b.b, t),
        lerp_f32(a.a, b.a, t),
    )
}

/// Ramp 0 → 1 over the first `fade_in` of life, hold, then 1 → 0 over the
/// last `fade_out`. `t` is the life ratio.
pub fn fade_in_out(t: f32, fade_in: f32, fade_out: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let rise = if fade_in > 0.0 { t / fade_in } else { 1.0 };
    let fall = if fade_out > 0.0 { (1.0 - t) / fade_out } else { 1.0 };
    rise.min(fall).clamp(0.0, 1.0)
}

/// Per-call ease factor for a per-frame `ease` applied over `dt` frames
pub fn ease_over(ease: f32, dt: f32) -> f32 {
    let ease = ease.clamp(0.0, 1.0);
    1.0 - (1.0 - ease).powf(dt)
}

/// Per-frame multiplicative `factor` compounded over `dt` frames
pub fn damp(factor: f32, dt: f32) -> f32 {
    factor.powf(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_f32_endpoints() {
        assert!((lerp_f32(0.0, 10.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 1.0) - 10.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn lerp_color_midpoint() {
        let mid = lerp_color(Color::WHITE, Color::TRANSPARENT, 0.5);
        for c in mid.to_array() {
            assert!((c - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn fade_in_out_shape() {
        assert_eq!(fade_in_out(0.0, 0.2, 0.2), 0.0);
        assert!((fade_in_out(0.1, 0.2, 0.2) - 0.5).abs() < 1e-6);
        assert_eq!(fade_in_out(0.5, 0.2, 0.2), 1.0);
        assert_eq!(fade_in_out(1.0, 0.2, 0.2), 0.0);
    }

    #[test]
    fn ease_over_one_frame_is_the_ease() {
        assert!((ease_over(0.05, 1.0) - 0.05).abs() < 1e-6);
        // Two half-frames compound to the same displacement as one frame
        let half = ease_over(0.05, 0.5);
        let after_two = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((after_two - 0.05).abs() < 1e-6);
    }
}
