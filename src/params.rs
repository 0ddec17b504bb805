// src/params.rs
//! User-tunable scene parameters
//!
//! A plain mutable record written by the debug panel and read every frame by
//! the celestial animator and the render engine. No validation happens here;
//! out-of-range values propagate into rendering as-is. The slider ranges the
//! panel declares are the only clamping in the system.

use std::f32::consts::PI;

/// Settings for the bloom post-processing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 2.1,
            radius: 0.8,
            threshold: 0.8,
        }
    }
}

/// The tunable scalars driving the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// Sun angle in radians. The panel binds it to [-PI, PI]; the animator
    /// accepts any real value and lets trigonometric periodicity handle
    /// wraparound.
    pub sun_angle: f32,
    /// Orbit radius of the sun and moon bodies.
    pub sun_distance: f32,
    /// Clear color of the frame, linear RGB.
    pub clear_color: [f32; 3],
    pub bloom: BloomSettings,
}

impl Parameters {
    /// Panel range for the sun angle slider.
    pub const SUN_ANGLE_RANGE: (f32, f32) = (-PI, PI);
    /// Panel range for the sun distance slider.
    pub const SUN_DISTANCE_RANGE: (f32, f32) = (0.0, 50.0);
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            sun_angle: -PI * 0.5,
            sun_distance: 10.0,
            // 0x001722, the night-teal backdrop
            clear_color: [0.0, 0.090, 0.133],
            bloom: BloomSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_setup() {
        let params = Parameters::default();
        assert_eq!(params.sun_angle, -PI * 0.5);
        assert_eq!(params.sun_distance, 10.0);
        assert!(params.bloom.enabled);
        assert_eq!(params.bloom.strength, 2.1);
        assert_eq!(params.bloom.radius, 0.8);
        assert_eq!(params.bloom.threshold, 0.8);
    }

    #[test]
    fn field_writes_read_back_identically() {
        // The panel mutates fields through plain &mut bindings; nothing in the
        // store itself may clamp or quantize.
        let mut params = Parameters::default();
        params.sun_angle = 2.0 * PI + 0.125;
        params.sun_distance = -3.0;
        params.bloom.strength = 9.75;
        assert_eq!(params.sun_angle, 2.0 * PI + 0.125);
        assert_eq!(params.sun_distance, -3.0);
        assert_eq!(params.bloom.strength, 9.75);
    }
}
