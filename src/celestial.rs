// src/celestial.rs
//! Celestial lighting animation
//!
//! One angle parameter drives the whole day/night cycle: the sun and moon
//! mesh positions, both point lights, the ambient term, and the sky shader
//! uniform. The animator holds no per-frame state of its own, only the two
//! configuration constants (spin step and ambient scale); every target
//! quantity is recomputed from scratch on each invocation.
//!
//! The sun and moon stay antipodal by construction: the moon pose is the
//! negation of the sun pose. Intensity follows cos(angle) and is left
//! unclamped, so the "sun below the horizon" range subtracts light. That
//! matches the stylized look this scene is built around rather than any
//! photometric model.

use std::f32::consts::PI;

use crate::gfx::scene::registry::SceneRegistry;
use crate::params::Parameters;

/// Drives the registry's bodies, lights, and sky value from the parameters.
#[derive(Debug, Clone, Copy)]
pub struct CelestialAnimator {
    /// Roll step applied to the sun and moon meshes per invocation. This is
    /// per-call, not per-second: the spin rate is tied to the frame cadence.
    pub spin_step: f32,
    /// Scale applied to cos(angle) for the ambient intensity.
    pub ambient_scale: f32,
}

/// Moonlight does not follow the angle; it is a fixed fill.
pub const MOON_INTENSITY: f32 = 10.0;

impl Default for CelestialAnimator {
    fn default() -> Self {
        Self {
            spin_step: 0.01,
            ambient_scale: 0.45,
        }
    }
}

impl CelestialAnimator {
    /// Advances the celestial state by one frame.
    ///
    /// Skipped entirely while the registry is unpopulated - until the model
    /// load resolves, repeated invocations leave no observable mutation, not
    /// even the sky uniform. The angle is taken as-is; any real value is
    /// valid and periodicity handles wraparound.
    pub fn animate(&self, registry: &mut SceneRegistry, params: &Parameters) {
        let (Some(mut sun), Some(mut moon)) = (registry.sun, registry.moon) else {
            return;
        };

        let angle = params.sun_angle;
        let distance = params.sun_distance;

        sun.position.z = distance * angle.sin();
        sun.position.y = distance * angle.cos();
        sun.spin -= self.spin_step;

        moon.position = -sun.position;
        moon.spin -= self.spin_step;

        registry.sun_light.position = sun.position;
        registry.sun_light.intensity = angle.cos();

        registry.moon_light.position = moon.position;
        registry.moon_light.intensity = MOON_INTENSITY;

        registry.ambient.intensity = angle.cos() * self.ambient_scale;

        registry.sky_angle = angle / PI;

        registry.sun = Some(sun);
        registry.moon = Some(moon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::registry::{CelestialBody, SceneRegistry};
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn populated_registry() -> SceneRegistry {
        let mut registry = SceneRegistry::new();
        registry.sun = Some(CelestialBody::new());
        registry.moon = Some(CelestialBody::new());
        registry
    }

    fn params(angle: f32, distance: f32) -> Parameters {
        Parameters {
            sun_angle: angle,
            sun_distance: distance,
            ..Parameters::default()
        }
    }

    #[test]
    fn test_noop_before_population() {
        let animator = CelestialAnimator::default();
        let mut registry = SceneRegistry::new();
        let before_sun_light = registry.sun_light;
        let before_ambient = registry.ambient;
        let before_sky = registry.sky_angle;

        for _ in 0..32 {
            animator.animate(&mut registry, &params(1.0, 10.0));
        }

        assert_eq!(registry.sun_light, before_sun_light);
        assert_eq!(registry.ambient, before_ambient);
        assert_eq!(registry.sky_angle, before_sky);
        assert!(registry.sun.is_none());
        assert!(registry.moon.is_none());
    }

    #[test]
    fn test_noon_places_sun_overhead() {
        let animator = CelestialAnimator::default();
        let mut registry = populated_registry();

        animator.animate(&mut registry, &params(0.0, 7.5));

        let sun = registry.sun.unwrap();
        assert!((sun.position.y - 7.5).abs() < EPS);
        assert!(sun.position.z.abs() < EPS);
        assert!((registry.sun_light.intensity - 1.0).abs() < EPS);
    }

    #[test]
    fn test_sunset_scenario() {
        // distance 10, angle -pi/2: sun at z=-10 on the horizon, moon opposite
        let animator = CelestialAnimator::default();
        let mut registry = populated_registry();

        animator.animate(&mut registry, &params(-FRAC_PI_2, 10.0));

        let sun = registry.sun.unwrap();
        let moon = registry.moon.unwrap();
        assert!((sun.position.z + 10.0).abs() < EPS);
        assert!(sun.position.y.abs() < 1e-4);
        assert!((moon.position.z - 10.0).abs() < EPS);
        assert!(moon.position.y.abs() < 1e-4);
    }

    #[test]
    fn test_moon_is_antipodal_across_angles() {
        let animator = CelestialAnimator::default();

        for i in 0..64 {
            // Sweep well past the panel range; the animator must accept it.
            let angle = -4.0 * PI + i as f32 * 0.4;
            for distance in [0.0, 3.0, 10.0, 42.5] {
                let mut registry = populated_registry();
                animator.animate(&mut registry, &params(angle, distance));

                let sun = registry.sun.unwrap();
                let moon = registry.moon.unwrap();
                assert!((moon.position.x + sun.position.x).abs() < EPS);
                assert!((moon.position.y + sun.position.y).abs() < EPS);
                assert!((moon.position.z + sun.position.z).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_lights_track_bodies() {
        let animator = CelestialAnimator::default();
        let mut registry = populated_registry();

        animator.animate(&mut registry, &params(2.2, 12.0));

        assert_eq!(
            registry.sun_light.position,
            registry.sun.unwrap().position
        );
        assert_eq!(
            registry.moon_light.position,
            registry.moon.unwrap().position
        );
    }

    #[test]
    fn test_intensity_is_exact_cosine() {
        let animator = CelestialAnimator::default();

        for i in 0..48 {
            let angle = -PI + i as f32 * 0.13;
            let mut registry = populated_registry();
            animator.animate(&mut registry, &params(angle, 10.0));

            assert_eq!(registry.sun_light.intensity, angle.cos());
            assert_eq!(registry.moon_light.intensity, MOON_INTENSITY);
            assert_eq!(
                registry.ambient.intensity,
                angle.cos() * animator.ambient_scale
            );
        }
    }

    #[test]
    fn test_midnight_intensity_goes_negative() {
        // cos(pi) = -1 stays unclamped; the dark side subtracts light.
        let animator = CelestialAnimator::default();
        let mut registry = populated_registry();

        animator.animate(&mut registry, &params(PI, 10.0));

        assert!((registry.sun_light.intensity + 1.0).abs() < EPS);
        assert!(registry.ambient.intensity < 0.0);
    }

    #[test]
    fn test_sky_uniform_is_angle_over_pi() {
        let animator = CelestialAnimator::default();

        for angle in [-PI, -1.0, 0.0, 0.5, PI, 7.0] {
            let mut registry = populated_registry();
            animator.animate(&mut registry, &params(angle, 10.0));
            assert_eq!(registry.sky_angle, angle / PI);
        }
    }

    #[test]
    fn test_spin_decrements_per_invocation() {
        let animator = CelestialAnimator::default();
        let mut registry = populated_registry();
        let p = params(0.3, 10.0);

        for _ in 0..10 {
            animator.animate(&mut registry, &p);
        }

        let expected = -10.0 * animator.spin_step;
        assert!((registry.sun.unwrap().spin - expected).abs() < EPS);
        assert!((registry.moon.unwrap().spin - expected).abs() < EPS);
    }
}
