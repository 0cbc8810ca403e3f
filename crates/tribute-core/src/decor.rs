//! Floating hearts on the revealed page.
//!
//! Planned once, at the moment of the reveal. Each heart flies from just
//! below the viewport to just above it at a fixed x, turning once, and
//! repeats forever; the rendering layer owns the looping.

use rand::Rng;
use tribute_types::AmbientHeart;

use crate::config::AmbientConfig;

/// Rotation of one flight, in degrees.
const FLIGHT_ROTATION_DEG: f64 = 360.0;

/// Plan the configured number of hearts.
///
/// Heart `i` starts after `i * stagger_s` seconds. Its x is uniform across
/// the viewport width and its flight duration is uniform in
/// `[duration_min_s, duration_max_s)`.
pub fn plan_hearts<R: Rng>(config: &AmbientConfig, rng: &mut R) -> Vec<AmbientHeart> {
    let spread = config.duration_max_s - config.duration_min_s;
    (0..config.hearts)
        .map(|index| AmbientHeart {
            x: rng.random::<f64>() * config.viewport.width,
            start_y: config.viewport.height + config.edge_margin,
            end_y: -config.edge_margin,
            rotation_deg: FLIGHT_ROTATION_DEG,
            duration_s: rng.random::<f64>().mul_add(spread, config.duration_min_s),
            delay_s: f64::from(index) * config.stagger_s,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use tribute_types::Viewport;

    use super::*;

    #[test]
    fn default_plan_matches_page_layout() {
        let config = AmbientConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let hearts = plan_hearts(&config, &mut rng);

        assert_eq!(hearts.len(), 4);
        for (index, heart) in hearts.iter().enumerate() {
            assert!((0.0..400.0).contains(&heart.x));
            assert!((heart.start_y - 850.0).abs() < f64::EPSILON);
            assert!((heart.end_y + 50.0).abs() < f64::EPSILON);
            assert!((10.0..14.0).contains(&heart.duration_s));
            let expected_delay = 3.0 * f64::from(u32::try_from(index).unwrap_or(0));
            assert!((heart.delay_s - expected_delay).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn hearts_follow_the_viewport() {
        let config = AmbientConfig {
            hearts: 2,
            viewport: Viewport {
                width: 1280.0,
                height: 720.0,
            },
            ..AmbientConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let hearts = plan_hearts(&config, &mut rng);
        assert_eq!(hearts.len(), 2);
        assert!(hearts.iter().all(|h| (0.0..1280.0).contains(&h.x)));
        assert!(hearts.iter().all(|h| (h.start_y - 770.0).abs() < f64::EPSILON));
    }

    #[test]
    fn zero_hearts_is_empty() {
        let config = AmbientConfig {
            hearts: 0,
            ..AmbientConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(plan_hearts(&config, &mut rng).is_empty());
    }
}
