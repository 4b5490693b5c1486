//! Procedural star system for headless runs.
//!
//! Bodies orbit on circles around their parent. Parents always precede their
//! children in the body list, so one forward pass places everything.

use glam::DVec3;
use orrery_lod::{BodyCategory, EffectFlags, Renderable, RepresentationMode, RepresentationSlots};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Handle to a mesh or sprite owned by the host renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub u32);

/// Circular orbit around a parent body or the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    /// Index of the parent in the system's body list.
    pub parent: Option<usize>,
    pub radius: f64,
    /// Radians per second.
    pub angular_speed: f64,
    pub phase: f64,
    pub inclination: f64,
}

impl Orbit {
    /// Sits at the origin.
    pub const FIXED: Self = Self {
        parent: None,
        radius: 0.0,
        angular_speed: 0.0,
        phase: 0.0,
        inclination: 0.0,
    };

    fn offset(&self, t_s: f64) -> DVec3 {
        let (sin, cos) = (self.phase + self.angular_speed * t_s).sin_cos();
        let (tilt_sin, tilt_cos) = self.inclination.sin_cos();
        DVec3::new(
            cos * self.radius,
            sin * self.radius * tilt_sin,
            sin * self.radius * tilt_cos,
        )
    }
}

/// One celestial body with its four meshes and the effects it currently runs.
#[derive(Clone, Debug)]
pub struct Body {
    id: u32,
    tag: String,
    category: Option<BodyCategory>,
    orbit: Orbit,
    position: DVec3,
    slots: RepresentationSlots<AssetId>,
    effects: EffectFlags,
    effect_updates: u64,
}

impl Body {
    /// `tag` is the loader's category string; unknown tags render culled.
    pub fn new(id: u32, tag: &str, orbit: Orbit) -> Self {
        let asset = |slot: u32| AssetId(id.wrapping_mul(4).wrapping_add(slot));
        Self {
            id,
            tag: tag.to_string(),
            category: tag.parse().ok(),
            orbit,
            position: DVec3::ZERO,
            slots: RepresentationSlots::new(RepresentationMode::Full)
                .with(RepresentationMode::Full, asset(0))
                .with(RepresentationMode::Simplified, asset(1))
                .with(RepresentationMode::Billboard, asset(2))
                .with(RepresentationMode::PointOnly, asset(3)),
            effects: EffectFlags::NONE,
            effect_updates: 0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Overwritten by the next [`StarSystem::advance`].
    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    pub fn representation(&self) -> RepresentationMode {
        self.slots.active()
    }

    pub fn slots(&self) -> &RepresentationSlots<AssetId> {
        &self.slots
    }

    pub fn effects(&self) -> EffectFlags {
        self.effects
    }

    /// Effect refreshes run so far.
    pub fn effect_updates(&self) -> u64 {
        self.effect_updates
    }
}

impl Renderable for Body {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }

    fn category(&self) -> Option<BodyCategory> {
        self.category
    }

    fn world_position(&self) -> DVec3 {
        self.position
    }

    fn set_representation(&mut self, mode: RepresentationMode) {
        self.slots.activate(mode);
    }

    fn set_effect_flags(&mut self, flags: EffectFlags) {
        self.effects = flags;
    }

    fn run_effect_update(&mut self, _tick: u64) {
        self.effect_updates += 1;
    }
}

/// All bodies of one generated system.
#[derive(Clone, Debug, Default)]
pub struct StarSystem {
    bodies: Vec<Body>,
}

impl StarSystem {
    /// Build a system of roughly `count` bodies from `seed`.
    ///
    /// Always contains one star, at least one planet, a compact object and
    /// one body with an unrecognized tag; asteroids and comets fill the rest.
    pub fn generate(seed: u64, count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut system = Self::default();

        system.push("star", Orbit::FIXED);

        let planets = (count / 40).clamp(1, 8);
        for i in 0..planets {
            let radius = 1_500.0 * (i as f64 + 1.0).powf(1.6) + rng.random_range(0.0..400.0);
            let planet = system.push(
                "planet",
                Orbit {
                    parent: Some(0),
                    radius,
                    angular_speed: 40.0 / radius.powf(1.5),
                    phase: rng.random_range(0.0..std::f64::consts::TAU),
                    inclination: rng.random_range(-0.05..0.05),
                },
            );

            let min_moons = usize::from(i == 0);
            for _ in 0..rng.random_range(min_moons..4) {
                system.push(
                    "moon",
                    Orbit {
                        parent: Some(planet),
                        radius: rng.random_range(60.0..350.0),
                        angular_speed: rng.random_range(0.05..0.4),
                        phase: rng.random_range(0.0..std::f64::consts::TAU),
                        inclination: rng.random_range(-0.3..0.3),
                    },
                );
            }
        }

        system.push(
            "black_hole",
            Orbit {
                parent: Some(0),
                radius: 80_000.0,
                angular_speed: 1e-4,
                phase: 0.0,
                inclination: 0.2,
            },
        );
        system.push(
            "dust_cloud",
            Orbit {
                parent: Some(0),
                radius: 4_000.0,
                angular_speed: 0.0,
                phase: 1.0,
                inclination: 0.0,
            },
        );

        while system.bodies.len() < count {
            if rng.random_bool(0.1) {
                let radius = rng.random_range(15_000.0..60_000.0);
                system.push(
                    "comet",
                    Orbit {
                        parent: Some(0),
                        radius,
                        angular_speed: 20.0 / radius.powf(1.5),
                        phase: rng.random_range(0.0..std::f64::consts::TAU),
                        inclination: rng.random_range(-1.2..1.2),
                    },
                );
            } else {
                let radius = rng.random_range(7_000.0..11_000.0);
                system.push(
                    "asteroid",
                    Orbit {
                        parent: Some(0),
                        radius,
                        angular_speed: 40.0 / radius.powf(1.5),
                        phase: rng.random_range(0.0..std::f64::consts::TAU),
                        inclination: rng.random_range(-0.1..0.1),
                    },
                );
            }
        }

        system.advance(0.0);
        system
    }

    fn push(&mut self, tag: &str, orbit: Orbit) -> usize {
        let index = self.bodies.len();
        let id = u32::try_from(index).unwrap_or(u32::MAX);
        self.bodies.push(Body::new(id, tag, orbit));
        index
    }

    /// Place every body at simulation time `t_s`.
    pub fn advance(&mut self, t_s: f64) {
        for i in 0..self.bodies.len() {
            let orbit = self.bodies[i].orbit;
            let center = orbit
                .parent
                .filter(|&p| p < i)
                .map_or(DVec3::ZERO, |p| self.bodies[p].position);
            self.bodies[i].position = center + orbit.offset(t_s);
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Remove the body with `id`, returning it. Children keep orbiting the
    /// origin afterwards.
    pub fn remove(&mut self, id: u32) -> Option<Body> {
        let index = self.bodies.iter().position(|b| b.id == id)?;
        let body = self.bodies.remove(index);
        for other in &mut self.bodies[index..] {
            other.orbit.parent = match other.orbit.parent {
                Some(p) if p == index => None,
                Some(p) if p > index => Some(p - 1),
                parent => parent,
            };
        }
        Some(body)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Camera that sweeps in and out of the inner system.
pub fn camera_position(t_s: f64) -> DVec3 {
    let distance = 9_000.0 + 7_500.0 * (t_s * 0.05).sin();
    let (sin, cos) = (t_s * 0.02).sin_cos();
    DVec3::new(cos * distance, 600.0, sin * distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let a = StarSystem::generate(9, 200);
        let b = StarSystem::generate(9, 200);
        assert_eq!(a.len(), 200);
        for (x, y) in a.bodies().iter().zip(b.bodies()) {
            assert_eq!(x.tag(), y.tag());
            assert_eq!(x.position(), y.position());
        }
    }

    #[test]
    fn test_parents_precede_children() {
        let system = StarSystem::generate(3, 400);
        for (i, body) in system.bodies().iter().enumerate() {
            if let Some(parent) = body.orbit().parent {
                assert!(parent < i, "body {i} orbits later body {parent}");
            }
        }
    }

    #[test]
    fn test_every_category_and_one_unknown() {
        let system = StarSystem::generate(1, 300);
        for category in BodyCategory::ALL {
            assert!(
                system.bodies().iter().any(|b| b.category() == Some(category)),
                "no {category:?} generated"
            );
        }
        let unknown = system.bodies().iter().filter(|b| b.category().is_none()).count();
        assert_eq!(unknown, 1);
    }

    #[test]
    fn test_moons_follow_planets() {
        let mut system = StarSystem::generate(5, 300);
        system.advance(123.0);
        for body in system.bodies() {
            if body.category() == Some(BodyCategory::Moon) {
                let parent = &system.bodies()[body.orbit().parent.unwrap()];
                let distance = body.position().distance(parent.position());
                assert!((distance - body.orbit().radius).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_remove_reindexes_parents() {
        let mut system = StarSystem::generate(2, 100);
        let star = system.bodies()[0].id();
        assert!(system.remove(star).is_some());
        for (i, body) in system.bodies().iter().enumerate() {
            if let Some(parent) = body.orbit().parent {
                assert!(parent < i);
            }
        }
        assert!(system.remove(star).is_none());
    }

    #[test]
    fn test_large_ids_do_not_overflow_asset_handles() {
        let body = Body::new(u32::MAX, "moon", Orbit::FIXED);
        assert_eq!(body.slots().visible(), Some(&AssetId(u32::MAX.wrapping_mul(4))));
        assert_eq!(
            body.slots().get(RepresentationMode::PointOnly),
            Some(&AssetId(u32::MAX.wrapping_mul(4).wrapping_add(3)))
        );
    }

    #[test]
    fn test_fresh_body_shows_only_full_mesh() {
        let body = Body::new(7, "planet", Orbit::FIXED);
        assert_eq!(body.representation(), RepresentationMode::Full);
        assert_eq!(body.slots().visible(), Some(&AssetId(28)));
    }
}
