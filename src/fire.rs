//! CPU simulation of the campfire particles.
//!
//! Particles rise from a base point (the anchor) towards a drifting target just above the
//! flame's top, shrink as they climb and are recycled at the base once they pass the top.
//! The anchor follows the campfire light, so moving that light relights the fire in its new
//! spot.
//!
//! The random source is a type parameter so tests can seed it.

use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound on the particle count the control surface may request.
pub const MAX_PARTICLES: usize = 5000;

/// Frames longer than this skip integration entirely.
pub const MAX_STEP: f32 = 0.1;

/// Offset from the tracked light to the base of the flame.
pub const ANCHOR_OFFSET: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// Particle size at the very bottom of the flame, before scaling by `particle_size`.
const BASE_SIZE: f32 = 0.2;

/// A single flame particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FireParticle {
    pub position: [f32; 3],
    pub size: f32,
}

impl FireParticle {
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

/// Tunable shape and look of the fire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireSettings {
    pub particle_count: usize,
    pub particle_size: f32,
    pub speed: f32,
    pub height: f32,
    /// Half-width of the spawn box and of the drift range.
    pub width: f32,
    pub bottom_colour: Vec4,
    pub top_colour: Vec4,
    /// Seconds between new drift targets.
    pub direction_change_interval: f32,
}

impl Default for FireSettings {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            particle_size: 1.0,
            speed: 0.5,
            height: 3.0,
            width: 0.6,
            bottom_colour: Vec4::new(1.0, 0.2, 0.0, 1.0),
            top_colour: Vec4::new(1.0, 1.0, 0.0, 1.0),
            direction_change_interval: 0.5,
        }
    }
}

impl FireSettings {
    /// Clamps every field into the range the control surface exposes.
    pub fn clamped(mut self) -> Self {
        self.particle_count = self.particle_count.min(MAX_PARTICLES);
        self.particle_size = self.particle_size.clamp(0.0, 3.0);
        self.speed = self.speed.clamp(0.0, 1.5);
        self.height = self.height.clamp(0.0, 6.0);
        self.width = self.width.clamp(0.0, 3.0);
        self.direction_change_interval = self.direction_change_interval.max(0.01);
        self
    }
}

/// Owns and advances the particle set.
///
/// The simulator has no anchor until the first [`advance`](Self::advance) or
/// [`reset`](Self::reset); from then on every change of anchor respawns the whole fire.
///
/// # Example
/// ```
/// use lakefire::{FireSettings, FireSimulator, Vec3};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut fire = FireSimulator::with_rng(FireSettings::default(), StdRng::seed_from_u64(1));
/// let anchor = Vec3::new(-35.0, 0.0, -5.0);
///
/// for _ in 0..60 {
///     fire.advance(1.0 / 60.0, anchor);
/// }
///
/// assert_eq!(fire.particles().len(), 1000);
/// assert!(fire.particles().iter().all(|p| p.position[1] <= fire.max_height() + 1e-4));
/// ```
pub struct FireSimulator<R = StdRng> {
    particles: Vec<FireParticle>,
    settings: FireSettings,
    anchor: Option<Vec3>,
    drift: Vec2,
    drift_timer: f32,
    rng: R,
}

impl FireSimulator<StdRng> {
    /// Simulator seeded from the operating system.
    pub fn new(settings: FireSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> FireSimulator<R> {
    /// Simulator drawing its randomness from `rng`. Settings are clamped on the way in.
    pub fn with_rng(settings: FireSettings, rng: R) -> Self {
        Self {
            particles: Vec::new(),
            settings: settings.clamped(),
            anchor: None,
            drift: Vec2::ZERO,
            drift_timer: 0.0,
            rng,
        }
    }

    /// Current particles, ready for upload as instance data.
    pub fn particles(&self) -> &[FireParticle] {
        &self.particles
    }

    pub fn settings(&self) -> &FireSettings {
        &self.settings
    }

    /// Base of the flame, or `None` before the first spawn.
    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    /// Height particles spawn at.
    pub fn min_height(&self) -> f32 {
        self.anchor.map_or(0.0, |anchor| anchor.y)
    }

    /// Height above which particles are recycled.
    pub fn max_height(&self) -> f32 {
        self.min_height() + self.settings.height
    }

    /// Replaces the settings, clamped to the control ranges.
    ///
    /// A new particle count or height respawns the fire at its current anchor. Every other
    /// field takes effect on the next [`advance`](Self::advance) without disturbing the
    /// particles already in flight.
    pub fn configure(&mut self, settings: FireSettings) {
        let settings = settings.clamped();
        let relight = settings.particle_count != self.settings.particle_count
            || settings.height != self.settings.height;
        self.settings = settings;

        if relight {
            self.restart();
        }
    }

    /// Respawns every particle at the current anchor.
    pub fn restart(&mut self) {
        if let Some(anchor) = self.anchor {
            let FireSettings {
                particle_count,
                width,
                height,
                ..
            } = self.settings;
            self.reset(particle_count, anchor, width, height);
        }
    }

    /// Discards all particles and spawns `count` new ones in the box above `anchor`.
    ///
    /// The box is `width` either side of the anchor in x and z and `height` tall. `count`,
    /// `width` and `height` are clamped like [`FireSettings`] and then adopted as the current
    /// settings, so later steps recycle particles at the same top the spawn used.
    pub fn reset(&mut self, count: usize, anchor: Vec3, width: f32, height: f32) {
        self.settings = FireSettings {
            particle_count: count,
            width,
            height,
            ..self.settings
        }
        .clamped();
        let FireSettings {
            particle_count: count,
            width,
            height,
            particle_size: size,
            ..
        } = self.settings;
        self.anchor = Some(anchor);

        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let offset = Vec3::new(
                spread(&mut self.rng, width),
                unit(&mut self.rng) * height,
                spread(&mut self.rng, width),
            );
            self.particles.push(FireParticle {
                position: (anchor + offset).into(),
                size,
            });
        }
    }

    /// Steps the simulation by `dt` seconds with the flame based at `anchor`.
    ///
    /// 1. An anchor that differs from the last one on any axis respawns the fire there.
    /// 2. Every [`direction_change_interval`](FireSettings::direction_change_interval) seconds
    ///    a new drift target is picked within `width` of the anchor.
    /// 3. Each particle moves a `dt * speed` fraction of the way towards the target, a point
    ///    one unit above the flame's top. Steps of [`MAX_STEP`] or longer skip this move.
    /// 4. Particles above the top restart at the base, and sizes taper linearly to zero at
    ///    the top.
    pub fn advance(&mut self, dt: f32, anchor: Vec3) {
        if self.anchor != Some(anchor) {
            let FireSettings {
                particle_count,
                width,
                height,
                ..
            } = self.settings;
            self.reset(particle_count, anchor, width, height);
        }

        self.drift_timer += dt;
        if self.drift_timer > self.settings.direction_change_interval {
            self.drift_timer -= self.settings.direction_change_interval;
            self.drift = Vec2::new(
                spread(&mut self.rng, self.settings.width),
                spread(&mut self.rng, self.settings.width),
            );
        }

        let min_height = anchor.y;
        let max_height = self.max_height();
        let target = Vec3::new(
            anchor.x + self.drift.x,
            max_height + 1.0,
            anchor.z + self.drift.y,
        );
        let step = dt * self.settings.speed;
        let integrate = dt < MAX_STEP;

        for particle in &mut self.particles {
            let mut position = particle.position();

            if integrate {
                position += (target - position) * step;
            }

            if position.y > max_height {
                position = Vec3::new(
                    anchor.x + spread(&mut self.rng, self.settings.width),
                    min_height,
                    anchor.z + spread(&mut self.rng, self.settings.width),
                );
            }

            particle.position = position.into();
            particle.size = taper(position.y, min_height, max_height) * self.settings.particle_size;
        }
    }
}

/// Size factor that falls from [`BASE_SIZE`] at the base to zero at the top.
fn taper(y: f32, min_height: f32, max_height: f32) -> f32 {
    let span = min_height - max_height;
    if span.abs() <= f32::EPSILON {
        return 0.0;
    }
    let t = ((y - max_height) / span).clamp(0.0, 1.0);
    BASE_SIZE * t
}

fn unit<R: Rng>(rng: &mut R) -> f32 {
    rng.r#gen::<f32>()
}

/// Uniform sample in `[-half_width, half_width)`; zero width yields zero.
fn spread<R: Rng>(rng: &mut R, half_width: f32) -> f32 {
    unit(rng) * 2.0 * half_width - half_width
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: Vec3 = Vec3::new(-35.0, 0.0, -5.0);

    fn seeded(settings: FireSettings) -> FireSimulator<StdRng> {
        FireSimulator::with_rng(settings, StdRng::seed_from_u64(7))
    }

    fn assert_in_spawn_box(sim: &FireSimulator<StdRng>, anchor: Vec3) {
        let FireSettings { width, height, .. } = *sim.settings();
        for particle in sim.particles() {
            let p = particle.position();
            assert!((p.x - anchor.x).abs() <= width + 1e-4, "x out of box: {p}");
            assert!((p.z - anchor.z).abs() <= width + 1e-4, "z out of box: {p}");
            assert!(p.y >= anchor.y && p.y <= anchor.y + height, "y out of box: {p}");
        }
    }

    #[test]
    fn reset_spawns_exact_count_inside_box() {
        let mut sim = seeded(FireSettings::default());
        for count in [0, 1, 17, 1000, MAX_PARTICLES] {
            sim.reset(count, ANCHOR, 0.6, 3.0);
            assert_eq!(sim.particles().len(), count);
            assert_in_spawn_box(&sim, ANCHOR);
        }
    }

    #[test]
    fn zero_dt_is_idempotent() {
        let mut sim = seeded(FireSettings::default());
        sim.advance(0.0, ANCHOR);
        let first = sim.particles().to_vec();

        for _ in 0..10 {
            sim.advance(0.0, ANCHOR);
        }

        let positions = |ps: &[FireParticle]| ps.iter().map(|p| p.position).collect::<Vec<_>>();
        assert_eq!(positions(sim.particles()), positions(&first));
    }

    #[test]
    fn heights_stay_within_flame_over_many_steps() {
        let mut sim = seeded(FireSettings {
            speed: 1.5,
            ..FireSettings::default()
        });
        for frame in 0..600 {
            let dt = if frame % 97 == 0 { 0.5 } else { 1.0 / 60.0 };
            sim.advance(dt, ANCHOR);

            let (min, max) = (sim.min_height(), sim.max_height());
            for particle in sim.particles() {
                assert!(particle.position[1] >= min);
                assert!(particle.position[1] <= max + 1e-4);
            }
        }
    }

    #[test]
    fn moving_anchor_relights_fire_at_new_spot() {
        let mut sim = seeded(FireSettings::default());
        for _ in 0..30 {
            sim.advance(1.0 / 60.0, ANCHOR);
        }

        let moved = ANCHOR + Vec3::new(5.0, 2.0, 0.0);
        sim.advance(0.0, moved);

        assert_eq!(sim.anchor(), Some(moved));
        assert_eq!(sim.particles().len(), 1000);
        assert_in_spawn_box(&sim, moved);
    }

    #[test]
    fn large_dt_skips_integration() {
        let mut sim = seeded(FireSettings::default());
        sim.advance(0.0, ANCHOR);
        let before: Vec<f32> = sim.particles().iter().map(|p| p.position[1]).collect();

        sim.advance(0.25, ANCHOR);

        let after: Vec<f32> = sim.particles().iter().map(|p| p.position[1]).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn particles_rise_under_normal_steps() {
        let mut sim = seeded(FireSettings::default());
        sim.reset(1, ANCHOR, 0.0, 3.0);
        let before = sim.particles()[0].position[1];
        sim.advance(1.0 / 60.0, ANCHOR);

        assert!(sim.particles()[0].position[1] > before);
    }

    #[test]
    fn reset_box_becomes_the_recycle_bound() {
        let mut sim = seeded(FireSettings::default());
        sim.reset(200, ANCHOR, 1.0, 5.0);

        assert_eq!(sim.settings().height, 5.0);
        assert_eq!(sim.settings().width, 1.0);
        assert_eq!(sim.settings().particle_count, 200);
        assert_eq!(sim.max_height(), ANCHOR.y + 5.0);

        let tallest = sim
            .particles()
            .iter()
            .map(|p| p.position[1])
            .fold(f32::MIN, f32::max);
        sim.advance(0.0, ANCHOR);
        let still_tallest = sim
            .particles()
            .iter()
            .map(|p| p.position[1])
            .fold(f32::MIN, f32::max);
        assert_eq!(tallest, still_tallest);
    }

    #[test]
    fn reset_clamps_like_settings() {
        let mut sim = seeded(FireSettings::default());
        sim.reset(MAX_PARTICLES + 10, ANCHOR, 9.0, 9.0);

        assert_eq!(sim.particles().len(), MAX_PARTICLES);
        assert_eq!(sim.settings().width, 3.0);
        assert_eq!(sim.max_height(), ANCHOR.y + 6.0);
    }

    #[test]
    fn particles_shrink_towards_the_top() {
        assert_eq!(taper(0.0, 0.0, 3.0), BASE_SIZE);
        assert_eq!(taper(3.0, 0.0, 3.0), 0.0);
        assert!(taper(1.0, 0.0, 3.0) > taper(2.0, 0.0, 3.0));
    }

    #[test]
    fn zero_height_fire_degrades_to_invisible() {
        let mut sim = seeded(FireSettings {
            height: 0.0,
            width: 0.0,
            ..FireSettings::default()
        });
        for _ in 0..5 {
            sim.advance(1.0 / 60.0, ANCHOR);
        }

        assert!(sim.particles().iter().all(|p| p.size == 0.0));
    }

    #[test]
    fn changing_count_or_height_relights() {
        let mut sim = seeded(FireSettings::default());
        sim.advance(0.0, ANCHOR);

        sim.configure(FireSettings {
            particle_count: 10,
            ..*sim.settings()
        });
        assert_eq!(sim.particles().len(), 10);

        sim.configure(FireSettings {
            height: 5.0,
            ..*sim.settings()
        });
        assert_in_spawn_box(&sim, ANCHOR);
        assert_eq!(sim.max_height(), ANCHOR.y + 5.0);
    }

    #[test]
    fn width_change_keeps_particles() {
        let mut sim = seeded(FireSettings::default());
        sim.advance(0.0, ANCHOR);
        let before = sim.particles().to_vec();

        sim.configure(FireSettings {
            width: 2.0,
            ..*sim.settings()
        });

        assert_eq!(sim.particles(), before.as_slice());
    }

    #[test]
    fn settings_are_clamped_to_control_ranges() {
        let sim = seeded(FireSettings {
            particle_count: 9000,
            speed: 10.0,
            ..FireSettings::default()
        });
        assert_eq!(sim.settings().particle_count, MAX_PARTICLES);
        assert_eq!(sim.settings().speed, 1.5);
    }
}
