//! Visual effects domain
//!
//! - pool: growable pools + auto-release (EffectPools resource)
//! - placement: decal / particle placement на поверхности
//! - tracer: движение tracer'ов от muzzle к цели

pub mod placement;
pub mod pool;
pub mod tracer;

pub use placement::*;
pub use pool::*;
pub use tracer::*;

use bevy::prelude::*;

use crate::ballistics::HitResult;
use crate::tasks::TaskScheduler;

/// Настройки эффектов (resource)
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EffectConfig {
    /// Secs до auto-release
    pub hole_lifetime: f32,
    pub particle_lifetime: f32,
    pub tracer_lifetime: f32,
    pub muzzle_flash_lifetime: f32,

    /// Entries, создаваемые при старте
    pub hole_prewarm: usize,
    pub particle_prewarm: usize,
    pub tracer_prewarm: usize,
    pub muzzle_flash_prewarm: usize,

    /// Decal поднимается над поверхностью (z-fighting)
    pub decal_offset: f32,
    /// Tracer считается долетевшим
    pub arrival_epsilon: f32,
    /// Длина trail (secs)
    pub trail_time: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            hole_lifetime: 5.0,
            particle_lifetime: 2.0,
            tracer_lifetime: 2.0,
            muzzle_flash_lifetime: 0.05,
            hole_prewarm: 30,
            particle_prewarm: 30,
            tracer_prewarm: 20,
            muzzle_flash_prewarm: 4,
            decal_offset: 0.01,
            arrival_epsilon: 0.05,
            trail_time: 0.1,
        }
    }
}

impl EffectConfig {
    pub fn lifetime(&self, kind: EffectKind) -> f32 {
        match kind {
            EffectKind::BulletHole => self.hole_lifetime,
            EffectKind::HitParticle => self.particle_lifetime,
            EffectKind::Tracer => self.tracer_lifetime,
            EffectKind::MuzzleFlash => self.muzzle_flash_lifetime,
        }
    }

    pub fn prewarm(&self, kind: EffectKind) -> usize {
        match kind {
            EffectKind::BulletHole => self.hole_prewarm,
            EffectKind::HitParticle => self.particle_prewarm,
            EffectKind::Tracer => self.tracer_prewarm,
            EffectKind::MuzzleFlash => self.muzzle_flash_prewarm,
        }
    }
}

impl EffectPools {
    /// Bullet hole + particle burst в точке попадания
    pub fn spawn_impact(
        &mut self,
        hit: &HitResult,
        now: f64,
        tasks: &mut TaskScheduler,
    ) -> (EffectHandle, EffectHandle) {
        let offset = self.config().decal_offset;
        let hole = self.spawn(EffectKind::BulletHole, decal_placement(hit, offset), now, tasks);
        let burst = self.spawn(EffectKind::HitParticle, burst_placement(hit), now, tasks);
        (hole, burst)
    }
}
