//! Recoil feedback loop (camera kick + return)
//!
//! Two-stage lerp каждый tick:
//! 1. `current = lerp(current, target, dt × kick_speed)` — snap к target
//! 2. `target = lerp(target, 0, dt × return_speed)` — плавный возврат
//!
//! Оси (градусы): x = vertical (pitch вверх), y = horizontal (yaw).
//! Lerp factor clamp'ится в [0, 1] — большой dt не даёт overshoot.

pub mod view_sway;

pub use view_sway::*;

use bevy::prelude::*;

use crate::random::RandomSource;
use crate::weapon::{RecoilClamp, RecoilKick, WeaponProfile};

/// Доля вертикального kick, ниже которой random не опускается
pub const MIN_VERTICAL_KICK_FRACTION: f32 = 0.8;

/// Rotation для камеры (композируется с базовым aim внешним collaborator'ом)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecoilRotation {
    /// Градусы, отрицательный = вверх (как `-current.vertical`)
    pub pitch: f32,
    /// Градусы
    pub yaw: f32,
}

impl RecoilRotation {
    pub fn as_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }
}

/// Recoil state (per weapon-camera pair)
///
/// Инвариант: |target| и |current| по каждой оси ≤ clamp.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct RecoilState {
    current: Vec2,
    target: Vec2,
}

impl RecoilState {
    pub fn current(&self) -> Vec2 {
        self.current
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Kick от выстрела профиля
    pub fn kick<R: RandomSource + ?Sized>(&mut self, profile: &WeaponProfile, rng: &mut R) -> Vec2 {
        self.kick_with(profile.recoil_kick, profile.recoil_clamp, rng)
    }

    /// Kick: vertical ∈ [0.8·kv, kv], horizontal ∈ [-kh, kh], затем clamp target
    pub fn kick_with<R: RandomSource + ?Sized>(
        &mut self,
        kick: RecoilKick,
        clamp: RecoilClamp,
        rng: &mut R,
    ) -> Vec2 {
        let vertical = rng.range(kick.vertical * MIN_VERTICAL_KICK_FRACTION, kick.vertical);
        let horizontal = rng.range(-kick.horizontal, kick.horizontal);
        let impulse = Vec2::new(vertical, horizontal);

        let bound = Vec2::new(clamp.vertical, clamp.horizontal);
        self.target = (self.target + impulse).clamp(-bound, bound);

        impulse
    }

    /// Per-frame decay
    pub fn tick(&mut self, dt: f32, kick_speed: f32, return_speed: f32) {
        let chase = (dt * kick_speed).clamp(0.0, 1.0);
        let settle = (dt * return_speed).clamp(0.0, 1.0);

        self.current = self.current.lerp(self.target, chase);
        self.target = self.target.lerp(Vec2::ZERO, settle);
    }

    pub fn tick_profile(&mut self, dt: f32, profile: &WeaponProfile) {
        self.tick(dt, profile.recoil_kick_speed, profile.recoil_return_speed);
    }

    pub fn rotation(&self) -> RecoilRotation {
        RecoilRotation {
            pitch: -self.current.x,
            yaw: self.current.y,
        }
    }

    /// Сброс (equip нового оружия)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
