//! Shot resolution capability
//!
//! Controller держит `ShotKind` (component) и не знает конкретного варианта:
//! - Hitscan — попадание известно сразу
//! - Projectile — запуск полёта, попадание придёт из `ProjectileFlights`

use bevy::prelude::*;

use super::hitscan::{cast, spread_direction, HitResult, HitscanResolver};
use super::{LayerMask, SpatialQuery};
use crate::random::RandomSource;
use crate::weapon::{ShotDelivery, WeaponProfile};

/// Параметры запущенного projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub max_range: f32,
    pub layers: LayerMask,
    pub damage: u32,
}

/// Исход выстрела
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    /// Hit-scan: точка (попадание или max range) уже известна
    Resolved(HitResult),
    /// Projectile в полёте
    Launched(ProjectileLaunch),
}

impl ShotOutcome {
    /// Точка, куда летит tracer (для projectile — None, его ведёт flight)
    pub fn target_point(&self) -> Option<Vec3> {
        match self {
            ShotOutcome::Resolved(hit) => Some(hit.point),
            ShotOutcome::Launched(_) => None,
        }
    }

    /// Попадание (только hit-scan и только если во что-то попали)
    pub fn hit(&self) -> Option<&HitResult> {
        match self {
            ShotOutcome::Resolved(hit) if hit.hit_something => Some(hit),
            _ => None,
        }
    }

    pub fn direction(&self) -> Vec3 {
        match self {
            ShotOutcome::Resolved(hit) => hit.direction,
            ShotOutcome::Launched(launch) => launch.direction,
        }
    }
}

/// Capability: превратить (origin, direction) в исход выстрела
pub trait ShotResolver {
    fn resolve_shot(
        &self,
        origin: Vec3,
        direction: Vec3,
        profile: &WeaponProfile,
        spatial: &dyn SpatialQuery,
        rng: &mut dyn RandomSource,
    ) -> ShotOutcome;
}

impl ShotResolver for HitscanResolver {
    fn resolve_shot(
        &self,
        origin: Vec3,
        direction: Vec3,
        profile: &WeaponProfile,
        spatial: &dyn SpatialQuery,
        rng: &mut dyn RandomSource,
    ) -> ShotOutcome {
        let direction = spread_direction(direction, self.spread(profile.spread_angle), rng);
        ShotOutcome::Resolved(cast(
            origin,
            direction,
            profile.max_range,
            profile.target_layers,
            spatial,
        ))
    }
}

/// Projectile resolver: spread применяется при запуске, коллизии — в полёте
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectileResolver {
    pub spread_override: Option<f32>,
}

impl ShotResolver for ProjectileResolver {
    fn resolve_shot(
        &self,
        origin: Vec3,
        direction: Vec3,
        profile: &WeaponProfile,
        _spatial: &dyn SpatialQuery,
        rng: &mut dyn RandomSource,
    ) -> ShotOutcome {
        let spread = self.spread_override.unwrap_or(profile.spread_angle);
        ShotOutcome::Launched(ProjectileLaunch {
            origin,
            direction: spread_direction(direction, spread, rng),
            speed: profile.projectile_speed,
            max_range: profile.max_range,
            layers: profile.target_layers,
            damage: profile.damage,
        })
    }
}

/// Shot resolver экипированного оружия (component)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum ShotKind {
    Hitscan(HitscanResolver),
    Projectile(ProjectileResolver),
}

impl Default for ShotKind {
    fn default() -> Self {
        ShotKind::Hitscan(HitscanResolver::default())
    }
}

impl ShotKind {
    /// Resolver по `delivery` профиля (spread = из профиля)
    pub fn from_profile(profile: &WeaponProfile) -> Self {
        match profile.delivery {
            ShotDelivery::Hitscan => ShotKind::Hitscan(HitscanResolver::default()),
            ShotDelivery::Projectile => ShotKind::Projectile(ProjectileResolver::default()),
        }
    }
}

impl ShotResolver for ShotKind {
    fn resolve_shot(
        &self,
        origin: Vec3,
        direction: Vec3,
        profile: &WeaponProfile,
        spatial: &dyn SpatialQuery,
        rng: &mut dyn RandomSource,
    ) -> ShotOutcome {
        match self {
            ShotKind::Hitscan(resolver) => resolver.resolve_shot(origin, direction, profile, spatial, rng),
            ShotKind::Projectile(resolver) => resolver.resolve_shot(origin, direction, profile, spatial, rng),
        }
    }
}
