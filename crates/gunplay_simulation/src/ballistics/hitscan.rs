//! Hit-scan resolution: spread cone + мгновенный ray cast
//!
//! Spread: два независимых uniform offset'а в `[-h, +h]` градусов,
//! поворот вокруг local X, затем local Y направления прицела, renormalize.
//! `h == 0` → направление возвращается без изменений (идеальный hit-scan).

use bevy::prelude::*;

use super::{LayerMask, SpatialQuery};
use crate::random::RandomSource;

/// Результат ray cast'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Точка попадания или synthetic endpoint на max range
    pub point: Vec3,
    /// Нормаль поверхности (при промахе = -direction)
    pub normal: Vec3,
    pub hit_something: bool,
    pub collider: Option<Entity>,
    /// Направление луча (после spread)
    pub direction: Vec3,
    pub distance: f32,
}

/// Ориентация, у которой -Z смотрит вдоль `direction` (up = +Y)
pub fn aim_basis(direction: Vec3) -> Quat {
    let back = -direction.normalize_or_zero();
    if back == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let up_hint = if back.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
    let right = up_hint.cross(back).normalize();
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}

/// Направление с учётом spread cone
pub fn spread_direction<R: RandomSource + ?Sized>(
    direction: Vec3,
    half_angle_degrees: f32,
    rng: &mut R,
) -> Vec3 {
    if half_angle_degrees <= 0.0 {
        return direction;
    }

    let around_x = rng.range(-half_angle_degrees, half_angle_degrees);
    let around_y = rng.range(-half_angle_degrees, half_angle_degrees);
    if around_x == 0.0 && around_y == 0.0 {
        return direction;
    }

    let local = Quat::from_rotation_y(around_y.to_radians()) * Quat::from_rotation_x(around_x.to_radians());
    (aim_basis(direction) * local * Vec3::NEG_Z).normalize()
}

/// Ray cast до первой преграды или до `max_range`
pub fn cast(
    origin: Vec3,
    direction: Vec3,
    max_range: f32,
    layers: LayerMask,
    spatial: &dyn SpatialQuery,
) -> HitResult {
    match spatial.raycast(origin, direction, max_range, layers) {
        Some(hit) => HitResult {
            point: hit.point,
            normal: hit.normal,
            hit_something: true,
            collider: hit.collider,
            direction,
            distance: hit.distance,
        },
        None => HitResult {
            point: origin + direction * max_range,
            normal: -direction,
            hit_something: false,
            collider: None,
            direction,
            distance: max_range,
        },
    }
}

/// Hit-scan resolver
///
/// `spread_override` = None → берётся `spread_angle` из профиля.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitscanResolver {
    pub spread_override: Option<f32>,
}

impl HitscanResolver {
    pub fn with_spread(spread: f32) -> Self {
        Self {
            spread_override: Some(spread),
        }
    }

    pub fn spread(&self, profile_spread: f32) -> f32 {
        self.spread_override.unwrap_or(profile_spread)
    }
}
