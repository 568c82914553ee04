//! Weapon events
//!
//! Architecture:
//! - Intents (host → simulation): FireIntent, ReloadIntent, EquipWeapon, UnequipWeapon
//! - Results (simulation → presentation): ShotFired, ShotHit, Reload*, CameraShakeImpulse
//!
//! Rejections (cooldown, reload в процессе) событий не порождают — поглощаются.

use bevy::prelude::*;

use super::WeaponProfile;
use crate::ballistics::ShotOutcome;

/// Intent: "fire pressed" (edge-triggered, один на нажатие)
#[derive(Event, Debug, Clone, Copy)]
pub struct FireIntent {
    pub shooter: Entity,
}

/// Intent: "reload pressed"
#[derive(Event, Debug, Clone, Copy)]
pub struct ReloadIntent {
    pub shooter: Entity,
}

/// Intent: экипировать оружие (заменяет текущее, in-flight reload отменяется)
#[derive(Event, Debug, Clone)]
pub struct EquipWeapon {
    pub shooter: Entity,
    pub profile: WeaponProfile,
}

/// Intent: убрать оружие из рук
#[derive(Event, Debug, Clone, Copy)]
pub struct UnequipWeapon {
    pub shooter: Entity,
}

/// Event: выстрел произошёл (после state gate + shot resolution)
///
/// Presentation layer рисует по нему muzzle flash/звук,
/// effects и recoil стадии pipeline реагируют на него же.
#[derive(Event, Debug, Clone)]
pub struct ShotFired {
    pub shooter: Entity,

    /// Мировая позиция дула (старт tracer)
    pub muzzle: Vec3,

    /// Ориентация камеры в момент выстрела
    pub aim_rotation: Quat,

    /// Направление после spread
    pub direction: Vec3,

    pub outcome: ShotOutcome,

    /// Скорость tracer / projectile (м/с)
    pub speed: f32,

    pub ammo_left: u32,
}

/// Event: попадание (hitscan сразу, projectile — при impact)
#[derive(Event, Debug, Clone, Copy)]
pub struct ShotHit {
    pub shooter: Entity,

    /// Collider, в который попали (None = статическая геометрия без entity)
    pub collider: Option<Entity>,

    pub damage: u32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Event: reload начат (вручную или auto-reload на пустом магазине)
#[derive(Event, Debug, Clone, Copy)]
pub struct ReloadStarted {
    pub shooter: Entity,
    pub completes_at: f64,
    /// true = запущен пустым магазином при попытке выстрела
    pub automatic: bool,
}

/// Event: reload завершён, магазин полон
#[derive(Event, Debug, Clone, Copy)]
pub struct ReloadCompleted {
    pub shooter: Entity,
    pub ammo: u32,
}

/// Event: camera shake impulse (камера — внешний collaborator)
#[derive(Event, Debug, Clone, Copy)]
pub struct CameraShakeImpulse {
    pub shooter: Entity,
    pub strength: f32,
}
