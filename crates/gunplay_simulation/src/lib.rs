//! Gunplay Simulation Core
//!
//! Headless ECS-симуляция FPS gunplay на Bevy 0.16:
//! - weapon: профили (RON), fire/reload state machine, events
//! - ballistics: hit-scan со spread cone, projectile полёты, spatial query
//! - recoil: camera kick + two-stage decay, weapon-view sway
//! - effects: pooled bullet holes / particles / tracers / muzzle flashes
//! - controller: tick pipeline Input → State → Effects → Recoil
//!
//! Рендер, звук, locomotion — внешние collaborators: симуляция только
//! выставляет state (components, resources, events).

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

// Публичные модули
pub mod ballistics;
pub mod controller;
pub mod effects;
pub mod logger;
pub mod random;
pub mod recoil;
pub mod tasks;
pub mod weapon;

// Re-export основных типов
pub use ballistics::{
    HitResult, LayerMask, ShotKind, ShotOutcome, ShotResolver, SpatialQuery, SpatialQueryBackend, StaticColliders,
};
pub use controller::{
    equip_firearm, firearm_bundle, unequip_firearm, GunplayPlugin, Muzzle, TriggerState, WeaponPipeline,
};
pub use effects::{EffectConfig, EffectHandle, EffectKind, EffectPools, TracerFlights};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use random::{DeterministicRng, RandomSource, ScriptedRandom};
pub use recoil::{RecoilRotation, RecoilState, ViewInput, ViewSway};
pub use tasks::{TaskScheduler, TimedTask};
pub use weapon::{
    CameraShakeImpulse, EquipWeapon, FireIntent, FireOutcome, ProfileError, ReloadCompleted, ReloadIntent,
    ReloadOutcome, ReloadStarted, ShotFired, ShotHit, UnequipWeapon, WeaponCatalog, WeaponProfile, WeaponState,
};

/// Частота simulation tick (FixedUpdate)
pub const TICK_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .add_plugins(GunplayPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает ровно на один fixed tick за `app.update()` (не wall clock),
/// поэтому прогон с одним seed воспроизводим.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ)) // 60Hz FixedUpdate
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / TICK_HZ)));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
