//! Weapon controller — tick pipeline поверх ECS
//!
//! ECS ответственность:
//! - WeaponState / RecoilState на shooter entity (камера)
//! - EffectPools, TracerFlights, ProjectileFlights, TaskScheduler (resources)
//! - Events: intents на вход, ShotFired / ShotHit / Reload* на выход
//!
//! Presentation ответственность (внешний collaborator):
//! - Рендер эффектов по содержимому пулов
//! - Композиция RecoilRotation с базовым aim камеры
//! - CameraShakeImpulse → camera shake

use bevy::prelude::*;

pub mod components;
pub mod systems;

#[cfg(test)]
mod systems_tests;

pub use components::*;
pub use systems::*;

use crate::ballistics::{ProjectileFlights, SpatialQueryBackend};
use crate::effects::{EffectConfig, EffectPools, TracerFlights};
use crate::random::DeterministicRng;
use crate::tasks::TaskScheduler;
use crate::weapon::{
    CameraShakeImpulse, EquipWeapon, FireIntent, ReloadCompleted, ReloadIntent, ReloadStarted, ShotFired, ShotHit,
    UnequipWeapon,
};

/// Seed по умолчанию, если host не вставил свой DeterministicRng
pub const DEFAULT_SEED: u64 = 42;

/// Стадии weapon pipeline (выполняются строго по порядку в FixedUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponPipeline {
    /// Intents → TriggerState, equip / unequip
    Input,
    /// Timed tasks, WeaponState transitions, shot resolution
    State,
    /// Pooled FX, tracer / projectile motion
    Effects,
    /// Recoil kick + decay, view sway
    Recoil,
}

/// Gunplay Plugin
///
/// Регистрирует weapon pipeline в FixedUpdate.
///
/// Порядок выполнения:
/// 1. Input — equip/unequip (отмена reload), intents → TriggerState
/// 2. State — timed tasks (reload complete, effect release), reload → fire
/// 3. Effects — muzzle flash, hit FX, tracer / projectile flights
/// 4. Recoil — kick на ShotFired, camera shake, decay, view sway
///
/// Resources вставленные host'ом до plugin'а (EffectPools, SpatialQueryBackend,
/// DeterministicRng) не перезаписываются.
pub struct GunplayPlugin;

impl Plugin for GunplayPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<FireIntent>()
            .add_event::<ReloadIntent>()
            .add_event::<EquipWeapon>()
            .add_event::<UnequipWeapon>()
            .add_event::<ShotFired>()
            .add_event::<ShotHit>()
            .add_event::<ReloadStarted>()
            .add_event::<ReloadCompleted>()
            .add_event::<CameraShakeImpulse>();

        // Resources
        app.init_resource::<EffectConfig>();
        if !app.world().contains_resource::<EffectPools>() {
            let config = app.world().resource::<EffectConfig>().clone();
            app.insert_resource(EffectPools::new(config));
        }
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(DEFAULT_SEED));
        }
        app.init_resource::<TaskScheduler>()
            .init_resource::<TracerFlights>()
            .init_resource::<ProjectileFlights>()
            .init_resource::<SpatialQueryBackend>();

        app.configure_sets(
            FixedUpdate,
            (
                WeaponPipeline::Input,
                WeaponPipeline::State,
                WeaponPipeline::Effects,
                WeaponPipeline::Recoil,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Input (equip первым — новые components видны сбору input)
                (apply_weapon_equips, collect_weapon_input)
                    .chain()
                    .in_set(WeaponPipeline::Input),

                // Фаза 2: State (tasks до триггеров — reload, завершившийся
                // в этот tick, разрешает выстрел в этот же tick)
                (run_timed_tasks, process_weapon_triggers)
                    .chain()
                    .in_set(WeaponPipeline::State),

                // Фаза 3: Effects
                (spawn_shot_effects, advance_tracers, advance_projectiles)
                    .chain()
                    .in_set(WeaponPipeline::Effects),

                // Фаза 4: Recoil
                (apply_recoil_kicks, decay_recoil, update_view_sway)
                    .chain()
                    .in_set(WeaponPipeline::Recoil),
            ),
        );
    }
}
