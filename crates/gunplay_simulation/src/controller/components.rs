//! Shooter components (camera-side данные weapon controller'а)

use bevy::prelude::*;

use crate::ballistics::ShotKind;
use crate::recoil::RecoilState;
use crate::tasks::TaskScheduler;
use crate::weapon::{WeaponProfile, WeaponState};

/// Смещение дула относительно камеры (local space shooter Transform)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Muzzle {
    pub offset: Vec3,
}

impl Default for Muzzle {
    fn default() -> Self {
        // Правая рука, чуть ниже и впереди камеры
        Self {
            offset: Vec3::new(0.15, -0.12, -0.45),
        }
    }
}

impl Muzzle {
    pub fn world_position(&self, camera: &Transform) -> Vec3 {
        camera.transform_point(self.offset)
    }
}

/// Накопленный за tick input (заполняет Input стадия, сбрасывает State)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerState {
    pub fire: bool,
    pub reload: bool,
}

impl TriggerState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Всё, что появляется на shooter при equip
///
/// WeaponState создаётся из профиля (полный магазин), recoil с нуля.
pub fn firearm_bundle(profile: WeaponProfile) -> impl Bundle {
    (
        WeaponState::new(&profile),
        RecoilState::default(),
        ShotKind::from_profile(&profile),
        TriggerState::default(),
        profile,
    )
}

/// Equip: in-flight reload текущего оружия отменяется, затем bundle заменяется
///
/// Общий путь для `EquipWeapon` и прямых вызовов (editor, scripted сцены).
pub fn equip_firearm(
    commands: &mut Commands,
    tasks: &mut TaskScheduler,
    shooter: Entity,
    current: Option<&mut WeaponState>,
    profile: WeaponProfile,
) {
    if let Some(state) = current {
        state.cancel_reload(tasks);
    }

    if let Ok(mut entity_commands) = commands.get_entity(shooter) {
        crate::logger::log(&format!("🔫 Equip {} → {:?}", profile.name, shooter));
        entity_commands.insert(firearm_bundle(profile));
    }
}

/// Unequip: отмена reload + снятие weapon components (Muzzle и Transform остаются)
pub fn unequip_firearm(commands: &mut Commands, tasks: &mut TaskScheduler, shooter: Entity, current: &mut WeaponState) {
    current.cancel_reload(tasks);

    if let Ok(mut entity_commands) = commands.get_entity(shooter) {
        crate::logger::log(&format!("Unequip weapon ← {:?}", shooter));
        entity_commands.remove::<(WeaponProfile, WeaponState, RecoilState, ShotKind, TriggerState)>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muzzle_follows_camera() {
        let muzzle = Muzzle {
            offset: Vec3::new(0.0, 0.0, -1.0),
        };

        let camera = Transform::from_xyz(1.0, 2.0, 3.0);
        assert_eq!(muzzle.world_position(&camera), Vec3::new(1.0, 2.0, 2.0));

        // Камера повёрнута на 90° влево → дуло смотрит в -X
        let turned = Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let position = muzzle.world_position(&turned);
        assert!((position - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_firearm_bundle_starts_full() {
        let mut world = World::new();
        let shooter = world.spawn(firearm_bundle(WeaponProfile::rifle())).id();

        let state = world.get::<WeaponState>(shooter).unwrap();
        assert_eq!(state.current_ammo(), WeaponProfile::rifle().magazine_size);
        assert!(!state.is_reloading());
        assert_eq!(world.get::<TriggerState>(shooter), Some(&TriggerState::default()));
        assert!(matches!(world.get::<ShotKind>(shooter), Some(ShotKind::Hitscan(_))));
    }

    #[test]
    fn test_equip_firearm_drops_pending_reload() {
        let pistol = WeaponProfile::pistol();
        let mut world = World::new();
        let mut tasks = TaskScheduler::new();
        let shooter = world.spawn(Transform::default()).id();

        let mut state = WeaponState::new(&pistol);
        state.try_fire(0.0, &pistol, shooter, &mut tasks);
        state.try_reload(0.1, &pistol, shooter, &mut tasks);
        assert!(state.is_reloading());
        assert_eq!(tasks.len(), 1);

        {
            let mut commands = world.commands();
            equip_firearm(&mut commands, &mut tasks, shooter, Some(&mut state), WeaponProfile::rifle());
        }
        world.flush();

        assert!(tasks.is_empty());
        assert!(!state.is_reloading());
        let equipped = world.get::<WeaponState>(shooter).unwrap();
        assert_eq!(equipped.current_ammo(), WeaponProfile::rifle().magazine_size);
        assert_eq!(world.get::<WeaponProfile>(shooter).unwrap().name, "Rifle");
    }

    #[test]
    fn test_unequip_firearm_drops_pending_reload() {
        let pistol = WeaponProfile::pistol();
        let mut world = World::new();
        let mut tasks = TaskScheduler::new();
        let shooter = world.spawn((Transform::default(), Muzzle::default(), firearm_bundle(pistol.clone()))).id();

        let mut state = WeaponState::new(&pistol);
        state.try_fire(0.0, &pistol, shooter, &mut tasks);
        state.try_reload(0.1, &pistol, shooter, &mut tasks);

        {
            let mut commands = world.commands();
            unequip_firearm(&mut commands, &mut tasks, shooter, &mut state);
        }
        world.flush();

        assert!(tasks.is_empty());
        assert!(world.get::<WeaponState>(shooter).is_none());
        assert!(world.get::<TriggerState>(shooter).is_none());
        assert!(world.get::<Muzzle>(shooter).is_some());
    }
}
