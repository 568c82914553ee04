//! Tests for weapon pipeline systems.

#[cfg(test)]
mod tests {
    use bevy::ecs::schedule::ExecutorKind;
    use bevy::prelude::*;
    use std::time::Duration;

    use crate::ballistics::{ColliderShape, LayerMask, ProjectileFlights, SpatialQueryBackend, StaticColliders};
    use crate::controller::*;
    use crate::effects::{EffectKind, EffectPools, TracerFlights};
    use crate::random::DeterministicRng;
    use crate::recoil::RecoilState;
    use crate::tasks::TaskScheduler;
    use crate::weapon::*;

    const WALL: u32 = 900;

    fn test_world() -> World {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.init_resource::<TaskScheduler>();
        world.insert_resource(DeterministicRng::new(1));
        world.insert_resource(EffectPools::default());
        world.init_resource::<TracerFlights>();
        world.init_resource::<ProjectileFlights>();
        world.insert_resource(SpatialQueryBackend::new(StaticColliders::new().with(
            ColliderShape::plane(Vec3::new(0.0, 0.0, -10.0), Vec3::Z),
            LayerMask::ALL,
            Some(Entity::from_raw(WALL)),
        )));

        world.init_resource::<Events<FireIntent>>();
        world.init_resource::<Events<ReloadIntent>>();
        world.init_resource::<Events<EquipWeapon>>();
        world.init_resource::<Events<UnequipWeapon>>();
        world.init_resource::<Events<ShotFired>>();
        world.init_resource::<Events<ShotHit>>();
        world.init_resource::<Events<ReloadStarted>>();
        world.init_resource::<Events<ReloadCompleted>>();
        world.init_resource::<Events<CameraShakeImpulse>>();
        world
    }

    fn accurate(profile: WeaponProfile) -> WeaponProfile {
        WeaponProfile {
            spread_angle: 0.0,
            ..profile
        }
    }

    fn spawn_shooter(world: &mut World, profile: WeaponProfile) -> Entity {
        world
            .spawn((Transform::default(), Muzzle::default(), firearm_bundle(profile)))
            .id()
    }

    fn set_time(world: &mut World, secs: f64) {
        world.resource_mut::<Time>().advance_to(Duration::from_secs_f64(secs));
    }

    fn events<E: Event + Clone>(world: &World) -> Vec<E> {
        world
            .resource::<Events<E>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    fn state_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                apply_weapon_equips,
                collect_weapon_input,
                run_timed_tasks,
                process_weapon_triggers,
            )
                .chain(),
        );
        schedule
    }

    #[test]
    fn test_fire_intent_produces_shot_and_hit() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::pistol()));

        world.send_event(FireIntent { shooter });
        state_schedule().run(&mut world);

        let shots = events::<ShotFired>(&world);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].ammo_left, 11);
        assert_eq!(shots[0].outcome.target_point(), Some(Vec3::new(0.0, 0.0, -10.0)));

        let hits = events::<ShotHit>(&world);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, Some(Entity::from_raw(WALL)));
        assert_eq!(hits[0].damage, 25);

        // Trigger сброшен после обработки
        assert_eq!(world.get::<TriggerState>(shooter), Some(&TriggerState::default()));
    }

    #[test]
    fn test_cooldown_rejection_is_silent() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::pistol()));
        let mut schedule = state_schedule();

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        set_time(&mut world, 0.1);
        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        assert_eq!(events::<ShotFired>(&world).len(), 1);
        assert_eq!(world.get::<WeaponState>(shooter).unwrap().current_ammo(), 11);
    }

    #[test]
    fn test_auto_reload_and_completion() {
        let mut world = test_world();
        let profile = WeaponProfile {
            magazine_size: 1,
            reload_duration: 1.0,
            ..accurate(WeaponProfile::pistol())
        };
        let shooter = spawn_shooter(&mut world, profile);
        let mut schedule = state_schedule();

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        set_time(&mut world, 0.5);
        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        let started = events::<ReloadStarted>(&world);
        assert_eq!(started.len(), 1);
        assert!(started[0].automatic);
        assert_eq!(started[0].completes_at, 1.5);
        assert!(world.get::<WeaponState>(shooter).unwrap().is_reloading());

        set_time(&mut world, 1.5);
        schedule.run(&mut world);

        let completed = events::<ReloadCompleted>(&world);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].ammo, 1);
        assert!(!world.get::<WeaponState>(shooter).unwrap().is_reloading());
    }

    #[test]
    fn test_reload_intent_when_full_is_noop() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, WeaponProfile::pistol());

        world.send_event(ReloadIntent { shooter });
        state_schedule().run(&mut world);

        assert!(events::<ReloadStarted>(&world).is_empty());
        assert!(!world.get::<WeaponState>(shooter).unwrap().is_reloading());
        assert!(world.resource::<TaskScheduler>().is_empty());
    }

    #[test]
    fn test_equip_cancels_reload() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::pistol()));
        let mut schedule = state_schedule();

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        set_time(&mut world, 0.1);
        world.send_event(ReloadIntent { shooter });
        schedule.run(&mut world);
        assert!(world.get::<WeaponState>(shooter).unwrap().is_reloading());

        set_time(&mut world, 0.5);
        world.send_event(EquipWeapon {
            shooter,
            profile: WeaponProfile::rifle(),
        });
        schedule.run(&mut world);

        let state = world.get::<WeaponState>(shooter).unwrap();
        assert!(!state.is_reloading());
        assert_eq!(state.current_ammo(), WeaponProfile::rifle().magazine_size);
        assert_eq!(world.get::<WeaponProfile>(shooter).unwrap().name, "Rifle");

        // Старый CompleteReload отменён — после его deadline ничего не приходит
        set_time(&mut world, 3.0);
        schedule.run(&mut world);
        assert!(events::<ReloadCompleted>(&world).is_empty());
    }

    #[test]
    fn test_equip_event_arms_bare_shooter() {
        let mut world = test_world();
        let shooter = world.spawn(Transform::default()).id();
        let mut schedule = state_schedule();

        world.send_event(EquipWeapon {
            shooter,
            profile: accurate(WeaponProfile::pistol()),
        });
        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        // Без Muzzle выстрел идёт из offset по умолчанию
        let shots = events::<ShotFired>(&world);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].muzzle, Muzzle::default().world_position(&Transform::default()));
        assert_eq!(shots[0].outcome.target_point(), Some(Vec3::new(0.0, 0.0, -10.0)));

        assert_eq!(world.get::<WeaponState>(shooter).unwrap().shots_fired(), 1);
        assert_eq!(world.get::<TriggerState>(shooter), Some(&TriggerState::default()));
    }

    #[test]
    fn test_equip_event_removes_reload_task() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::pistol()));
        let mut schedule = state_schedule();

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        set_time(&mut world, 0.1);
        world.send_event(ReloadIntent { shooter });
        schedule.run(&mut world);
        let reload_task = world.get::<WeaponState>(shooter).unwrap().reload_ticket().unwrap().task;
        assert!(world.resource::<TaskScheduler>().is_pending(reload_task));

        world.send_event(EquipWeapon {
            shooter,
            profile: WeaponProfile::rifle(),
        });
        schedule.run(&mut world);

        assert!(!world.resource::<TaskScheduler>().is_pending(reload_task));
    }

    #[test]
    fn test_unequip_removes_weapon() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, WeaponProfile::pistol());

        world.send_event(UnequipWeapon { shooter });
        state_schedule().run(&mut world);

        assert!(world.get::<WeaponState>(shooter).is_none());
        assert!(world.get::<RecoilState>(shooter).is_none());
        assert!(world.get::<Muzzle>(shooter).is_some());

        // Fire без оружия игнорируется
        world.send_event(FireIntent { shooter });
        state_schedule().run(&mut world);
        assert!(events::<ShotFired>(&world).is_empty());
    }

    #[test]
    fn test_shot_effects_spawned() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::pistol()));

        let mut schedule = state_schedule();
        schedule.add_systems(spawn_shot_effects.after(process_weapon_triggers));

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        let pools = world.resource::<EffectPools>();
        assert_eq!(pools.pool(EffectKind::MuzzleFlash).active_count(), 1);
        assert_eq!(pools.pool(EffectKind::BulletHole).active_count(), 1);
        assert_eq!(pools.pool(EffectKind::HitParticle).active_count(), 1);
        assert_eq!(pools.pool(EffectKind::Tracer).active_count(), 1);

        let hole = pools.pool(EffectKind::BulletHole).get(0).unwrap();
        assert_eq!(hole.parent, Some(Entity::from_raw(WALL)));
        assert!((hole.position.z + 9.99).abs() < 1e-4);

        assert_eq!(world.resource::<TracerFlights>().len(), 1);
    }

    #[test]
    fn test_projectile_shot_registers_flight() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::launcher()));

        let mut schedule = state_schedule();
        schedule.add_systems(spawn_shot_effects.after(process_weapon_triggers));

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        // Projectile: попадание ещё не случилось
        assert!(events::<ShotHit>(&world).is_empty());
        assert_eq!(world.resource::<ProjectileFlights>().len(), 1);
        assert_eq!(
            world.resource::<EffectPools>().pool(EffectKind::BulletHole).active_count(),
            0
        );
    }

    #[test]
    fn test_recoil_kick_and_camera_shake() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, accurate(WeaponProfile::launcher()));

        let mut schedule = state_schedule();
        schedule.add_systems(apply_recoil_kicks.after(process_weapon_triggers));

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        let recoil = world.get::<RecoilState>(shooter).unwrap();
        assert!(recoil.target().x > 0.0);

        let shakes = events::<CameraShakeImpulse>(&world);
        assert_eq!(shakes.len(), 1);
        assert_eq!(shakes[0].strength, WeaponProfile::launcher().camera_shake);
    }

    #[test]
    fn test_pistol_has_no_camera_shake() {
        let mut world = test_world();
        let shooter = spawn_shooter(&mut world, WeaponProfile::pistol());

        let mut schedule = state_schedule();
        schedule.add_systems(apply_recoil_kicks.after(process_weapon_triggers));

        world.send_event(FireIntent { shooter });
        schedule.run(&mut world);

        assert!(events::<CameraShakeImpulse>(&world).is_empty());
        assert!(world.get::<RecoilState>(shooter).unwrap().target() != Vec2::ZERO);
    }
}
