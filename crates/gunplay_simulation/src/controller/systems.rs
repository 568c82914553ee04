//! Weapon pipeline systems (Input → State → Effects → Recoil)

use bevy::prelude::*;

use super::{equip_firearm, unequip_firearm, Muzzle, TriggerState};
use crate::ballistics::{
    FlightEnd, ProjectileFlight, ProjectileFlights, ShotKind, ShotOutcome, ShotResolver, SpatialQueryBackend,
};
use crate::effects::{facing, EffectKind, EffectPlacement, EffectPools, TracerFlight, TracerFlights};
use crate::random::DeterministicRng;
use crate::recoil::{RecoilState, ViewInput, ViewSway};
use crate::tasks::{TaskScheduler, TimedTask};
use crate::weapon::{
    CameraShakeImpulse, EquipWeapon, FireIntent, FireOutcome, ReloadCompleted, ReloadIntent, ReloadOutcome,
    ReloadStarted, ShotFired, ShotHit, UnequipWeapon, WeaponProfile, WeaponState,
};

// ============================================================================
// Фаза 1: Input
// ============================================================================

/// System: equip / unequip
///
/// In-flight reload старого оружия отменяется (task удаляется из scheduler).
/// Летящие tracer'ы не трогаем — их закончит прилёт или auto-release.
pub fn apply_weapon_equips(
    mut commands: Commands,
    mut equips: EventReader<EquipWeapon>,
    mut unequips: EventReader<UnequipWeapon>,
    mut holders: Query<Option<&mut WeaponState>>,
    mut tasks: ResMut<TaskScheduler>,
) {
    for equip in equips.read() {
        let Ok(mut state) = holders.get_mut(equip.shooter) else {
            continue;
        };
        equip_firearm(
            &mut commands,
            &mut tasks,
            equip.shooter,
            state.as_deref_mut(),
            equip.profile.clone(),
        );
    }

    for unequip in unequips.read() {
        let Ok(Some(mut state)) = holders.get_mut(unequip.shooter) else {
            continue;
        };
        unequip_firearm(&mut commands, &mut tasks, unequip.shooter, &mut state);
    }
}

/// System: FireIntent / ReloadIntent → TriggerState
pub fn collect_weapon_input(
    mut fire_intents: EventReader<FireIntent>,
    mut reload_intents: EventReader<ReloadIntent>,
    mut triggers: Query<&mut TriggerState>,
) {
    for intent in fire_intents.read() {
        if let Ok(mut trigger) = triggers.get_mut(intent.shooter) {
            trigger.fire = true;
        }
    }

    for intent in reload_intents.read() {
        if let Ok(mut trigger) = triggers.get_mut(intent.shooter) {
            trigger.reload = true;
        }
    }
}

// ============================================================================
// Фаза 2: State
// ============================================================================

/// System: выполнение наступивших timed tasks
///
/// CompleteReload → магазин полон (stale task игнорируется),
/// ReleaseEffect → deactivate + detach pooled эффекта.
pub fn run_timed_tasks(
    time: Res<Time>,
    mut tasks: ResMut<TaskScheduler>,
    mut weapons: Query<(&WeaponProfile, &mut WeaponState)>,
    mut pools: ResMut<EffectPools>,
    mut completed: EventWriter<ReloadCompleted>,
) {
    let now = time.elapsed_secs_f64();

    for (id, task) in tasks.poll(now) {
        match task {
            TimedTask::CompleteReload { weapon } => {
                let Ok((profile, mut state)) = weapons.get_mut(weapon) else {
                    continue;
                };
                if state.complete_reload(id, profile) {
                    crate::logger::log(&format!(
                        "✅ Reload complete: {:?} ({}) ammo={}",
                        weapon,
                        profile.name,
                        state.current_ammo()
                    ));
                    completed.write(ReloadCompleted {
                        shooter: weapon,
                        ammo: state.current_ammo(),
                    });
                }
            }
            TimedTask::ReleaseEffect { handle } => {
                pools.release(handle);
            }
        }
    }
}

/// System: применение триггеров к WeaponState + shot resolution
///
/// Порядок внутри shooter'а: сначала reload, затем fire.
/// Shooter без `Muzzle` стреляет из offset по умолчанию.
/// Rejections (cooldown, reload в процессе) поглощаются (только debug log).
pub fn process_weapon_triggers(
    time: Res<Time>,
    mut tasks: ResMut<TaskScheduler>,
    mut rng: ResMut<DeterministicRng>,
    spatial: Res<SpatialQueryBackend>,
    mut shooters: Query<(
        Entity,
        &Transform,
        Option<&Muzzle>,
        &WeaponProfile,
        &ShotKind,
        &mut WeaponState,
        &mut TriggerState,
    )>,
    mut shots: EventWriter<ShotFired>,
    mut hits: EventWriter<ShotHit>,
    mut reloads: EventWriter<ReloadStarted>,
) {
    let now = time.elapsed_secs_f64();

    for (shooter, camera, muzzle, profile, shot_kind, mut state, mut trigger) in shooters.iter_mut() {
        if trigger.reload && state.try_reload(now, profile, shooter, &mut tasks) == ReloadOutcome::Started {
            write_reload_started(&mut reloads, shooter, &state, false);
        }

        if trigger.fire {
            match state.try_fire(now, profile, shooter, &mut tasks) {
                FireOutcome::Fired => {
                    let outcome = shot_kind.resolve_shot(
                        camera.translation,
                        camera.forward().as_vec3(),
                        profile,
                        spatial.query(),
                        &mut *rng,
                    );

                    crate::logger::log(&format!(
                        "💥 {:?} fired {} (ammo {}/{})",
                        shooter,
                        profile.name,
                        state.current_ammo(),
                        profile.magazine_size
                    ));

                    if let Some(hit) = outcome.hit() {
                        hits.write(ShotHit {
                            shooter,
                            collider: hit.collider,
                            damage: profile.damage,
                            point: hit.point,
                            normal: hit.normal,
                        });
                    }

                    shots.write(ShotFired {
                        shooter,
                        muzzle: muzzle.copied().unwrap_or_default().world_position(camera),
                        aim_rotation: camera.rotation,
                        direction: outcome.direction(),
                        outcome,
                        speed: profile.projectile_speed,
                        ammo_left: state.current_ammo(),
                    });
                }
                FireOutcome::AutoReloadTriggered => {
                    write_reload_started(&mut reloads, shooter, &state, true);
                }
                FireOutcome::Rejected(reason) => {
                    crate::logger::log_with_level(
                        crate::logger::LogLevel::Debug,
                        &format!("{:?} fire rejected: {:?}", shooter, reason),
                    );
                }
            }
        }

        trigger.clear();
    }
}

fn write_reload_started(
    reloads: &mut EventWriter<ReloadStarted>,
    shooter: Entity,
    state: &WeaponState,
    automatic: bool,
) {
    let Some(ticket) = state.reload_ticket() else {
        return;
    };

    crate::logger::log(&format!(
        "🔄 Reload started: {:?} (auto={}) until t={:.2}",
        shooter, automatic, ticket.completes_at
    ));
    reloads.write(ReloadStarted {
        shooter,
        completes_at: ticket.completes_at,
        automatic,
    });
}

// ============================================================================
// Фаза 3: Effects
// ============================================================================

/// System: ShotFired → muzzle flash, hit FX, tracer / projectile flight
pub fn spawn_shot_effects(
    time: Res<Time>,
    mut shots: EventReader<ShotFired>,
    mut pools: ResMut<EffectPools>,
    mut tasks: ResMut<TaskScheduler>,
    mut tracers: ResMut<TracerFlights>,
    mut projectiles: ResMut<ProjectileFlights>,
) {
    let now = time.elapsed_secs_f64();

    for shot in shots.read() {
        pools.spawn(
            EffectKind::MuzzleFlash,
            EffectPlacement::at(shot.muzzle, shot.aim_rotation).attached_to(Some(shot.shooter)),
            now,
            &mut tasks,
        );

        match shot.outcome {
            ShotOutcome::Resolved(hit) => {
                if hit.hit_something {
                    pools.spawn_impact(&hit, now, &mut tasks);
                }

                let handle = pools.spawn(
                    EffectKind::Tracer,
                    EffectPlacement::at(shot.muzzle, facing(hit.point - shot.muzzle)),
                    now,
                    &mut tasks,
                );
                tracers.launch(TracerFlight {
                    handle,
                    target: hit.point,
                    speed: shot.speed,
                });
            }
            ShotOutcome::Launched(launch) => {
                let visual = pools.spawn(
                    EffectKind::Tracer,
                    EffectPlacement::at(shot.muzzle, facing(launch.direction)),
                    now,
                    &mut tasks,
                );
                projectiles.launch(ProjectileFlight::launch(shot.shooter, &launch, Some(visual)));
            }
        }
    }
}

/// System: движение tracer'ов
pub fn advance_tracers(time: Res<Time>, mut tracers: ResMut<TracerFlights>, mut pools: ResMut<EffectPools>) {
    tracers.advance(time.delta_secs(), time.elapsed_secs_f64(), &mut pools);
}

/// System: полёт projectile'ов (segment ray cast), impact → hit FX + ShotHit
pub fn advance_projectiles(
    time: Res<Time>,
    spatial: Res<SpatialQueryBackend>,
    mut projectiles: ResMut<ProjectileFlights>,
    mut pools: ResMut<EffectPools>,
    mut tasks: ResMut<TaskScheduler>,
    mut hits: EventWriter<ShotHit>,
) {
    let now = time.elapsed_secs_f64();

    for ended in projectiles.advance(time.delta_secs(), spatial.query()) {
        match ended {
            FlightEnd::Impact { flight, hit } => {
                pools.spawn_impact(&hit, now, &mut tasks);
                sync_projectile_visual(&mut pools, &flight, now);

                crate::logger::log(&format!(
                    "🎯 Projectile impact: shooter={:?} collider={:?} at {:?}",
                    flight.shooter, hit.collider, hit.point
                ));
                hits.write(ShotHit {
                    shooter: flight.shooter,
                    collider: hit.collider,
                    damage: flight.damage,
                    point: hit.point,
                    normal: hit.normal,
                });
            }
            FlightEnd::Expired { flight } => {
                sync_projectile_visual(&mut pools, &flight, now);
            }
        }
    }

    for flight in projectiles.iter() {
        sync_projectile_visual(&mut pools, flight, now);
    }
}

/// Визуал projectile'а следует за полётом (пока не released)
fn sync_projectile_visual(pools: &mut EffectPools, flight: &ProjectileFlight, now: f64) {
    let trail_time = f64::from(pools.config().trail_time);
    let Some(instance) = flight.visual.and_then(|handle| pools.get_mut(handle)) else {
        return;
    };
    if !instance.active {
        return;
    }

    instance.position = flight.position;
    instance.trail.push((flight.position, now));
    instance.trail.retain(|(_, stamp)| now - *stamp <= trail_time);
}

// ============================================================================
// Фаза 4: Recoil
// ============================================================================

/// System: recoil kick + camera shake на каждый ShotFired
pub fn apply_recoil_kicks(
    mut shots: EventReader<ShotFired>,
    mut rng: ResMut<DeterministicRng>,
    mut shooters: Query<(&WeaponProfile, &mut RecoilState)>,
    mut shakes: EventWriter<CameraShakeImpulse>,
) {
    for shot in shots.read() {
        let Ok((profile, mut recoil)) = shooters.get_mut(shot.shooter) else {
            continue;
        };

        recoil.kick(profile, &mut *rng);

        if profile.camera_shake > 0.0 {
            shakes.write(CameraShakeImpulse {
                shooter: shot.shooter,
                strength: profile.camera_shake,
            });
        }
    }
}

/// System: two-stage decay всех RecoilState
pub fn decay_recoil(time: Res<Time>, mut shooters: Query<(&WeaponProfile, &mut RecoilState)>) {
    let dt = time.delta_secs();
    for (profile, mut recoil) in shooters.iter_mut() {
        recoil.tick_profile(dt, profile);
    }
}

/// System: weapon-view sway / bob
pub fn update_view_sway(time: Res<Time>, mut views: Query<(&ViewInput, &mut ViewSway)>) {
    let dt = time.delta_secs();
    for (input, mut sway) in views.iter_mut() {
        sway.update(*input, dt);
    }
}
