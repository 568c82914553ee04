//! Headless gunplay demo
//!
//! Стрельба очередями по статической геометрии без рендера:
//! pistol → rifle → launcher, статистика ammo / recoil / пулов в stdout.

use bevy::prelude::*;
use gunplay_simulation::ballistics::ColliderShape;
use gunplay_simulation::{
    create_headless_app, log_error, EffectKind, EffectPools, EquipWeapon, FireIntent, LayerMask, Muzzle,
    RecoilState, ReloadIntent, SimulationPlugin, SpatialQueryBackend, StaticColliders, WeaponCatalog, WeaponState,
};

const SEED: u64 = 42;
const TICKS_PER_WEAPON: usize = 240;

fn main() {
    println!("Starting gunplay headless simulation (seed: {})", SEED);

    let catalog = match WeaponCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(err) => {
            log_error(&format!("Failed to load weapon catalog: {}", err));
            std::process::exit(1);
        }
    };

    let mut app = create_headless_app(SEED);
    app.add_plugins(SimulationPlugin);

    // Стена в 15м, пол, бочка на линии огня
    let wall = app.world_mut().spawn_empty().id();
    let floor = app.world_mut().spawn_empty().id();
    let barrel = app.world_mut().spawn_empty().id();
    let geometry = StaticColliders::new()
        .with(
            ColliderShape::plane(Vec3::new(0.0, 0.0, -15.0), Vec3::Z),
            LayerMask::ALL,
            Some(wall),
        )
        .with(ColliderShape::plane(Vec3::ZERO, Vec3::Y), LayerMask::ALL, Some(floor))
        .with(
            ColliderShape::Sphere {
                center: Vec3::new(0.4, 1.6, -8.0),
                radius: 0.5,
            },
            LayerMask::ALL,
            Some(barrel),
        );
    app.insert_resource(SpatialQueryBackend::new(geometry));

    let shooter = app
        .world_mut()
        .spawn((Transform::from_xyz(0.0, 1.7, 0.0), Muzzle::default()))
        .id();

    // Warm-up: первый update без delta
    app.update();

    for name in catalog.names().map(str::to_string).collect::<Vec<_>>() {
        let Ok(profile) = catalog.get(&name) else {
            continue;
        };

        app.world_mut().send_event(EquipWeapon {
            shooter,
            profile: profile.clone(),
        });

        for tick in 0..TICKS_PER_WEAPON {
            // Зажатый курок первые 3 секунды, затем ручной reload
            if tick < 180 {
                app.world_mut().send_event(FireIntent { shooter });
            } else if tick == 180 {
                app.world_mut().send_event(ReloadIntent { shooter });
            }
            app.update();

            if tick % 60 == 0 {
                print_stats(&app, shooter, &name, tick);
            }
        }
    }

    print_pool_summary(&app);
    println!("Simulation complete!");
}

fn print_stats(app: &App, shooter: Entity, weapon: &str, tick: usize) {
    let world = app.world();
    let Some(state) = world.get::<WeaponState>(shooter) else {
        return;
    };
    let recoil = world.get::<RecoilState>(shooter).copied().unwrap_or_default();

    println!(
        "[{}] tick {:>3}: ammo={} reloading={} shots={} recoil=({:.2}, {:.2})",
        weapon,
        tick,
        state.current_ammo(),
        state.is_reloading(),
        state.shots_fired(),
        recoil.current().x,
        recoil.current().y
    );
}

fn print_pool_summary(app: &App) {
    let pools = app.world().resource::<EffectPools>();
    for kind in EffectKind::ALL {
        let pool = pools.pool(kind);
        println!(
            "Pool {:?}: size={} active={}",
            kind,
            pool.len(),
            pool.active_count()
        );
    }
}
