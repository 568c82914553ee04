//! Tracer motion (continuous per-frame task)
//!
//! Tracer движется от muzzle к target point со скоростью `projectile_speed`.
//! Завершение: distance ≤ arrival epsilon ИЛИ pooled instance уже released
//! (auto-release раньше прилёта). Смена оружия полёт не отменяет.

use bevy::prelude::*;

use super::{EffectHandle, EffectPools};

/// Летящий tracer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerFlight {
    pub handle: EffectHandle,
    pub target: Vec3,
    pub speed: f32,
}

/// Resource: активные tracer полёты
#[derive(Resource, Debug, Default)]
pub struct TracerFlights {
    flights: Vec<TracerFlight>,
}

impl TracerFlights {
    pub fn launch(&mut self, flight: TracerFlight) {
        self.flights.push(flight);
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TracerFlight> {
        self.flights.iter()
    }

    /// Сдвинуть все tracer'ы на `dt`. Возвращает сколько долетело.
    pub fn advance(&mut self, dt: f32, now: f64, pools: &mut EffectPools) -> usize {
        let epsilon = pools.config().arrival_epsilon;
        let trail_time = f64::from(pools.config().trail_time);
        let mut arrived = 0;

        self.flights.retain(|flight| {
            let Some(instance) = pools.get_mut(flight.handle) else {
                return false;
            };
            if !instance.active {
                return false;
            }

            instance.position = move_towards(instance.position, flight.target, flight.speed * dt);
            instance.trail.push((instance.position, now));
            instance.trail.retain(|(_, stamp)| now - *stamp <= trail_time);

            if instance.position.distance(flight.target) <= epsilon {
                arrived += 1;
                false
            } else {
                true
            }
        });

        arrived
    }
}

/// Сдвиг к `target` не больше чем на `max_delta`
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        return target;
    }
    current + delta / distance * max_delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectKind, EffectPlacement};
    use crate::tasks::TaskScheduler;

    const DT: f32 = 1.0 / 60.0;

    fn launch_tracer(pools: &mut EffectPools, tasks: &mut TaskScheduler, target: Vec3, speed: f32) -> TracerFlight {
        let handle = pools.spawn(
            EffectKind::Tracer,
            EffectPlacement::at(Vec3::ZERO, Quat::IDENTITY),
            0.0,
            tasks,
        );
        TracerFlight { handle, target, speed }
    }

    #[test]
    fn test_move_towards_does_not_overshoot() {
        assert_eq!(move_towards(Vec3::ZERO, Vec3::X, 5.0), Vec3::X);
        assert_eq!(move_towards(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0), Vec3::X);
        assert_eq!(move_towards(Vec3::ONE, Vec3::ONE, 1.0), Vec3::ONE);
    }

    #[test]
    fn test_tracer_arrives_at_target() {
        let mut pools = EffectPools::default();
        let mut tasks = TaskScheduler::new();
        let mut tracers = TracerFlights::default();
        let target = Vec3::new(0.0, 0.0, -10.0);
        let flight = launch_tracer(&mut pools, &mut tasks, target, 120.0);
        tracers.launch(flight);

        // 10м / (120 м/с × 1/60) = 5 ticks
        let mut arrived = 0;
        for tick in 1..=5 {
            arrived += tracers.advance(DT, f64::from(tick) / 60.0, &mut pools);
        }

        assert_eq!(arrived, 1);
        assert!(tracers.is_empty());
        let instance = pools.get(flight.handle).unwrap();
        assert!(instance.position.distance(target) <= 0.05);
        // Instance остаётся активным до auto-release
        assert!(instance.active);
    }

    #[test]
    fn test_trail_keeps_recent_points() {
        let mut pools = EffectPools::default();
        let mut tasks = TaskScheduler::new();
        let mut tracers = TracerFlights::default();
        let flight = launch_tracer(&mut pools, &mut tasks, Vec3::new(0.0, 0.0, -100.0), 10.0);
        tracers.launch(flight);

        for tick in 1..=30 {
            tracers.advance(DT, f64::from(tick) / 60.0, &mut pools);
        }

        // trail_time 0.1s при 60 Hz → не больше 7 точек
        let trail = &pools.get(flight.handle).unwrap().trail;
        assert!(!trail.is_empty());
        assert!(trail.len() <= 7, "trail = {}", trail.len());
    }

    #[test]
    fn test_released_tracer_stops_flight() {
        let mut pools = EffectPools::default();
        let mut tasks = TaskScheduler::new();
        let mut tracers = TracerFlights::default();
        let flight = launch_tracer(&mut pools, &mut tasks, Vec3::new(0.0, 0.0, -1000.0), 1.0);
        tracers.launch(flight);

        tracers.advance(DT, DT as f64, &mut pools);
        assert_eq!(tracers.len(), 1);

        assert!(pools.release(flight.handle));
        assert_eq!(tracers.advance(DT, 2.0 * DT as f64, &mut pools), 0);
        assert!(tracers.is_empty());
    }
}
