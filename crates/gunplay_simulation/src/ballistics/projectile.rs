//! Projectile flights (continuous per-frame tasks)
//!
//! Каждый tick: segment ray cast на `speed * dt` вперёд.
//! Завершение: impact (попадание) или исчерпан max range.

use bevy::prelude::*;

use super::hitscan::HitResult;
use super::resolver::ProjectileLaunch;
use super::{LayerMask, SpatialQuery};
use crate::effects::EffectHandle;

/// Летящий projectile
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileFlight {
    pub shooter: Entity,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub remaining_range: f32,
    pub layers: LayerMask,
    pub damage: u32,
    /// Pooled визуал (tracer), следует за projectile
    pub visual: Option<EffectHandle>,
}

impl ProjectileFlight {
    pub fn launch(shooter: Entity, launch: &ProjectileLaunch, visual: Option<EffectHandle>) -> Self {
        Self {
            shooter,
            position: launch.origin,
            direction: launch.direction.normalize_or_zero(),
            speed: launch.speed,
            remaining_range: launch.max_range,
            layers: launch.layers,
            damage: launch.damage,
            visual,
        }
    }
}

/// Чем закончился полёт
#[derive(Debug, Clone, PartialEq)]
pub enum FlightEnd {
    Impact { flight: ProjectileFlight, hit: HitResult },
    Expired { flight: ProjectileFlight },
}

/// Resource: все projectile в полёте
#[derive(Resource, Debug, Default)]
pub struct ProjectileFlights {
    flights: Vec<ProjectileFlight>,
}

impl ProjectileFlights {
    pub fn launch(&mut self, flight: ProjectileFlight) {
        self.flights.push(flight);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectileFlight> {
        self.flights.iter()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Продвинуть все полёты на `dt`, вернуть завершившиеся
    pub fn advance(&mut self, dt: f32, spatial: &dyn SpatialQuery) -> Vec<FlightEnd> {
        let mut ended = Vec::new();
        let mut still_flying = Vec::with_capacity(self.flights.len());

        for mut flight in self.flights.drain(..) {
            let step = (flight.speed * dt).min(flight.remaining_range);

            if let Some(hit) = spatial.raycast(flight.position, flight.direction, step, flight.layers) {
                let result = HitResult {
                    point: hit.point,
                    normal: hit.normal,
                    hit_something: true,
                    collider: hit.collider,
                    direction: flight.direction,
                    distance: hit.distance,
                };
                flight.position = hit.point;
                ended.push(FlightEnd::Impact { flight, hit: result });
                continue;
            }

            flight.position += flight.direction * step;
            flight.remaining_range -= step;

            if flight.remaining_range <= 0.0 || flight.direction == Vec3::ZERO {
                ended.push(FlightEnd::Expired { flight });
            } else {
                still_flying.push(flight);
            }
        }

        self.flights = still_flying;
        ended
    }
}
