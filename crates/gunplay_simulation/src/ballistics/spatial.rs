//! Spatial query backend (внешний collaborator — физика/коллизии)
//!
//! Симуляция знает только trait `SpatialQuery::raycast`.
//! `StaticColliders` — простой headless backend (planes, spheres, AABB)
//! для demo и тестов; в игре его заменяет адаптер над physics engine.

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Bitmask слоёв коллизий (32 слоя)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// Маска из одного слоя (0..32)
    pub const fn layer(index: u32) -> Self {
        Self(1 << (index % 32))
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Первое пересечение луча с геометрией
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Нормаль поверхности, смотрит навстречу лучу
    pub normal: Vec3,
    pub distance: f32,
    pub collider: Option<Entity>,
}

/// Physics/collision backend
pub trait SpatialQuery: Send + Sync {
    /// Ближайшее пересечение в пределах `max_distance` среди слоёв `layers`
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit>;
}

/// Resource: установленный backend
#[derive(Resource)]
pub struct SpatialQueryBackend(Box<dyn SpatialQuery>);

impl SpatialQueryBackend {
    pub fn new(backend: impl SpatialQuery + 'static) -> Self {
        Self(Box::new(backend))
    }

    pub fn query(&self) -> &dyn SpatialQuery {
        self.0.as_ref()
    }
}

impl Default for SpatialQueryBackend {
    fn default() -> Self {
        Self::new(StaticColliders::default())
    }
}

/// Форма статического collider'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Бесконечная плоскость: точки `p` с `normal · p = offset`
    Plane { normal: Vec3, offset: f32 },
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Cuboid { min: Vec3, max: Vec3 },
}

impl ColliderShape {
    pub fn plane(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self::Plane {
            normal,
            offset: normal.dot(point),
        }
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self::Cuboid {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Пересечение луча: (distance, normal навстречу лучу)
    ///
    /// Как и в physics engine, collider'ы, внутри которых находится origin, не детектятся.
    fn intersect(&self, ray: Ray3d, max_distance: f32) -> Option<(f32, Vec3)> {
        match *self {
            ColliderShape::Plane { normal, offset } => {
                let normal = Dir3::new(normal).ok()?;
                let distance = ray.intersect_plane(normal * offset, InfinitePlane3d { normal })?;
                let facing = if normal.dot(*ray.direction) < 0.0 { *normal } else { -*normal };
                (distance <= max_distance).then_some((distance, facing))
            }
            ColliderShape::Sphere { center, radius } => {
                if ray.origin.distance_squared(center) < radius * radius {
                    return None;
                }
                let distance = RayCast3d::from_ray(ray, max_distance)
                    .sphere_intersection_at(&BoundingSphere::new(center, radius))?;
                let point = ray.get_point(distance);
                Some((distance, (point - center).normalize_or_zero()))
            }
            ColliderShape::Cuboid { min, max } => {
                if ray.origin.cmpgt(min).all() && ray.origin.cmplt(max).all() {
                    return None;
                }
                let aabb = Aabb3d {
                    min: min.into(),
                    max: max.into(),
                };
                let distance = RayCast3d::from_ray(ray, max_distance).aabb_intersection_at(&aabb)?;
                Some((distance, cuboid_face_normal(ray.get_point(distance), min, max)))
            }
        }
    }
}

/// Нормаль грани AABB, ближайшей к точке на поверхности
fn cuboid_face_normal(point: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    let center = (min + max) * 0.5;
    let half_extents = ((max - min) * 0.5).max(Vec3::splat(f32::EPSILON));
    let local = (point - center) / half_extents;
    let magnitude = local.abs();

    if magnitude.x >= magnitude.y && magnitude.x >= magnitude.z {
        Vec3::X * local.x.signum()
    } else if magnitude.y >= magnitude.z {
        Vec3::Y * local.y.signum()
    } else {
        Vec3::Z * local.z.signum()
    }
}

/// Статический collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    pub shape: ColliderShape,
    pub layers: LayerMask,
    /// Entity, к которой крепятся decals (None = world geometry)
    pub entity: Option<Entity>,
}

/// Headless backend: линейный перебор статических collider'ов
#[derive(Debug, Clone, Default)]
pub struct StaticColliders {
    colliders: Vec<StaticCollider>,
}

impl StaticColliders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, shape: ColliderShape, layers: LayerMask, entity: Option<Entity>) -> Self {
        self.insert(shape, layers, entity);
        self
    }

    pub fn insert(&mut self, shape: ColliderShape, layers: LayerMask, entity: Option<Entity>) {
        self.colliders.push(StaticCollider {
            shape,
            layers,
            entity,
        });
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl SpatialQuery for StaticColliders {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        let Ok(direction) = Dir3::new(direction) else {
            return None;
        };
        if max_distance <= 0.0 {
            return None;
        }
        let ray = Ray3d::new(origin, direction);

        self.colliders
            .iter()
            .filter(|collider| collider.layers.intersects(layers))
            .filter_map(|collider| {
                let (distance, normal) = collider.shape.intersect(ray, max_distance)?;
                Some(RayHit {
                    point: ray.get_point(distance),
                    normal,
                    distance,
                    collider: collider.entity,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
