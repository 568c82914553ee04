//! Hit FX placement на поверхности

use bevy::prelude::*;

use super::EffectPlacement;
use crate::ballistics::{aim_basis, HitResult};

/// Ориентация, у которой local forward (-Z) смотрит вдоль `direction`
pub fn facing(direction: Vec3) -> Quat {
    aim_basis(direction)
}

/// Decal (bullet hole): чуть над поверхностью, forward = outward normal,
/// прикреплён к collider'у
pub fn decal_placement(hit: &HitResult, surface_offset: f32) -> EffectPlacement {
    EffectPlacement::at(hit.point + hit.normal * surface_offset, facing(hit.normal)).attached_to(hit.collider)
}

/// Particle burst: в точке попадания, вдоль нормали
pub fn burst_placement(hit: &HitResult) -> EffectPlacement {
    EffectPlacement::at(hit.point, facing(hit.normal)).attached_to(hit.collider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_hit() -> HitResult {
        HitResult {
            point: Vec3::new(0.0, 1.0, -10.0),
            normal: Vec3::Z,
            hit_something: true,
            collider: Some(Entity::from_raw(12)),
            direction: Vec3::NEG_Z,
            distance: 10.0,
        }
    }

    #[test]
    fn test_decal_offset_from_surface() {
        let placement = decal_placement(&wall_hit(), 0.01);

        assert!((placement.position - Vec3::new(0.0, 1.0, -9.99)).length() < 1e-5);
        assert_eq!(placement.parent, Some(Entity::from_raw(12)));
    }

    #[test]
    fn test_decal_faces_outward_normal() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let hit = HitResult {
            normal,
            ..wall_hit()
        };

        let placement = decal_placement(&hit, 0.01);
        let forward = placement.rotation * Vec3::NEG_Z;
        assert!((forward - normal).length() < 1e-5);
    }

    #[test]
    fn test_burst_at_hit_point() {
        let placement = burst_placement(&wall_hit());

        assert_eq!(placement.position, Vec3::new(0.0, 1.0, -10.0));
        assert!((placement.rotation * Vec3::NEG_Z - Vec3::Z).length() < 1e-5);
    }
}
