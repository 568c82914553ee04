//! Ballistics — как выстрел находит цель
//!
//! - spatial: LayerMask, SpatialQuery trait, StaticColliders backend
//! - hitscan: spread cone + ray cast
//! - resolver: ShotResolver capability (hitscan / projectile), ShotKind component
//! - projectile: полёты projectile (segment ray cast каждый tick)

pub mod hitscan;
pub mod projectile;
pub mod resolver;
pub mod spatial;

pub use hitscan::*;
pub use projectile::*;
pub use resolver::*;
pub use spatial::*;
