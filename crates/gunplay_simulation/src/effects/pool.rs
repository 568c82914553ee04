//! Effect pools — переиспользуемые визуальные эффекты
//!
//! Architecture:
//! - Один `EffectPool` на `EffectKind`, все вместе в resource `EffectPools`
//! - `acquire` отдаёт первый неактивный entry (наименьший index) или растёт
//! - Entries никогда не удаляются (размер пула монотонно не убывает)
//! - Явного release нет: `spawn` планирует auto-release через `TaskScheduler`

use bevy::prelude::*;

use super::EffectConfig;
use crate::tasks::{TaskScheduler, TimedTask};

/// Тип pooled эффекта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum EffectKind {
    BulletHole,
    HitParticle,
    Tracer,
    MuzzleFlash,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::BulletHole,
        EffectKind::HitParticle,
        EffectKind::Tracer,
        EffectKind::MuzzleFlash,
    ];

    fn slot(self) -> usize {
        match self {
            EffectKind::BulletHole => 0,
            EffectKind::HitParticle => 1,
            EffectKind::Tracer => 2,
            EffectKind::MuzzleFlash => 3,
        }
    }
}

/// Stable ссылка на entry пула
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    pub kind: EffectKind,
    pub index: usize,
}

/// Placement при активации
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectPlacement {
    pub position: Vec3,
    pub rotation: Quat,
    /// Entity, к которому эффект прикреплён (hit collider, shooter)
    pub parent: Option<Entity>,
}

impl EffectPlacement {
    pub fn at(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            parent: None,
        }
    }

    pub fn attached_to(mut self, parent: Option<Entity>) -> Self {
        self.parent = parent;
        self
    }
}

/// Entry пула
#[derive(Debug, Clone, PartialEq)]
pub struct EffectInstance {
    pub active: bool,
    pub position: Vec3,
    pub rotation: Quat,
    pub parent: Option<Entity>,
    /// Сколько раз entry выдавался
    pub activations: u32,
    /// Время последней активации (старт particle burst)
    pub activated_at: f64,
    /// Trail points (tracer): позиция + время
    pub trail: Vec<(Vec3, f64)>,
}

impl Default for EffectInstance {
    fn default() -> Self {
        Self {
            active: false,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            parent: None,
            activations: 0,
            activated_at: 0.0,
            trail: Vec::new(),
        }
    }
}

impl EffectInstance {
    fn activate(&mut self, now: f64) {
        self.active = true;
        self.activations += 1;
        self.activated_at = now;
        self.trail.clear();
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.parent = None;
    }

    /// Secs с момента активации (для particle burst)
    pub fn age(&self, now: f64) -> f64 {
        (now - self.activated_at).max(0.0)
    }
}

/// Growable pool одного типа
#[derive(Debug, Clone)]
pub struct EffectPool {
    kind: EffectKind,
    entries: Vec<EffectInstance>,
}

impl EffectPool {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(kind: EffectKind, prewarm: usize) -> Self {
        let mut pool = Self::new(kind);
        pool.prewarm(prewarm);
        pool
    }

    /// Досоздать неактивные entries до `count`
    pub fn prewarm(&mut self, count: usize) {
        if self.entries.len() < count {
            self.entries.resize_with(count, EffectInstance::default);
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Первый неактивный entry или новый (pool растёт). Никогда не fail'ится.
    pub fn acquire(&mut self, now: f64) -> EffectHandle {
        let index = match self.entries.iter().position(|entry| !entry.active) {
            Some(index) => index,
            None => {
                self.entries.push(EffectInstance::default());
                self.entries.len() - 1
            }
        };

        self.entries[index].activate(now);
        EffectHandle {
            kind: self.kind,
            index,
        }
    }

    /// Deactivate + detach (только auto-release)
    pub(crate) fn release(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.active => {
                entry.deactivate();
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&EffectInstance> {
        self.entries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut EffectInstance> {
        self.entries.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.active).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectInstance> {
        self.entries.iter()
    }
}

/// Все пулы эффектов (resource, принадлежит App)
#[derive(Resource, Debug, Clone)]
pub struct EffectPools {
    pools: [EffectPool; 4],
    config: EffectConfig,
}

impl Default for EffectPools {
    fn default() -> Self {
        Self::new(EffectConfig::default())
    }
}

impl EffectPools {
    pub fn new(config: EffectConfig) -> Self {
        let pools = EffectKind::ALL.map(|kind| EffectPool::with_capacity(kind, config.prewarm(kind)));
        Self { pools, config }
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn pool(&self, kind: EffectKind) -> &EffectPool {
        &self.pools[kind.slot()]
    }

    /// Acquire + placement + auto-release через lifetime типа
    pub fn spawn(
        &mut self,
        kind: EffectKind,
        placement: EffectPlacement,
        now: f64,
        tasks: &mut TaskScheduler,
    ) -> EffectHandle {
        let lifetime = self.config.lifetime(kind);
        let pool = &mut self.pools[kind.slot()];
        let handle = pool.acquire(now);

        if let Some(instance) = pool.get_mut(handle.index) {
            instance.position = placement.position;
            instance.rotation = placement.rotation;
            instance.parent = placement.parent;
        }

        tasks.schedule_after(now, lifetime, TimedTask::ReleaseEffect { handle });
        handle
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&EffectInstance> {
        self.pool(handle.kind).get(handle.index)
    }

    pub(crate) fn get_mut(&mut self, handle: EffectHandle) -> Option<&mut EffectInstance> {
        self.pools[handle.kind.slot()].get_mut(handle.index)
    }

    pub(crate) fn release(&mut self, handle: EffectHandle) -> bool {
        self.pools[handle.kind.slot()].release(handle.index)
    }

    pub fn is_active(&self, handle: EffectHandle) -> bool {
        self.get(handle).is_some_and(|instance| instance.active)
    }
}
