//! Fire/reload state machine
//!
//! Состояния (вычисляются, не хранятся):
//! - Ready — ammo > 0, cooldown истёк
//! - Cooldown — `now < next_fire_time`
//! - Reloading — есть in-flight ReloadTicket
//!
//! Порядок проверок в `try_fire`:
//! 1. Reloading → Rejected(Reloading)
//! 2. ammo == 0 → auto-reload вместо выстрела (даже во время cooldown)
//! 3. Cooldown → Rejected(Cooldown)
//! 4. Fired: ammo -= 1, next_fire_time = now + 1/fire_rate
//!
//! Reload completion приходит из `TaskScheduler` (deadline = start + reload_duration).

use bevy::prelude::*;

use super::WeaponProfile;
use crate::tasks::{TaskId, TaskScheduler, TimedTask};

/// Почему выстрел отклонён (поглощается контроллером, не ошибка)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Reloading,
    Cooldown,
    /// magazine_size == 0: стрелять и перезаряжать нечем
    EmptyMagazine,
}

/// Результат попытки выстрела
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    Rejected(RejectReason),
    /// Магазин пуст — вместо выстрела запущен reload
    AutoReloadTriggered,
}

/// Результат попытки перезарядки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Started,
    AlreadyReloading,
    MagazineFull,
}

/// Текущая фаза state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponPhase {
    Ready,
    Cooldown,
    Reloading,
}

/// In-flight reload (ссылка на timed task)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReloadTicket {
    pub task: TaskId,
    pub started_at: f64,
    pub completes_at: f64,
}

/// Mutable state экипированного оружия
///
/// Инварианты:
/// - `current_ammo ∈ [0, magazine_size]`
/// - reloading ⇒ выстрел запрещён
/// - один reload cycle восполняет магазин ровно один раз
#[derive(Component, Debug, Clone, PartialEq)]
pub struct WeaponState {
    current_ammo: u32,
    next_fire_time: f64,
    reload: Option<ReloadTicket>,
    shots_fired: u64,
}

impl WeaponState {
    /// Полный магазин, готов к выстрелу
    pub fn new(profile: &WeaponProfile) -> Self {
        Self {
            current_ammo: profile.magazine_size,
            next_fire_time: 0.0,
            reload: None,
            shots_fired: 0,
        }
    }

    pub fn current_ammo(&self) -> u32 {
        self.current_ammo
    }

    pub fn next_fire_time(&self) -> f64 {
        self.next_fire_time
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    pub fn reload_ticket(&self) -> Option<ReloadTicket> {
        self.reload
    }

    /// Всего выстрелов с момента equip
    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    pub fn phase(&self, now: f64) -> WeaponPhase {
        if self.reload.is_some() {
            WeaponPhase::Reloading
        } else if now < self.next_fire_time {
            WeaponPhase::Cooldown
        } else {
            WeaponPhase::Ready
        }
    }

    /// Прогресс перезарядки 0.0 → 1.0 (для HUD)
    pub fn reload_progress(&self, now: f64) -> Option<f32> {
        let ticket = self.reload?;
        let duration = ticket.completes_at - ticket.started_at;
        if duration <= 0.0 {
            return Some(1.0);
        }
        Some(((now - ticket.started_at) / duration).clamp(0.0, 1.0) as f32)
    }

    /// Попытка выстрела
    pub fn try_fire(
        &mut self,
        now: f64,
        profile: &WeaponProfile,
        owner: Entity,
        tasks: &mut TaskScheduler,
    ) -> FireOutcome {
        if self.is_reloading() {
            return FireOutcome::Rejected(RejectReason::Reloading);
        }

        if self.current_ammo == 0 {
            return match self.try_reload(now, profile, owner, tasks) {
                ReloadOutcome::Started => FireOutcome::AutoReloadTriggered,
                // magazine_size == 0 → перезаряжать нечего
                _ => FireOutcome::Rejected(RejectReason::EmptyMagazine),
            };
        }

        if now < self.next_fire_time {
            return FireOutcome::Rejected(RejectReason::Cooldown);
        }

        self.current_ammo -= 1;
        self.next_fire_time = now + profile.fire_interval();
        self.shots_fired += 1;

        FireOutcome::Fired
    }

    /// Попытка перезарядки (no-op если магазин полон или reload уже идёт)
    pub fn try_reload(
        &mut self,
        now: f64,
        profile: &WeaponProfile,
        owner: Entity,
        tasks: &mut TaskScheduler,
    ) -> ReloadOutcome {
        if self.is_reloading() {
            return ReloadOutcome::AlreadyReloading;
        }
        if self.current_ammo >= profile.magazine_size {
            return ReloadOutcome::MagazineFull;
        }

        let task = tasks.schedule_after(
            now,
            profile.reload_duration,
            TimedTask::CompleteReload { weapon: owner },
        );
        self.reload = Some(ReloadTicket {
            task,
            started_at: now,
            completes_at: tasks.deadline(task).unwrap_or(now),
        });

        ReloadOutcome::Started
    }

    /// Завершение reload по timed task
    ///
    /// Stale task (от отменённого/заменённого reload) игнорируется.
    pub fn complete_reload(&mut self, task: TaskId, profile: &WeaponProfile) -> bool {
        match self.reload {
            Some(ticket) if ticket.task == task => {
                self.current_ammo = profile.magazine_size;
                self.reload = None;
                true
            }
            _ => false,
        }
    }

    /// Отменить in-flight reload (unequip / weapon swap)
    pub fn cancel_reload(&mut self, tasks: &mut TaskScheduler) -> bool {
        match self.reload.take() {
            Some(ticket) => {
                tasks.cancel(ticket.task);
                true
            }
            None => false,
        }
    }
}
