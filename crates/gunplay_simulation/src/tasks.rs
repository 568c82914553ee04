//! Timed tasks (suspend → resume по deadline)
//!
//! Замена coroutine-based reload/auto-disable:
//! - Задача планируется с абсолютным deadline (секунды симуляции)
//! - `poll(now)` раз в tick забирает все задачи с `deadline <= now`
//! - Каждая задача возвращается ровно один раз, в порядке deadline
//! - Cancellation = удаление задачи из списка

use bevy::prelude::*;

use crate::effects::EffectHandle;

/// Id запланированной задачи (счётчик с wrap-around)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Что выполнить по истечении deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedTask {
    /// Завершить reload у weapon holder'а
    CompleteReload { weapon: Entity },
    /// Auto-release pooled эффекта (deactivate + detach)
    ReleaseEffect { handle: EffectHandle },
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    deadline: f64,
    task: TimedTask,
}

/// Список отложенных задач (resource)
#[derive(Resource, Debug, Default)]
pub struct TaskScheduler {
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запланировать задачу на абсолютный момент `deadline`
    pub fn schedule(&mut self, deadline: f64, task: TimedTask) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.push(ScheduledTask { id, deadline, task });
        id
    }

    /// Запланировать задачу через `delay` секунд от `now`
    pub fn schedule_after(&mut self, now: f64, delay: f32, task: TimedTask) -> TaskId {
        self.schedule(now + f64::from(delay.max(0.0)), task)
    }

    /// Отменить задачу. `false` если она уже выполнена или отменена.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|scheduled| scheduled.id != id);
        self.tasks.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|scheduled| scheduled.id == id)
    }

    pub fn deadline(&self, id: TaskId) -> Option<f64> {
        self.tasks
            .iter()
            .find(|scheduled| scheduled.id == id)
            .map(|scheduled| scheduled.deadline)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Забрать все задачи, чей deadline наступил
    ///
    /// Порядок: по deadline, при равенстве — по порядку планирования.
    pub fn poll(&mut self, now: f64) -> Vec<(TaskId, TimedTask)> {
        let mut due = Vec::new();
        self.tasks.retain(|scheduled| {
            if scheduled.deadline <= now {
                due.push(scheduled.clone());
                false
            } else {
                true
            }
        });

        // Stable sort: равные deadline остаются в порядке планирования
        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));

        due.into_iter()
            .map(|scheduled| (scheduled.id, scheduled.task))
            .collect()
    }
}
