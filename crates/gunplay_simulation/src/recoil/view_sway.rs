//! Weapon-view sway + bob (procedural, без анимаций)
//!
//! Position: sway от look delta + bob от движения → smooth-damp к target.
//! Rotation: look delta → euler offset → slerp (factor dt × 10).
//! Bob timer сбрасывается, когда movement² < 0.1 (стоим на месте).

use bevy::prelude::*;

/// Per-frame input для view model (заполняет внешний input collaborator)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewInput {
    /// Look delta (mouse axes)
    pub look: Vec2,
    /// Movement axes (strafe, forward)
    pub movement: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwaySettings {
    pub position_amount: f32,
    /// Градусы на единицу look delta
    pub rotation_amount: f32,
    pub smooth_time: f32,
    pub bob_amount: f32,
    pub bob_speed: f32,
    pub rotation_smoothing: f32,
}

impl Default for SwaySettings {
    fn default() -> Self {
        Self {
            position_amount: 0.02,
            rotation_amount: 1.5,
            smooth_time: 0.08,
            bob_amount: 0.02,
            bob_speed: 8.0,
            rotation_smoothing: 10.0,
        }
    }
}

/// Offset view model'а относительно rest pose (local space камеры)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ViewSway {
    pub settings: SwaySettings,
    offset: Vec3,
    velocity: Vec3,
    rotation: Quat,
    bob_timer: f32,
}

impl Default for ViewSway {
    fn default() -> Self {
        Self::new(SwaySettings::default())
    }
}

impl ViewSway {
    pub fn new(settings: SwaySettings) -> Self {
        Self {
            settings,
            offset: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            bob_timer: 0.0,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn bob_timer(&self) -> f32 {
        self.bob_timer
    }

    pub fn update(&mut self, input: ViewInput, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let target = self.sway_offset(input.look) + self.bob_offset(input.movement, dt);
        self.offset = smooth_damp(self.offset, target, &mut self.velocity, self.settings.smooth_time, dt);

        let amount = self.settings.rotation_amount;
        let target_rotation = Quat::from_euler(
            EulerRot::YXZ,
            (-input.look.x * amount).to_radians(),
            (input.look.y * amount).to_radians(),
            (-input.look.x * amount).to_radians(),
        );
        let factor = (dt * self.settings.rotation_smoothing).clamp(0.0, 1.0);
        // Повторный slerp накапливает ошибку длины
        self.rotation = self.rotation.slerp(target_rotation, factor).normalize();
    }

    fn sway_offset(&self, look: Vec2) -> Vec3 {
        Vec3::new(
            -look.x * self.settings.position_amount,
            -look.y * self.settings.position_amount,
            0.0,
        )
    }

    fn bob_offset(&mut self, movement: Vec2, dt: f32) -> Vec3 {
        if movement.length_squared() < 0.1 {
            self.bob_timer = 0.0;
            return Vec3::ZERO;
        }

        self.bob_timer += dt * self.settings.bob_speed;
        Vec3::new(
            self.bob_timer.sin() * self.settings.bob_amount * 0.5,
            (self.bob_timer * 2.0).cos() * self.settings.bob_amount,
            0.0,
        )
    }
}

/// Critically damped spring (Game Programming Gems 4, 1.10)
pub fn smooth_damp(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Не проскакиваем target
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }

    output
}
