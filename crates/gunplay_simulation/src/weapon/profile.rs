//! Weapon profile — immutable data оружия (загружается один раз)
//!
//! Architecture Decision:
//! - Profile хранит только конфиг (fire rate, магазин, recoil, spread)
//! - Mutable state (ammo, cooldown, reload) живёт отдельно в `WeaponState`
//! - Валидация на загрузке: нарушение = fatal config error при старте,
//!   а не ошибка во время выстрела
//!
//! Формат: RON (`assets/weapons.ron`), все поля опциональны (defaults = pistol).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ballistics::LayerMask;

/// Ошибки загрузки/валидации weapon profiles
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read weapon catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed weapon catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("weapon '{weapon}': {field} {reason}")]
    Invalid {
        weapon: String,
        field: &'static str,
        reason: &'static str,
    },

    #[error("weapon '{0}' is defined twice")]
    Duplicate(String),

    #[error("unknown weapon '{0}'")]
    UnknownWeapon(String),
}

/// Recoil impulse на выстрел (градусы)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct RecoilKick {
    /// Вертикальный kick (pitch вверх)
    pub vertical: f32,
    /// Горизонтальный kick (yaw, симметричный разброс ±)
    pub horizontal: f32,
}

impl Default for RecoilKick {
    fn default() -> Self {
        Self {
            vertical: 1.0,
            horizontal: 2.0,
        }
    }
}

/// Симметричные границы накопленного recoil (градусы)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct RecoilClamp {
    pub vertical: f32,
    pub horizontal: f32,
}

impl Default for RecoilClamp {
    fn default() -> Self {
        Self {
            vertical: 20.0,
            horizontal: 6.0,
        }
    }
}

/// Способ доставки выстрела
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum ShotDelivery {
    /// Мгновенный ray cast
    #[default]
    Hitscan,
    /// Летящий projectile (segment ray cast каждый tick)
    Projectile,
}

/// Weapon profile component
///
/// Defaults = пистолет из прототипа (5 выстр/с, 12 патронов, reload 1.5s).
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct WeaponProfile {
    /// Имя оружия (ключ в каталоге)
    pub name: String,

    /// Какие слои принимают попадания
    pub target_layers: LayerMask,

    /// Дальность выстрела (метры)
    pub max_range: f32,

    /// Выстрелов в секунду
    pub fire_rate: f32,

    /// Урон за попадание
    pub damage: u32,

    /// Патронов в магазине
    pub magazine_size: u32,

    /// Длительность перезарядки (секунды)
    pub reload_duration: f32,

    pub recoil_kick: RecoilKick,

    /// Как быстро current recoil догоняет target
    pub recoil_kick_speed: f32,

    /// Как быстро target recoil возвращается к нулю
    pub recoil_return_speed: f32,

    pub recoil_clamp: RecoilClamp,

    /// Скорость tracer / projectile (м/с)
    pub projectile_speed: f32,

    /// Spread half-angle (градусы). 0 = идеальный hit-scan.
    pub spread_angle: f32,

    pub delivery: ShotDelivery,

    /// Сила camera shake impulse на выстрел (0 = без shake)
    pub camera_shake: f32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self::pistol()
    }
}

impl WeaponProfile {
    /// Пистолет (hitscan, полуавтомат)
    pub fn pistol() -> Self {
        Self {
            name: "Pistol".to_string(),
            target_layers: LayerMask::ALL,
            max_range: 50.0,
            fire_rate: 5.0,
            damage: 25,
            magazine_size: 12,
            reload_duration: 1.5,
            recoil_kick: RecoilKick::default(),
            recoil_kick_speed: 25.0,
            recoil_return_speed: 15.0,
            recoil_clamp: RecoilClamp::default(),
            projectile_speed: 120.0,
            spread_angle: 1.5,
            delivery: ShotDelivery::Hitscan,
            camera_shake: 0.0,
        }
    }

    /// Автоматическая винтовка (hitscan)
    pub fn rifle() -> Self {
        Self {
            name: "Rifle".to_string(),
            max_range: 100.0,
            fire_rate: 10.0,
            damage: 18,
            magazine_size: 30,
            reload_duration: 2.2,
            recoil_kick: RecoilKick {
                vertical: 0.6,
                horizontal: 0.8,
            },
            recoil_kick_speed: 30.0,
            recoil_return_speed: 10.0,
            projectile_speed: 300.0,
            spread_angle: 0.8,
            camera_shake: 0.2,
            ..Self::pistol()
        }
    }

    /// Гранатомёт (projectile delivery)
    pub fn launcher() -> Self {
        Self {
            name: "Launcher".to_string(),
            max_range: 80.0,
            fire_rate: 1.0,
            damage: 90,
            magazine_size: 1,
            reload_duration: 2.5,
            recoil_kick: RecoilKick {
                vertical: 4.0,
                horizontal: 1.0,
            },
            recoil_kick_speed: 20.0,
            recoil_return_speed: 6.0,
            projectile_speed: 40.0,
            spread_angle: 0.0,
            delivery: ShotDelivery::Projectile,
            camera_shake: 1.0,
            ..Self::pistol()
        }
    }

    /// Минимальный интервал между выстрелами (секунды)
    pub fn fire_interval(&self) -> f64 {
        1.0 / f64::from(self.fire_rate)
    }

    /// Проверка инвариантов профиля
    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |field: &'static str, reason: &'static str| ProfileError::Invalid {
            weapon: self.name.clone(),
            field,
            reason,
        };

        let finite = [
            ("max_range", self.max_range),
            ("fire_rate", self.fire_rate),
            ("reload_duration", self.reload_duration),
            ("recoil_kick.vertical", self.recoil_kick.vertical),
            ("recoil_kick.horizontal", self.recoil_kick.horizontal),
            ("recoil_kick_speed", self.recoil_kick_speed),
            ("recoil_return_speed", self.recoil_return_speed),
            ("recoil_clamp.vertical", self.recoil_clamp.vertical),
            ("recoil_clamp.horizontal", self.recoil_clamp.horizontal),
            ("projectile_speed", self.projectile_speed),
            ("spread_angle", self.spread_angle),
            ("camera_shake", self.camera_shake),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }

        if self.name.trim().is_empty() {
            return Err(invalid("name", "must not be empty"));
        }
        if self.fire_rate <= 0.0 {
            return Err(invalid("fire_rate", "must be > 0"));
        }
        if self.reload_duration < 0.0 {
            return Err(invalid("reload_duration", "must be >= 0"));
        }
        if self.max_range <= 0.0 {
            return Err(invalid("max_range", "must be > 0"));
        }
        if self.projectile_speed <= 0.0 {
            return Err(invalid("projectile_speed", "must be > 0"));
        }
        if !(0.0..90.0).contains(&self.spread_angle) {
            return Err(invalid("spread_angle", "must be in [0, 90)"));
        }
        if self.recoil_kick_speed < 0.0 || self.recoil_return_speed < 0.0 {
            return Err(invalid("recoil speed", "must be >= 0"));
        }
        if self.recoil_clamp.vertical < 0.0 || self.recoil_clamp.horizontal < 0.0 {
            return Err(invalid("recoil_clamp", "must be >= 0"));
        }
        if self.camera_shake < 0.0 {
            return Err(invalid("camera_shake", "must be >= 0"));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    weapons: Vec<WeaponProfile>,
}

/// Каталог профилей (загружается при старте, дальше read-only)
#[derive(Resource, Debug, Clone, Default)]
pub struct WeaponCatalog {
    profiles: Vec<WeaponProfile>,
}

impl WeaponCatalog {
    /// Встроенный каталог (`assets/weapons.ron`)
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_ron_str(include_str!("../../assets/weapons.ron"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ProfileError> {
        let file: CatalogFile = ron::from_str(source)?;
        Self::from_profiles(file.weapons)
    }

    pub fn from_profiles(profiles: Vec<WeaponProfile>) -> Result<Self, ProfileError> {
        for (index, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if profiles[..index].iter().any(|other| other.name == profile.name) {
                return Err(ProfileError::Duplicate(profile.name.clone()));
            }
        }

        crate::logger::log_info(&format!(
            "Weapon catalog loaded: {} profiles",
            profiles.len()
        ));

        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Result<&WeaponProfile, ProfileError> {
        self.profiles
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| ProfileError::UnknownWeapon(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|profile| profile.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
