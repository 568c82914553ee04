//! Weapon domain — профиль, fire/reload state machine, events
//!
//! Содержит:
//! - WeaponProfile / WeaponCatalog (immutable config, RON)
//! - WeaponState (ammo, cooldown, reload ticket)
//! - Intents + result events

pub mod events;
pub mod profile;
pub mod state;


pub use events::*;
pub use profile::*;
pub use state::*;
