//! Cooldown module
//!
//! Suppresses repeat alerts for a key until its block expires

mod tracker;

pub use tracker::CooldownTracker;
