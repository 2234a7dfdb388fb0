//! Drive Fast game library crate.
//!
//! The gameplay core of an endless-driving game: traffic to dodge, coins to collect and a
//! fuel tank that keeps draining. Everything runs inside a `bevy_ecs` world owned by
//! [`game::GameScene`]; rendering and platform concerns live outside this crate.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg_attr(coverage_nightly, coverage(off))]
pub mod error;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod formatter;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod logging;

pub mod config;
pub mod constants;
pub mod events;
pub mod game;
pub mod systems;
