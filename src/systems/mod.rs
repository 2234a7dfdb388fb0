//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod collision;
pub mod components;
pub mod difficulty;
pub mod factory;
pub mod input;
pub mod lifetime;
pub mod movement;
pub mod session;
pub mod spawner;
pub mod state;

pub use components::*;
