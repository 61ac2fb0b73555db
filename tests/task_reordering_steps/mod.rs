//! Step definitions for task reordering scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
