//! Ordered task lists.
//!
//! A list exclusively owns its tasks; each task carries an integer order
//! that is contiguous within its list. The module follows hexagonal
//! architecture:
//!
//! - Domain types and the order engine in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The reconciliation service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
