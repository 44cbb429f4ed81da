//! Domain layer: configuration trees, settings and the ports the setup core
//! depends on.

pub mod errors;
pub mod models;
pub mod ports;
