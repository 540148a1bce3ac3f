//! Domain layer: entities, resolution outcomes, and repository traits.

pub mod entities;
pub mod repositories;
pub mod resolve;
