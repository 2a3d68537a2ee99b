//! Domain layer: plugin risk entities, pure parsing/normalization services
//! and scoring policies. Nothing here performs I/O.

pub mod domain;
pub mod policies;
pub mod services;
