//! Value types shared between the steps engine and the steps server.
mod points;

pub mod helpers;
pub mod op;
mod secret;

pub use points::{Points, PointsConversionError};
pub use secret::Secret;
