//! Arena grid and coordinate transform

mod field;
mod transform;

pub use field::{Cell, FieldGrid};
pub use transform::{GridCell, GridTransform};
