//! Core types, aggregation and heuristic scoring for the adaptive landing service.

pub mod aggregate;
pub mod error;
pub mod events;
pub mod landing;
pub mod limits;
pub mod persona;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod suggestion;
pub mod variant;

pub use aggregate::*;
pub use error::{Error, Result};
pub use events::*;
pub use landing::*;
pub use persona::*;
pub use scoring::*;
pub use session::*;
pub use settings::*;
pub use suggestion::*;
pub use variant::*;
