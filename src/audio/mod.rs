//! Audio backend abstraction and the built-in simulated backend

mod backend;
pub mod error;
mod simulated;

pub use backend::AudioBackend;
pub use error::AudioError;
pub use simulated::SimulatedBackend;
