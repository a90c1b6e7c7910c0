//! Retrieval-augmented answering over course materials.
//!
//! `RagSystem` is the entry point. Generation is polymorphic over the chat
//! backend's tool capability, see [`generator`].

pub mod emulated;
pub mod generator;
pub mod heuristics;
pub mod native;
pub mod system;
pub mod types;

pub use generator::{create_generator, GenerationSettings, ResponseGenerator, TurnPhase};
pub use system::RagSystem;
pub use types::{CourseAnalytics, QueryResponse};
