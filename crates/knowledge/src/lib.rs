//! Course knowledge and question answering.
//!
//! Course documents are parsed and chunked into a semantic store. Queries go
//! through a response generator that retrieves course content with tools,
//! either requested by the model or run up front from the query text, and
//! answers with citations for the content it used.

pub mod embeddings;
pub mod ingest;
pub mod models;
pub mod rag;
pub mod session;
pub mod store;
pub mod tools;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use ingest::{load_course_folder, IngestStats};
pub use models::{ContentFragment, Course, Lesson};
pub use rag::{CourseAnalytics, QueryResponse, RagSystem};
pub use session::ConversationBuffer;
pub use store::{MemoryStore, SearchFilter, SearchHit, SemanticStore};
pub use tools::{Tool, ToolOutput, ToolRegistry, ToolStatus};
