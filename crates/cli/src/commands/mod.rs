//! Command handlers for the Lectern CLI.

pub mod ask;
pub mod chat;
pub mod courses;
pub mod outline;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use courses::CoursesCommand;
pub use outline::OutlineCommand;

use lectern_core::{AppConfig, AppError, AppResult};
use lectern_knowledge::{QueryResponse, RagSystem};
use lectern_llm::create_client;
use std::sync::Arc;

/// Build the answering system and load the configured course folder.
///
/// A missing course folder is not fatal; the assistant then answers from
/// general knowledge only.
pub async fn open_system(config: &AppConfig) -> AppResult<RagSystem> {
    let provider = config.provider.as_str();
    let endpoint = config.resolve_endpoint(provider);
    let api_key = config.resolve_api_key(provider);
    let api_version = config.resolve_api_version(provider);

    let client = create_client(
        provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        api_version.as_deref(),
    )
    .map_err(AppError::Config)?;

    let system = RagSystem::from_config(config, Arc::clone(&client))?;

    let docs = config.resolved_docs_path();
    if docs.is_dir() {
        let stats = system.add_course_folder(&docs, false).await?;
        tracing::info!(
            "Loaded {} courses ({} fragments) from {:?}",
            stats.courses_added,
            stats.fragments_added,
            docs
        );
    } else {
        tracing::warn!("Course folder {:?} not found, no course content loaded", docs);
    }

    Ok(system)
}

/// Print an answer followed by its sources.
pub fn print_response(response: &QueryResponse) {
    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &response.sources {
            println!("  - {}", source);
        }
    }
}
