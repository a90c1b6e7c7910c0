//! Outline command handler.

use super::open_system;
use clap::Args;
use lectern_core::{AppConfig, AppError, AppResult};

/// Show the outline of a course
#[derive(Args, Debug)]
pub struct OutlineCommand {
    /// Course title or part of it
    pub course: Vec<String>,
}

impl OutlineCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing outline command");

        let name = self.course.join(" ");
        if name.trim().is_empty() {
            return Err(AppError::Config("No course name provided".to_string()));
        }

        let system = open_system(config).await?;
        let output = system.course_outline(name.trim()).await;

        if output.is_found() {
            println!("{}", output.content);
            Ok(())
        } else {
            Err(AppError::Knowledge(output.content))
        }
    }
}
