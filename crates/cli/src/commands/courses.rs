//! Courses command handler.

use super::open_system;
use clap::Args;
use lectern_core::{AppConfig, AppResult};

/// List loaded courses
#[derive(Args, Debug)]
pub struct CoursesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CoursesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing courses command");

        let system = open_system(config).await?;
        let analytics = system.get_analytics().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analytics)?);
            return Ok(());
        }

        println!("Total courses: {}", analytics.total_courses);
        for title in &analytics.course_titles {
            println!("  - {}", title);
        }

        Ok(())
    }
}
