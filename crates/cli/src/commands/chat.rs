//! Interactive chat command handler.

use super::{open_system, print_response};
use clap::Args;
use lectern_core::{AppConfig, AppResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Resume an existing session id
    #[arg(short, long)]
    pub session: Option<String>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let system = open_system(config).await?;
        let mut session = self
            .session
            .clone()
            .unwrap_or_else(|| system.create_session());

        let analytics = system.get_analytics().await?;
        println!(
            "Lectern chat ({} courses loaded). Type 'exit' to quit, '/new' for a new session.",
            analytics.total_courses
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();

            match question {
                "" => continue,
                "exit" | "quit" => break,
                "/new" => {
                    session = system.create_session();
                    println!("Started a new session.");
                    continue;
                }
                _ => {}
            }

            let response = system.query(question, Some(&session)).await?;
            print_response(&response);
            println!();
        }

        tracing::debug!(session = %session, "Chat ended");
        Ok(())
    }
}
