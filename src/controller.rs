//! Interactive menu loop.
//!
//! Reads choices line by line, dispatches to the manager and prints results.
//! Whatever ends the loop (the exit choice, closed input, an error or the
//! shutdown signal) the manager is disconnected exactly once afterwards.

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::dialogs::{DialogBuckets, LeaveSelection};
use crate::error::Result;
use crate::manager::{ChatPlatform, LeaveOutcome, TelegramManager};

/// How the interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user picked "Exit".
    Exited,
    /// Standard input was closed.
    InputClosed,
    /// The shutdown signal fired (Ctrl+C).
    Interrupted,
}

pub struct Controller<P: ChatPlatform, R, W> {
    manager: TelegramManager<P>,
    input: R,
    output: W,
}

impl<P, R, W> Controller<P, R, W>
where
    P: ChatPlatform,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(manager: TelegramManager<P>, input: R, output: W) -> Self {
        Self {
            manager,
            input,
            output,
        }
    }

    /// Run the menu until it ends or `shutdown` completes, then disconnect.
    pub async fn run_until<S>(mut self, shutdown: S) -> Result<SessionEnd>
    where
        S: Future<Output = ()>,
    {
        let result = {
            let menu = self.menu_loop();
            tokio::select! {
                biased;
                _ = shutdown => Ok(SessionEnd::Interrupted),
                end = menu => end,
            }
        };

        match &result {
            Ok(SessionEnd::Interrupted) => {
                let _ = writeln!(self.output, "\nProgram terminated by user.");
            }
            Err(err) => {
                let _ = writeln!(self.output, "Error: {}", err);
            }
            Ok(_) => {}
        }

        self.manager.disconnect().await;
        let _ = writeln!(self.output, "Disconnected from Telegram.");
        let _ = self.output.flush();

        result
    }

    async fn menu_loop(&mut self) -> Result<SessionEnd> {
        loop {
            writeln!(self.output, "\n=== TELEGRAM MANAGER ===")?;
            writeln!(self.output, "1. List all chats")?;
            writeln!(self.output, "2. Bulk leave chats")?;
            writeln!(self.output, "3. Exit")?;

            let Some(choice) = self.ask("Select an option: ").await? else {
                return Ok(SessionEnd::InputClosed);
            };

            match choice.as_str() {
                "1" => {
                    writeln!(self.output, "Fetching dialogs...")?;
                    let buckets = self.manager.list_dialogs().await?;
                    render_buckets(&mut self.output, &buckets)?;
                }
                "2" => {
                    if !self.bulk_leave().await? {
                        return Ok(SessionEnd::InputClosed);
                    }
                }
                "3" => return Ok(SessionEnd::Exited),
                _ => writeln!(self.output, "Invalid option. Please try again.")?,
            }
        }
    }

    /// One bulk-leave round. Returns `false` if input closed midway.
    async fn bulk_leave(&mut self) -> Result<bool> {
        writeln!(self.output, "Fetching dialogs...")?;
        let buckets = self.manager.list_dialogs().await?;
        render_buckets(&mut self.output, &buckets)?;

        writeln!(self.output, "\nSelect which type to leave:")?;
        writeln!(self.output, "1. Groups")?;
        writeln!(self.output, "2. Channels")?;
        writeln!(self.output, "3. Both groups and channels")?;

        let Some(choice) = self.ask("Enter your choice (1-3): ").await? else {
            return Ok(false);
        };

        let targets = LeaveSelection::from_choice(&choice)
            .map(|selection| buckets.targets(selection))
            .unwrap_or_default();

        if targets.is_empty() {
            writeln!(self.output, "No chats selected to leave.")?;
            return Ok(true);
        }

        let question = format!(
            "You are about to leave {} chats/channels. Confirm? (y/n): ",
            targets.len()
        );
        let Some(answer) = self.ask(&question).await? else {
            return Ok(false);
        };
        if !answer.eq_ignore_ascii_case("y") {
            writeln!(self.output, "Cancelled. No chats were left.")?;
            return Ok(true);
        }

        let output = &mut self.output;
        let report = self
            .manager
            .leave_many(&targets, |dialog, outcome| {
                let _ = match outcome {
                    None => writeln!(output, "Leaving {}...", dialog.name),
                    Some(LeaveOutcome::Failed(err)) => {
                        writeln!(output, "Error leaving {}: {}", dialog.name, err)
                    }
                    Some(LeaveOutcome::Left) => Ok(()),
                };
            })
            .await;

        writeln!(
            self.output,
            "Successfully left {} out of {} chats/channels.",
            report.succeeded, report.attempted
        )?;
        Ok(true)
    }

    /// Print `prompt` and read one trimmed line; `None` on end of input.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Print the three buckets with 1-based indices.
pub fn render_buckets<H, W: Write>(output: &mut W, buckets: &DialogBuckets<H>) -> std::io::Result<()>
where
    H: Clone,
{
    for (title, dialogs) in buckets.sections() {
        writeln!(output, "\n=== {} ===", title)?;
        for (i, dialog) in dialogs.iter().enumerate() {
            writeln!(output, "{}. {} (ID: {})", i + 1, dialog.name, dialog.id)?;
        }
    }

    if buckets.dropped > 0 {
        writeln!(
            output,
            "\n({} dialogs skipped: deleted or inaccessible)",
            buckets.dropped
        )?;
    }
    Ok(())
}
