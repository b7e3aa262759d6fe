//! Dialog listing and bulk leaving on top of a chat platform.
//!
//! Provides:
//! - The `ChatPlatform` seam implemented by the grammers client (and by
//!   test doubles)
//! - `TelegramManager`, which owns the connection for the whole run
//! - Per-dialog leave outcomes and the serial, throttled bulk leave

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::dialogs::{Dialog, DialogBuckets};
use crate::error::{Error, Result};

/// Pause after every leave attempt to stay under Telegram's flood limits.
pub const LEAVE_DELAY: Duration = Duration::from_millis(500);

/// Operations the manager needs from a connected messaging client.
#[allow(async_fn_in_trait)]
pub trait ChatPlatform {
    /// Platform object a dialog carries so it can be acted upon later.
    type Handle: Clone;

    /// Fetch every dialog of the account, following pagination to the end.
    async fn fetch_dialogs(&self) -> Result<Vec<Dialog<Self::Handle>>>;

    /// Leave (or delete) a single dialog.
    async fn leave(&self, dialog: &Dialog<Self::Handle>) -> Result<()>;

    /// Close the connection.
    async fn disconnect(&self);
}

/// Result of a single leave attempt.
#[derive(Debug)]
pub enum LeaveOutcome {
    Left,
    Failed(Error),
}

impl LeaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LeaveOutcome::Left)
    }
}

/// A dialog that could not be left, with the reason.
#[derive(Debug)]
pub struct LeaveFailure {
    pub name: String,
    pub id: i64,
    pub error: Error,
}

/// Summary of a bulk leave.
#[derive(Debug, Default)]
pub struct BulkLeaveReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<LeaveFailure>,
}

impl BulkLeaveReport {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Owns the single platform connection for the lifetime of the program.
pub struct TelegramManager<P: ChatPlatform> {
    platform: P,
    delay: Duration,
    connected: bool,
}

impl<P: ChatPlatform> TelegramManager<P> {
    /// Wrap an already connected platform.
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            delay: LEAVE_DELAY,
            connected: true,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Fetch all dialogs and split them into groups, channels and private chats.
    pub async fn list_dialogs(&self) -> Result<DialogBuckets<P::Handle>> {
        let dialogs = self.platform.fetch_dialogs().await?;
        let fetched = dialogs.len();
        let buckets = DialogBuckets::partition(dialogs);

        debug!(
            fetched,
            groups = buckets.groups.len(),
            channels = buckets.channels.len(),
            private_chats = buckets.private_chats.len(),
            dropped = buckets.dropped,
            "Dialogs fetched"
        );

        Ok(buckets)
    }

    /// Leave one dialog. Platform errors are returned as a value.
    ///
    /// Progress is only logged at debug level; the menu prints its own lines.
    pub async fn leave_one(&self, dialog: &Dialog<P::Handle>) -> LeaveOutcome {
        debug!(dialog = %dialog.name, id = dialog.id, "Leaving dialog");

        match self.platform.leave(dialog).await {
            Ok(()) => LeaveOutcome::Left,
            Err(err) => {
                debug!(dialog = %dialog.name, id = dialog.id, error = %err, "Leave failed");
                LeaveOutcome::Failed(err)
            }
        }
    }

    /// Leave dialogs one by one, in order, pausing after every attempt.
    ///
    /// `on_progress` is called before each attempt with `None` and after it
    /// with the outcome, so callers can render progress.
    pub async fn leave_many<F>(
        &self,
        dialogs: &[Dialog<P::Handle>],
        mut on_progress: F,
    ) -> BulkLeaveReport
    where
        F: FnMut(&Dialog<P::Handle>, Option<&LeaveOutcome>),
    {
        let mut report = BulkLeaveReport::default();

        for dialog in dialogs {
            on_progress(dialog, None);

            let outcome = self.leave_one(dialog).await;
            on_progress(dialog, Some(&outcome));

            report.attempted += 1;
            match outcome {
                LeaveOutcome::Left => report.succeeded += 1,
                LeaveOutcome::Failed(error) => report.failures.push(LeaveFailure {
                    name: dialog.name.clone(),
                    id: dialog.id,
                    error,
                }),
            }

            sleep(self.delay).await;
        }

        debug!(
            succeeded = report.succeeded,
            attempted = report.attempted,
            "Bulk leave finished"
        );

        report
    }

    /// Close the connection. Calling it again is a no-op.
    pub async fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.platform.disconnect().await;
        debug!("Disconnected from Telegram");
    }
}
