//! Session management for the Telegram client
//!
//! Provides:
//! - File-based session locking to prevent parallel execution
//! - Opening the SQLite session storage
//! - Client creation and the interactive login flow

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fs2::FileExt;
use grammers_client::client::updates::UpdatesLike;
use grammers_client::{Client, SignInError};
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Credentials;
use crate::error::{Error, Result};

const RUNNER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the session database for a session name.
pub fn session_file(name: &str) -> PathBuf {
    PathBuf::from(format!("{}.session", name))
}

/// Path of the lock file guarding a session name.
pub fn lock_file(name: &str) -> PathBuf {
    PathBuf::from(format!("{}.lock", name))
}

/// Session lock guard that ensures exclusive access to the Telegram session.
pub struct SessionLock {
    path: PathBuf,
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock at `path`.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                lock_file: Some(lock_file),
            }),
            Err(_) => {
                eprintln!(
                    r#"
Error: this Telegram session is already in use by another process.

Running two clients on one session at the same time leads to conflicts.
Wait for the other process to finish and try again.
"#
                );
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        let Some(file) = self.lock_file.take() else {
            return;
        };
        let _ = file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open (or create) the session database.
pub fn open_session<P: AsRef<Path>>(path: P) -> Result<Arc<SqliteSession>> {
    let session = SqliteSession::open(path.as_ref())
        .map_err(|e| Error::SessionStorage(format!("{}: {}", path.as_ref().display(), e)))?;
    Ok(Arc::new(session))
}

/// Holder for SenderPool components and Client
pub struct TelegramSession {
    pub client: Client,
    handle: SenderPoolHandle,
    runner: Mutex<Option<JoinHandle<()>>>,
    // Updates are not consumed, but the pool expects a live receiver.
    _updates: mpsc::UnboundedReceiver<UpdatesLike>,
}

impl TelegramSession {
    /// Start the sender pool on `session` and make sure the account is
    /// signed in, prompting on the terminal when it is not.
    pub async fn connect(credentials: &Credentials, session: Arc<SqliteSession>) -> Result<Self> {
        let pool = SenderPool::new(session, credentials.api_id);

        let client = Client::new(&pool);

        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner = tokio::spawn(async move {
            runner.run().await;
        });

        let connected = Self {
            client,
            handle,
            runner: Mutex::new(Some(runner)),
            _updates: updates,
        };

        if let Err(err) = connected.authorize(credentials).await {
            connected.shutdown().await;
            return Err(err);
        }

        info!(phone = %credentials.phone, "Connected to Telegram");
        Ok(connected)
    }

    async fn authorize(&self, credentials: &Credentials) -> Result<()> {
        if self.client.is_authorized().await? {
            return Ok(());
        }

        println!("Signing in as {}...", credentials.phone);
        let token = self
            .client
            .request_login_code(&credentials.phone, &credentials.api_hash)
            .await
            .map_err(|e| Error::AuthorizationFailed(format!("Failed to request code: {}", e)))?;

        let code = prompt("Enter the code you received from Telegram: ")?;

        let user = match self.client.sign_in(&token, &code).await {
            Ok(user) => user,
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().unwrap_or("none").to_string();
                let password = prompt(&format!("Enter your 2FA password (hint: {}): ", hint))?;
                self.client
                    .check_password(password_token, password.as_bytes())
                    .await
                    .map_err(|e| Error::AuthorizationFailed(e.to_string()))?
            }
            Err(e) => return Err(Error::AuthorizationFailed(e.to_string())),
        };

        println!(
            "Signed in as {} (@{})",
            user.full_name(),
            user.username().unwrap_or("no username")
        );
        Ok(())
    }

    /// Stop the sender pool and wait for its runner. Safe to call twice.
    pub async fn shutdown(&self) {
        let runner = match self.runner.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(runner) = runner else {
            return;
        };

        let _ = self.handle.quit();

        let abort = runner.abort_handle();
        if tokio::time::timeout(RUNNER_SHUTDOWN_TIMEOUT, runner)
            .await
            .is_err()
        {
            warn!("Sender pool did not stop in time, aborting it");
            abort.abort();
        }
    }
}

// Implement Deref to allow using TelegramSession as &Client
impl std::ops::Deref for TelegramSession {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Read one line for the login flow.
///
/// `tokio::io::stdin` reads through the same global `std::io::stdin` buffer,
/// so lines typed ahead here are still seen by the menu later.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(Error::AuthorizationFailed(
            "input closed before login finished".to_string(),
        ));
    }
    Ok(input.trim().to_string())
}
