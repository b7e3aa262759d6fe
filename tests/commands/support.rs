//! In-memory platform used to drive the manager and the menu.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use telegram_manager::{ChatPlatform, Dialog, EntityTag, Error, Result, TelegramManager};

#[derive(Clone, Default)]
pub struct Calls {
    pub fetches: Arc<AtomicUsize>,
    pub leaves: Arc<Mutex<Vec<(i64, Instant)>>>,
    pub disconnects: Arc<AtomicUsize>,
}

impl Calls {
    pub fn left_ids(&self) -> Vec<i64> {
        self.leaves.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn leave_times(&self) -> Vec<Instant> {
        self.leaves.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

pub struct MockPlatform {
    dialogs: Vec<Dialog<i64>>,
    rejected: HashSet<i64>,
    fail_fetch: bool,
    calls: Calls,
}

impl MockPlatform {
    pub fn new(dialogs: Vec<Dialog<i64>>) -> Self {
        Self {
            dialogs,
            rejected: HashSet::new(),
            fail_fetch: false,
            calls: Calls::default(),
        }
    }

    pub fn rejecting(mut self, ids: &[i64]) -> Self {
        self.rejected.extend(ids);
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }

    pub fn into_manager(self) -> (TelegramManager<MockPlatform>, Calls) {
        let calls = self.calls();
        (TelegramManager::new(self), calls)
    }
}

impl ChatPlatform for MockPlatform {
    type Handle = i64;

    async fn fetch_dialogs(&self) -> Result<Vec<Dialog<i64>>> {
        self.calls.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(Error::TelegramError("connection reset".into()));
        }
        Ok(self.dialogs.clone())
    }

    async fn leave(&self, dialog: &Dialog<i64>) -> Result<()> {
        self.calls
            .leaves
            .lock()
            .unwrap()
            .push((dialog.handle, Instant::now()));
        if self.rejected.contains(&dialog.id) {
            return Err(Error::TelegramError("CHAT_ADMIN_REQUIRED".into()));
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.calls.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn group(name: &str, id: i64) -> Dialog<i64> {
    Dialog::new(name, id, EntityTag::Group, id)
}

pub fn channel(name: &str, id: i64) -> Dialog<i64> {
    Dialog::new(name, id, EntityTag::Channel, id)
}

pub fn user(name: &str, id: i64) -> Dialog<i64> {
    Dialog::new(name, id, EntityTag::User, id)
}
