//! Dialog snapshots and their classification into buckets.

use serde::Serialize;
use tracing::warn;

/// What kind of object a dialog points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityTag {
    Channel,
    Group,
    User,
    /// Empty, forbidden or deactivated objects that cannot be acted upon.
    Unrecognized(String),
}

impl EntityTag {
    pub fn label(&self) -> &str {
        match self {
            EntityTag::Channel => "channel",
            EntityTag::Group => "group",
            EntityTag::User => "user",
            EntityTag::Unrecognized(_) => "unknown",
        }
    }
}

/// A conversation as returned by the platform.
///
/// `H` is whatever the platform needs to act on the dialog later (a
/// grammers `Peer` in production).
#[derive(Debug, Clone)]
pub struct Dialog<H> {
    pub name: String,
    pub id: i64,
    pub tag: EntityTag,
    pub handle: H,
}

impl<H> Dialog<H> {
    pub fn new(name: impl Into<String>, id: i64, tag: EntityTag, handle: H) -> Self {
        Self {
            name: name.into(),
            id,
            tag,
            handle,
        }
    }

    pub fn summary(&self) -> DialogSummary {
        DialogSummary {
            name: self.name.clone(),
            id: self.id,
            kind: self.tag.label().to_string(),
        }
    }
}

/// Serializable view of a dialog for `list --format json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogSummary {
    pub name: String,
    pub id: i64,
    pub kind: String,
}

/// Serializable view of all buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketsSummary {
    pub groups: Vec<DialogSummary>,
    pub channels: Vec<DialogSummary>,
    pub private_chats: Vec<DialogSummary>,
    pub dropped: usize,
}

/// Which buckets a bulk leave should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveSelection {
    Groups,
    Channels,
    Both,
}

impl LeaveSelection {
    /// Parse the sub-menu answer ("1", "2" or "3").
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(LeaveSelection::Groups),
            "2" => Some(LeaveSelection::Channels),
            "3" => Some(LeaveSelection::Both),
            _ => None,
        }
    }
}

/// Dialogs partitioned by tag, input order preserved within each bucket.
#[derive(Debug, Clone)]
pub struct DialogBuckets<H> {
    pub groups: Vec<Dialog<H>>,
    pub channels: Vec<Dialog<H>>,
    pub private_chats: Vec<Dialog<H>>,
    /// Dialogs with an unrecognized tag that were left out.
    pub dropped: usize,
}

impl<H> Default for DialogBuckets<H> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            channels: Vec::new(),
            private_chats: Vec::new(),
            dropped: 0,
        }
    }
}

impl<H: Clone> DialogBuckets<H> {
    /// Split a fetched dialog list into groups, channels and private chats.
    pub fn partition(dialogs: Vec<Dialog<H>>) -> Self {
        let mut buckets = Self::default();

        for dialog in dialogs {
            match dialog.tag {
                EntityTag::Group => buckets.groups.push(dialog),
                EntityTag::Channel => buckets.channels.push(dialog),
                EntityTag::User => buckets.private_chats.push(dialog),
                EntityTag::Unrecognized(ref reason) => {
                    warn!(
                        dialog = %dialog.name,
                        id = dialog.id,
                        %reason,
                        "Skipping dialog with unrecognized entity"
                    );
                    buckets.dropped += 1;
                }
            }
        }

        buckets
    }

    /// Targets for a bulk leave; groups come before channels.
    pub fn targets(&self, selection: LeaveSelection) -> Vec<Dialog<H>> {
        let mut targets = Vec::new();
        if matches!(selection, LeaveSelection::Groups | LeaveSelection::Both) {
            targets.extend(self.groups.iter().cloned());
        }
        if matches!(selection, LeaveSelection::Channels | LeaveSelection::Both) {
            targets.extend(self.channels.iter().cloned());
        }
        targets
    }

    pub fn total(&self) -> usize {
        self.groups.len() + self.channels.len() + self.private_chats.len()
    }

    pub fn summary(&self) -> BucketsSummary {
        let summarize = |dialogs: &[Dialog<H>]| -> Vec<DialogSummary> {
            dialogs.iter().map(Dialog::summary).collect()
        };
        BucketsSummary {
            groups: summarize(&self.groups),
            channels: summarize(&self.channels),
            private_chats: summarize(&self.private_chats),
            dropped: self.dropped,
        }
    }

    /// Sections in display order.
    pub fn sections(&self) -> [(&'static str, &[Dialog<H>]); 3] {
        [
            ("GROUPS", self.groups.as_slice()),
            ("CHANNELS", self.channels.as_slice()),
            ("PRIVATE CHATS", self.private_chats.as_slice()),
        ]
    }
}
