//! `ChatPlatform` backed by the grammers MTProto client.

use grammers_client::types::peer::Peer;
use grammers_tl_types as tl;
use tracing::debug;

use crate::config::Credentials;
use crate::dialogs::{Dialog, EntityTag};
use crate::error::{Error, Result};
use crate::manager::{ChatPlatform, TelegramManager};
use crate::session::{open_session, session_file, TelegramSession};

/// Open the named session, sign in if needed and wrap the client in a manager.
pub async fn connect(
    credentials: &Credentials,
    session_name: &str,
) -> Result<TelegramManager<TelegramPlatform>> {
    let storage = open_session(session_file(session_name))?;
    let session = TelegramSession::connect(credentials, storage).await?;
    Ok(TelegramManager::new(TelegramPlatform::new(session)))
}

pub struct TelegramPlatform {
    session: TelegramSession,
}

impl TelegramPlatform {
    pub fn new(session: TelegramSession) -> Self {
        Self { session }
    }
}

impl ChatPlatform for TelegramPlatform {
    type Handle = Peer;

    async fn fetch_dialogs(&self) -> Result<Vec<Dialog<Peer>>> {
        let mut fetched = Vec::new();
        let mut dialogs = self.session.iter_dialogs();

        while let Some(dialog) = dialogs.next().await? {
            let peer = dialog.peer.clone();
            fetched.push(Dialog::new(
                peer_title(&peer),
                peer_id(&peer),
                classify_peer(&peer),
                peer,
            ));
        }

        debug!(count = fetched.len(), "Fetched dialogs from Telegram");
        Ok(fetched)
    }

    async fn leave(&self, dialog: &Dialog<Peer>) -> Result<()> {
        match leave_request(&dialog.handle) {
            Some(LeaveRequest::Channel(channel)) => {
                self.session
                    .invoke(&tl::functions::channels::LeaveChannel { channel })
                    .await?;
            }
            Some(LeaveRequest::BasicGroup { chat_id, peer }) => {
                self.session
                    .invoke(&tl::functions::messages::DeleteChatUser {
                        revoke_history: false,
                        chat_id,
                        user_id: tl::enums::InputUser::UserSelf,
                    })
                    .await?;
                self.session.invoke(&delete_history(peer)).await?;
            }
            Some(LeaveRequest::Private(peer)) => {
                self.session.invoke(&delete_history(peer)).await?;
            }
            None => return Err(Error::UnsupportedDialog(dialog.name.clone())),
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.session.shutdown().await;
    }
}

/// Raw call needed to get rid of a dialog.
#[derive(Debug, Clone, PartialEq)]
enum LeaveRequest {
    /// Broadcast channels and supergroups.
    Channel(tl::enums::InputChannel),
    /// Legacy small groups: remove ourselves, then drop the history.
    BasicGroup {
        chat_id: i64,
        peer: tl::enums::InputPeer,
    },
    /// One-to-one chats only have history to delete.
    Private(tl::enums::InputPeer),
}

fn leave_request(peer: &Peer) -> Option<LeaveRequest> {
    match peer {
        Peer::Channel(channel) => Some(LeaveRequest::Channel(input_channel(
            channel.raw.id,
            channel.raw.access_hash,
        ))),
        Peer::Group(group) => match &group.raw {
            tl::enums::Chat::Chat(c) => Some(LeaveRequest::BasicGroup {
                chat_id: c.id,
                peer: tl::enums::InputPeer::Chat(tl::types::InputPeerChat { chat_id: c.id }),
            }),
            tl::enums::Chat::Channel(c) => {
                Some(LeaveRequest::Channel(input_channel(c.id, c.access_hash)))
            }
            _ => None,
        },
        Peer::User(user) => match &user.raw {
            tl::enums::User::User(u) => Some(LeaveRequest::Private(tl::enums::InputPeer::User(
                tl::types::InputPeerUser {
                    user_id: u.id,
                    access_hash: u.access_hash.unwrap_or(0),
                },
            ))),
            tl::enums::User::Empty(_) => None,
        },
    }
}

fn input_channel(channel_id: i64, access_hash: Option<i64>) -> tl::enums::InputChannel {
    tl::enums::InputChannel::Channel(tl::types::InputChannel {
        channel_id,
        access_hash: access_hash.unwrap_or(0),
    })
}

fn delete_history(peer: tl::enums::InputPeer) -> tl::functions::messages::DeleteHistory {
    tl::functions::messages::DeleteHistory {
        just_clear: false,
        revoke: false,
        peer,
        max_id: 0,
        min_date: None,
        max_date: None,
    }
}

fn classify_peer(peer: &Peer) -> EntityTag {
    match peer {
        Peer::Channel(_) => EntityTag::Channel,
        Peer::Group(group) => match &group.raw {
            tl::enums::Chat::Chat(_) | tl::enums::Chat::Channel(_) => EntityTag::Group,
            tl::enums::Chat::Empty(_) => EntityTag::Unrecognized("empty chat".to_string()),
            tl::enums::Chat::Forbidden(_) => {
                EntityTag::Unrecognized("forbidden chat".to_string())
            }
            tl::enums::Chat::ChannelForbidden(_) => {
                EntityTag::Unrecognized("forbidden channel".to_string())
            }
        },
        Peer::User(user) => match &user.raw {
            tl::enums::User::User(_) => EntityTag::User,
            tl::enums::User::Empty(_) => EntityTag::Unrecognized("empty user".to_string()),
        },
    }
}

fn peer_title(peer: &Peer) -> String {
    match peer {
        Peer::Channel(c) => c.title().to_string(),
        Peer::Group(g) => g.title().unwrap_or("Group").to_string(),
        Peer::User(u) => {
            let name = u.full_name();
            if name.trim().is_empty() {
                "Deleted Account".to_string()
            } else {
                name
            }
        }
    }
}

fn peer_id(peer: &Peer) -> i64 {
    match peer {
        Peer::Channel(c) => c.raw.id,
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Empty(c) => c.id,
            tl::enums::Chat::Chat(c) => c.id,
            tl::enums::Chat::Forbidden(c) => c.id,
            tl::enums::Chat::Channel(c) => c.id,
            tl::enums::Chat::ChannelForbidden(c) => c.id,
        },
        Peer::User(u) => u.raw.id(),
    }
}
