//! Mute control for everyone in a voice channel.
//!
//! Bots are left alone. Members already in the requested state are skipped,
//! so both operations are idempotent. A failure on one member does not stop
//! the batch: it is logged and recorded in the returned [`MuteReport`].

use crate::error::PlatformError;
use crate::platform::{ChannelId, UserId, VoiceGateway};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuteReport {
    /// Members whose state was changed.
    pub changed: Vec<UserId>,
    /// Humans already in the requested state.
    pub unchanged: usize,
    /// Members whose request failed, with the error text.
    pub failed: Vec<(UserId, String)>,
}

impl MuteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub async fn mute_all(
    gateway: &dyn VoiceGateway,
    channel: ChannelId,
) -> Result<MuteReport, PlatformError> {
    set_all(gateway, channel, true).await
}

pub async fn unmute_all(
    gateway: &dyn VoiceGateway,
    channel: ChannelId,
) -> Result<MuteReport, PlatformError> {
    set_all(gateway, channel, false).await
}

async fn set_all(
    gateway: &dyn VoiceGateway,
    channel: ChannelId,
    muted: bool,
) -> Result<MuteReport, PlatformError> {
    let mut report = MuteReport::default();

    for member in gateway.participants(channel).await? {
        if member.is_bot {
            continue;
        }
        if member.muted == muted {
            report.unchanged += 1;
            continue;
        }
        match gateway.set_muted(member.id, muted).await {
            Ok(()) => report.changed.push(member.id),
            Err(e) => {
                tracing::warn!(user = member.id, name = %member.name, muted, error = %e, "member update failed");
                report.failed.push((member.id, e.to_string()));
            }
        }
    }

    tracing::debug!(
        channel,
        muted,
        changed = report.changed.len(),
        failed = report.failed.len(),
        "membership updated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Participant;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Room {
        members: Mutex<HashMap<UserId, Participant>>,
        broken: Option<UserId>,
        requests: Mutex<usize>,
    }

    impl Room {
        fn new(members: Vec<Participant>) -> Self {
            Self {
                members: Mutex::new(members.into_iter().map(|m| (m.id, m)).collect()),
                broken: None,
                requests: Mutex::new(0),
            }
        }

        fn muted(&self, id: UserId) -> bool {
            self.members.lock().unwrap()[&id].muted
        }
    }

    #[async_trait]
    impl VoiceGateway for Room {
        async fn requester_channel(&self) -> Option<ChannelId> {
            Some(1)
        }
        async fn connect(&self, _channel: ChannelId) -> Result<(), PlatformError> {
            Ok(())
        }
        async fn disconnect(&self) -> Result<(), PlatformError> {
            Ok(())
        }
        async fn participants(&self, _channel: ChannelId) -> Result<Vec<Participant>, PlatformError> {
            let mut all: Vec<_> = self.members.lock().unwrap().values().cloned().collect();
            all.sort_by_key(|m| m.id);
            Ok(all)
        }
        async fn set_muted(&self, user: UserId, muted: bool) -> Result<(), PlatformError> {
            *self.requests.lock().unwrap() += 1;
            if self.broken == Some(user) {
                return Err(PlatformError::Member {
                    user,
                    message: "missing permissions".into(),
                });
            }
            self.members.lock().unwrap().get_mut(&user).unwrap().muted = muted;
            Ok(())
        }
    }

    fn member(id: UserId, is_bot: bool) -> Participant {
        Participant {
            id,
            name: format!("user{id}"),
            is_bot,
            muted: false,
        }
    }

    #[tokio::test]
    async fn mute_all_skips_bots() {
        let room = Room::new(vec![member(1, false), member(2, false), member(3, true)]);
        let report = mute_all(&room, 1).await.unwrap();
        assert_eq!(report.changed, vec![1, 2]);
        assert!(room.muted(1) && room.muted(2));
        assert!(!room.muted(3));
    }

    #[tokio::test]
    async fn unmute_all_twice_matches_once() {
        let room = Room::new(vec![member(1, false), member(2, false)]);
        mute_all(&room, 1).await.unwrap();

        unmute_all(&room, 1).await.unwrap();
        let requests_after_first = *room.requests.lock().unwrap();
        let second = unmute_all(&room, 1).await.unwrap();

        assert!(second.changed.is_empty());
        assert_eq!(second.unchanged, 2);
        assert_eq!(*room.requests.lock().unwrap(), requests_after_first);
        assert!(!room.muted(1) && !room.muted(2));
    }

    #[tokio::test]
    async fn failure_on_one_member_continues_batch() {
        let mut room = Room::new(vec![member(1, false), member(2, false), member(3, false)]);
        room.broken = Some(2);
        let report = mute_all(&room, 1).await.unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.changed, vec![1, 3]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 2);
        assert!(room.muted(3));
    }
}
