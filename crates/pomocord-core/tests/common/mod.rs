//! In-memory platform used by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pomocord_core::{
    Announcer, AudioBackend, AudioHandle, BreakKind, Event, MediaSource, Participant, Platform,
    PlatformError, Playback, Pomodoro, Settings, SettingsStore, VoiceGateway,
};
use tempfile::TempDir;

pub const ROOM: u64 = 42;

#[derive(Default)]
pub struct FakeChat {
    pub events: Mutex<Vec<Event>>,
}

#[async_trait]
impl Announcer for FakeChat {
    async fn say(&self, _text: &str) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn announce(&self, event: &Event) -> Result<(), PlatformError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

impl FakeChat {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn break_kinds(&self) -> Vec<(BreakKind, u64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::BreakStarted { kind, minutes, .. } => Some((kind, minutes)),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeVoice {
    pub requester: Mutex<Option<u64>>,
    pub connected: Mutex<Option<u64>>,
    pub members: Mutex<BTreeMap<u64, Participant>>,
    /// Members whose mute state cannot be changed.
    pub failing: Mutex<BTreeSet<u64>>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl FakeVoice {
    pub fn new(requester: Option<u64>) -> Self {
        let members = [(1, false), (2, false), (99, true)]
            .into_iter()
            .map(|(id, is_bot)| {
                (
                    id,
                    Participant {
                        id,
                        name: format!("member{id}"),
                        is_bot,
                        muted: false,
                    },
                )
            })
            .collect();
        Self {
            requester: Mutex::new(requester),
            connected: Mutex::new(None),
            members: Mutex::new(members),
            failing: Mutex::new(BTreeSet::new()),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn muted(&self, id: u64) -> bool {
        self.members.lock().unwrap()[&id].muted
    }

    pub fn humans_muted(&self) -> bool {
        self.muted(1) && self.muted(2)
    }

    pub fn humans_unmuted(&self) -> bool {
        !self.muted(1) && !self.muted(2)
    }
}

#[async_trait]
impl VoiceGateway for FakeVoice {
    async fn requester_channel(&self) -> Option<u64> {
        *self.requester.lock().unwrap()
    }

    async fn connect(&self, channel: u64) -> Result<(), PlatformError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.connected.lock().unwrap() = Some(channel);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), PlatformError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.connected.lock().unwrap() = None;
        Ok(())
    }

    async fn participants(&self, _channel: u64) -> Result<Vec<Participant>, PlatformError> {
        Ok(self.members.lock().unwrap().values().cloned().collect())
    }

    async fn set_muted(&self, user: u64, muted: bool) -> Result<(), PlatformError> {
        if self.failing.lock().unwrap().contains(&user) {
            return Err(PlatformError::Member {
                user,
                message: "missing permissions".into(),
            });
        }
        if let Some(member) = self.members.lock().unwrap().get_mut(&user) {
            member.muted = muted;
        }
        Ok(())
    }
}

pub struct FakeTrack {
    playing: Arc<AtomicBool>,
}

#[async_trait]
impl AudioHandle for FakeTrack {
    async fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    async fn stop(&self) -> Result<(), PlatformError> {
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAudio {
    pub fail: AtomicBool,
    pub played: Mutex<Vec<(String, Arc<AtomicBool>)>>,
}

impl FakeAudio {
    pub fn sources(&self) -> Vec<String> {
        self.played
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn playing(&self) -> Vec<String> {
        self.played
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, on)| on.load(Ordering::SeqCst))
            .map(|(s, _)| s.clone())
            .collect()
    }
}

#[async_trait]
impl AudioBackend for FakeAudio {
    async fn play(&self, source: &MediaSource) -> Result<Playback, PlatformError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlatformError::Media("video unavailable".into()));
        }
        let playing = Arc::new(AtomicBool::new(true));
        self.played
            .lock()
            .unwrap()
            .push((source.to_string(), Arc::clone(&playing)));
        Ok(Playback {
            title: Some(format!("title of {source}")),
            handle: Box::new(FakeTrack { playing }),
        })
    }
}

pub struct Harness {
    pub chat: Arc<FakeChat>,
    pub voice: Arc<FakeVoice>,
    pub audio: Arc<FakeAudio>,
    pub platform: Platform,
    pub pomodoro: Pomodoro,
    pub path: PathBuf,
    _dir: TempDir,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::with_requester(settings, Some(ROOM))
    }

    pub fn with_requester(settings: Settings, requester: Option<u64>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(&path);
        store.save(&settings).unwrap();

        let chat = Arc::new(FakeChat::default());
        let voice = Arc::new(FakeVoice::new(requester));
        let audio = Arc::new(FakeAudio::default());
        let platform = Platform::new(chat.clone(), voice.clone(), audio.clone());

        Self {
            chat,
            voice,
            audio,
            platform,
            pomodoro: Pomodoro::new(store, settings),
            path,
            _dir: dir,
        }
    }
}

pub fn settings_with_music(music_url: &str) -> Settings {
    Settings {
        music_url: music_url.to_string(),
        ..Settings::default()
    }
}
