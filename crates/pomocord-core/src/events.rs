use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::pomodoro::StatusSnapshot;
use crate::timer::BreakKind;

/// Everything the bot says in chat is an Event.
/// `Display` renders the message text; adapters may also keep the value.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    CycleStarted,
    AlreadyRunning,
    CycleStopped,
    FocusStarted {
        minutes: u64,
        at: DateTime<Utc>,
    },
    FocusEnded {
        at: DateTime<Utc>,
    },
    BreakStarted {
        kind: BreakKind,
        minutes: u64,
        at: DateTime<Utc>,
    },
    BreakEnded {
        kind: BreakKind,
        at: DateTime<Utc>,
    },
    /// The requester is not in a voice channel, so nobody was muted.
    NotInVoice,
    MusicStarted {
        title: Option<String>,
        source: String,
    },
    MusicFailed {
        source: String,
        reason: String,
    },
    /// Mute/unmute requests that failed in one batch.
    MembersNotUpdated {
        count: usize,
    },
    LeftVoice,
    SettingUpdated {
        key: String,
        value: String,
    },
    Status(StatusSnapshot),
    Help {
        prefix: String,
    },
    Error {
        message: String,
    },
}

impl Event {
    pub fn error(message: impl fmt::Display) -> Self {
        Event::Error {
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::CycleStarted => write!(f, "\u{23F1} Starting the timer"),
            Event::AlreadyRunning => write!(f, "\u{2757} The timer is already running"),
            Event::CycleStopped => write!(f, "\u{23F9} Timer stopped"),
            Event::FocusStarted { minutes, .. } => {
                write!(f, "\u{1F525} Focus time! Concentrate for {minutes} minutes")
            }
            Event::FocusEnded { .. } => write!(f, "\u{23F9} Focus time is over"),
            Event::BreakStarted { kind, minutes, .. } => match kind {
                BreakKind::Short => write!(f, "\u{1F34A} Break time: {minutes} minutes"),
                BreakKind::Long => write!(f, "\u{1F34A} Long break time: {minutes} minutes"),
            },
            Event::BreakEnded { .. } => write!(f, "\u{23F9} Break is over"),
            Event::NotInVoice => write!(
                f,
                "\u{26A0} Join a voice channel to mute members and play music"
            ),
            Event::MusicStarted { title, source } => write!(
                f,
                "\u{1F3B5} Now playing: {}\nURL: {source}",
                title.as_deref().unwrap_or("Unknown")
            ),
            Event::MusicFailed { source, reason } => {
                write!(f, "\u{26A0} Could not play {source}: {reason}")
            }
            Event::MembersNotUpdated { count } => {
                write!(f, "\u{26A0} Could not update {count} member(s)")
            }
            Event::LeftVoice => write!(f, "\u{274C} Left the voice channel"),
            Event::SettingUpdated { key, value } => {
                if key == "music_url" {
                    write!(f, "\u{2705} music_url updated")
                } else {
                    write!(f, "\u{2705} {key} set to {value}")
                }
            }
            Event::Status(snapshot) => write!(f, "{snapshot}"),
            Event::Help { prefix } => write!(
                f,
                "**Commands**\n\
                 `{prefix}start` start the timer\n\
                 `{prefix}stop` stop the timer and unmute everyone\n\
                 `{prefix}leave` leave the voice channel\n\
                 `{prefix}set <key> <value>` change focus, break, longbreak, interval or music_url\n\
                 `{prefix}set music_url none` turn music off\n\
                 `{prefix}status` show settings and timer state"
            ),
            Event::Error { message } => write!(f, "\u{274C} {message}"),
        }
    }
}
