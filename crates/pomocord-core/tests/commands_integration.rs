//! Integration tests for the chat command surface.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{settings_with_music, Harness};
use pomocord_core::{CoreError, Event, Settings, SettingsStore, ValidationError};

#[tokio::test]
async fn set_focus_with_text_changes_nothing() {
    let h = Harness::new(Settings::default());
    let before = std::fs::read(&h.path).unwrap();

    let err = h
        .pomodoro
        .update_setting(&h.platform, "focus", "abc")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::NotANumber { .. })
    ));
    assert_eq!(h.pomodoro.settings().await.focus, 25);
    assert_eq!(std::fs::read(&h.path).unwrap(), before);
    assert!(h.chat.events().is_empty());
}

#[tokio::test]
async fn set_interval_zero_is_rejected() {
    let h = Harness::new(Settings::default());
    h.pomodoro.handle_message(&h.platform, "!set interval 0").await;

    assert_eq!(h.pomodoro.settings().await.interval, 4);
    match h.chat.events().as_slice() {
        [Event::Error { message }] => assert!(message.contains("at least 1")),
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn set_persists_valid_values() {
    let h = Harness::new(Settings::default());
    h.pomodoro.handle_message(&h.platform, "!set focus 50").await;

    assert_eq!(h.pomodoro.settings().await.focus, 50);
    let on_disk = SettingsStore::new(&h.path).load().unwrap();
    assert_eq!(on_disk.focus, 50);
    assert!(matches!(
        h.chat.events().as_slice(),
        [Event::SettingUpdated { key, value }] if key == "focus" && value == "50"
    ));
}

#[tokio::test]
async fn set_unknown_key_lists_valid_keys() {
    let h = Harness::new(Settings::default());
    h.pomodoro.handle_message(&h.platform, "!set token hunter2").await;

    match h.chat.events().as_slice() {
        [Event::Error { message }] => {
            assert!(message.contains("focus, break, longbreak, interval, music_url"));
        }
        other => panic!("unexpected events: {other:?}"),
    }
    assert_eq!(h.pomodoro.settings().await.token, "YOURTOKEN");
}

#[tokio::test(start_paused = true)]
async fn set_music_url_while_running_swaps_the_track() {
    let h = Harness::new(settings_with_music("first song"));
    h.pomodoro.start(&h.platform).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.audio.playing(), vec!["first song".to_string()]);

    h.pomodoro
        .update_setting(&h.platform, "music_url", "https://example.com/second")
        .await
        .unwrap();

    assert_eq!(
        h.audio.sources(),
        vec![
            "first song".to_string(),
            "https://example.com/second".to_string()
        ]
    );
    assert_eq!(
        h.audio.playing(),
        vec!["https://example.com/second".to_string()]
    );

    h.pomodoro.stop(&h.platform).await.unwrap();
}

#[tokio::test]
async fn set_music_url_while_idle_does_not_play() {
    let h = Harness::new(Settings::default());
    h.pomodoro
        .update_setting(&h.platform, "music_url", "rain sounds")
        .await
        .unwrap();

    assert!(h.audio.sources().is_empty());
    assert_eq!(h.pomodoro.settings().await.music_url, "rain sounds");
}

#[tokio::test(start_paused = true)]
async fn set_music_url_none_turns_music_off() {
    let h = Harness::new(settings_with_music("first song"));
    h.pomodoro.start(&h.platform).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.audio.playing().len(), 1);

    assert!(h.pomodoro.handle_message(&h.platform, "!set music_url none").await);

    assert!(h.audio.playing().is_empty());
    assert_eq!(h.audio.sources().len(), 1, "nothing new is played");
    let stored = SettingsStore::new(&h.path).load().unwrap();
    assert_eq!(stored.music_url, "");

    h.pomodoro.stop(&h.platform).await.unwrap();
}

#[tokio::test]
async fn leave_without_voice_is_a_no_op() {
    let h = Harness::new(Settings::default());
    h.pomodoro.handle_message(&h.platform, "!leave").await;

    assert!(h.chat.events().is_empty());
    assert_eq!(h.voice.disconnects.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn leave_unmutes_and_disconnects() {
    let h = Harness::new(settings_with_music("lofi"));
    h.pomodoro.start(&h.platform).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(h.voice.humans_muted());

    h.pomodoro.handle_message(&h.platform, "!leave").await;

    assert!(h.voice.humans_unmuted());
    assert_eq!(h.voice.disconnects.load(Ordering::SeqCst), 1);
    assert!(h.audio.playing().is_empty());
    assert!(!h.pomodoro.status().await.in_voice);
    assert!(matches!(h.chat.events().last(), Some(Event::LeftVoice)));

    h.pomodoro.stop(&h.platform).await.unwrap();
}

#[tokio::test]
async fn status_reports_without_mutating() {
    let h = Harness::new(Settings {
        token: "secret-token-1234".into(),
        ..Settings::default()
    });

    let first = h.pomodoro.status().await;
    let second = h.pomodoro.status().await;
    assert_eq!(first, second);
    assert!(!first.running);
    assert_eq!(first.focus_count, 0);
    assert_eq!(first.until_long_break, 4);
    assert_eq!(first.settings.token, "****1234");

    h.pomodoro.handle_message(&h.platform, "!status").await;
    let text = h.chat.events()[0].to_string();
    assert!(text.contains("Focus Time: 25 min"));
    assert!(text.contains("Running: no"));
    assert!(!text.contains("secret"));
}

#[tokio::test]
async fn unknown_command_and_missing_argument_are_reported() {
    let h = Harness::new(Settings::default());
    assert!(h.pomodoro.handle_message(&h.platform, "!dance").await);
    assert!(h.pomodoro.handle_message(&h.platform, "!set focus").await);
    assert!(!h.pomodoro.handle_message(&h.platform, "good morning").await);

    let texts: Vec<String> = h.chat.events().iter().map(|e| e.to_string()).collect();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("Unknown command: dance"));
    assert!(texts[1].contains("Missing argument for set"));
}

#[tokio::test]
async fn stop_when_idle_still_acknowledges() {
    let h = Harness::new(Settings::default());
    h.pomodoro.handle_message(&h.platform, "!stop").await;
    assert!(matches!(h.chat.events().as_slice(), [Event::CycleStopped]));
}

#[tokio::test]
async fn help_uses_configured_prefix() {
    let h = Harness::new(Settings::default());
    let pomodoro = h.pomodoro.clone().with_prefix("?");
    assert!(pomodoro.handle_message(&h.platform, "?help").await);
    let text = h.chat.events()[0].to_string();
    assert!(text.contains("`?start`"));
    assert!(text.contains("`?set music_url none`"));
}
