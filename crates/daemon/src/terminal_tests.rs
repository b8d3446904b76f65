// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;

struct RecordingTts {
    calls: Arc<AtomicUsize>,
}

impl TextToSpeech for RecordingTts {
    fn speak(&self, _text: &str) -> Result<(), VoiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingTts;

impl TextToSpeech for FailingTts {
    fn speak(&self, _text: &str) -> Result<(), VoiceError> {
        Err(VoiceError::Backend("no audio device".to_string()))
    }
}

#[tokio::test]
async fn speak_invokes_the_backend() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tts: Arc<dyn TextToSpeech> = Arc::new(RecordingTts { calls: Arc::clone(&calls) });

    tokio::task::spawn_blocking({
        let tts = Arc::clone(&tts);
        move || tts.speak("hello")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn speak_failure_is_reported_not_panicked() {
    let tts: Arc<dyn TextToSpeech> = Arc::new(FailingTts);
    let result = tokio::task::spawn_blocking(move || tts.speak("hello")).await.unwrap();
    assert!(result.is_err());
}

#[test]
fn null_speech_speak_is_a_silent_success() {
    assert!(NullSpeech.speak("anything").is_ok());
}
