// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Voice front-end (spec.md §6 "Voice"): a daemon thread runs
//! speech-to-text and pushes each transcribed utterance onto the main loop
//! via `Dispatcher::submit`; text-to-speech calls are scheduled on the main
//! loop and invoke a blocking audio sink via `spawn_blocking`.
//!
//! Neither STT nor TTS has a concrete backend in this crate (spec.md §1
//! Non-goals: the audio stack itself is out of scope) — [`VoiceBridge`] is
//! generic over both traits so an operator-supplied implementation can be
//! wired in at `main`, the same way [`leon_adapters::NotifyAdapter`] has a
//! desktop implementation behind a trait with a no-op default.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use leon_adapters::agent::AgentAdapter;
use leon_core::Source;

use crate::lifecycle::Shared;
use crate::listener::commands::handle_utterance;
use crate::protocol::UtteranceOutcome;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("speech backend error: {0}")]
    Backend(String),
}

/// Blocking speech capture, run on its own OS thread (spec.md §6: "Daemon-
/// thread STT"). One call blocks until an utterance is fully captured and
/// transcribed, or the stream ends.
pub trait SpeechToText: Send + Sync + 'static {
    fn listen(&self) -> Result<Option<String>, VoiceError>;
}

/// Blocking audio playback, invoked via `spawn_blocking` from the main
/// loop (spec.md §6: "TTS calls ... invoke a blocking audio sink via
/// run-in-executor").
pub trait TextToSpeech: Send + Sync + 'static {
    fn speak(&self, text: &str) -> Result<(), VoiceError>;
}

/// No-op backend used when no audio stack is configured: `listen` blocks
/// forever (never produces an utterance) and `speak` is a silent success.
pub struct NullSpeech;

impl SpeechToText for NullSpeech {
    fn listen(&self) -> Result<Option<String>, VoiceError> {
        loop {
            std::thread::sleep(std::time::Duration::from_secs(3600));
        }
    }
}

impl TextToSpeech for NullSpeech {
    fn speak(&self, _text: &str) -> Result<(), VoiceError> {
        Ok(())
    }
}

/// Owns the STT capture thread and the TTS call path for one daemon
/// process. `stt`/`tts` are `Arc`-shared so the capture thread and the
/// async `speak` path can each hold their own clone.
pub struct VoiceBridge<A: AgentAdapter> {
    shared: Arc<Shared<A>>,
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
}

impl<A: AgentAdapter + 'static> VoiceBridge<A> {
    pub fn new(shared: Arc<Shared<A>>, stt: Arc<dyn SpeechToText>, tts: Arc<dyn TextToSpeech>) -> Self {
        Self { shared, stt, tts }
    }

    /// Spawn the capture thread. Each transcription is submitted to the
    /// main loop as a `Source::Voice` utterance; the thread never touches
    /// `Shared` directly, only through `Dispatcher::submit`.
    pub fn spawn_capture(&self) {
        let shared = Arc::clone(&self.shared);
        let stt = Arc::clone(&self.stt);
        std::thread::spawn(move || loop {
            match stt.listen() {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    let shared = Arc::clone(&shared);
                    shared.dispatcher.submit_detached(async move {
                        let outcome = handle_utterance(&shared, Source::Voice, text, None).await;
                        if let UtteranceOutcome::Error { message } = outcome {
                            warn!(message, "voice utterance failed");
                        }
                    });
                }
                Ok(Some(_)) | Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "speech capture error");
                    break;
                }
            }
        });
    }

    /// Speak `text` without blocking the main loop (spec.md §6: "invoke a
    /// blocking audio sink via run-in-executor").
    pub async fn speak(&self, text: String) {
        let tts = Arc::clone(&self.tts);
        let result = tokio::task::spawn_blocking(move || tts.speak(&text)).await;
        match result {
            Ok(Ok(())) => debug!("tts playback complete"),
            Ok(Err(err)) => warn!(error = %err, "tts playback failed"),
            Err(err) => warn!(error = %err, "tts task panicked"),
        }
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
