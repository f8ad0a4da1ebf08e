//! Optional audio/speech capability providers.
//!
//! The controller talks to these through narrow traits and never assumes
//! availability: every provider has an inert stub, and the real
//! implementations (behind the `audio` feature, which needs system
//! speech/audio libraries) construct fallibly and swallow runtime errors.

/// Which feedback cue to play after a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
}

/// Best-effort speech synthesis. Absence of the capability is not an
/// error; implementations swallow runtime failures.
pub trait SpeechSynth {
    fn speak(&mut self, text: &str);
    /// Cancel any in-flight utterance.
    fn stop(&mut self);
}

/// Fire-and-forget audio cues. Playback failures are never surfaced.
pub trait FeedbackAudio {
    fn play(&mut self, kind: FeedbackKind);
}

/// Optional speech-recognition source. `on_result` receives transcribed
/// text; the app stays fully usable if it never fires.
pub trait Transcriber {
    fn is_supported(&self) -> bool {
        false
    }
    fn start(&mut self, on_result: Box<dyn Fn(String) + Send>);
    fn stop(&mut self) {}
}

/// Stub used when the platform has no speech synthesis.
pub struct NullSpeech;

impl SpeechSynth for NullSpeech {
    fn speak(&mut self, _text: &str) {}
    fn stop(&mut self) {}
}

/// Stub used when no audio device is available.
pub struct NullAudio;

impl FeedbackAudio for NullAudio {
    fn play(&mut self, _kind: FeedbackKind) {}
}

/// Stub transcriber; never produces a result.
pub struct NullTranscriber;

impl Transcriber for NullTranscriber {
    fn start(&mut self, _on_result: Box<dyn Fn(String) + Send>) {}
}

/// Best available speech synthesis for this build and platform.
pub fn default_speech() -> Box<dyn SpeechSynth> {
    #[cfg(feature = "audio")]
    if let Some(speech) = system::SystemSpeech::new() {
        return Box::new(speech);
    }
    Box::new(NullSpeech)
}

/// Best available feedback cue player for this build and platform.
pub fn default_feedback() -> Box<dyn FeedbackAudio> {
    #[cfg(feature = "audio")]
    if let Some(audio) = system::SystemAudio::new() {
        return Box::new(audio);
    }
    Box::new(NullAudio)
}

#[cfg(feature = "audio")]
pub mod system {
    use super::{FeedbackAudio, FeedbackKind, SpeechSynth};
    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use std::time::Duration;
    use tts::Tts;

    /// Platform speech synthesis via the `tts` crate.
    pub struct SystemSpeech {
        tts: Tts,
    }

    impl SystemSpeech {
        /// Returns None when the platform has no usable synthesizer.
        pub fn new() -> Option<Self> {
            Tts::default().ok().map(|tts| Self { tts })
        }
    }

    impl SpeechSynth for SystemSpeech {
        fn speak(&mut self, text: &str) {
            // interrupt=true: a new utterance replaces any pending one
            let _ = self.tts.speak(text, true);
        }

        fn stop(&mut self) {
            let _ = self.tts.stop();
        }
    }

    /// Correct/incorrect cues rendered as short sine pairs through rodio.
    pub struct SystemAudio {
        // the stream must outlive its handle or playback goes silent
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl SystemAudio {
        /// Returns None when no output device can be opened.
        pub fn new() -> Option<Self> {
            OutputStream::try_default().ok().map(|(stream, handle)| Self {
                _stream: stream,
                handle,
            })
        }

        fn tone(sink: &Sink, freq: f32, millis: u64) {
            sink.append(
                SineWave::new(freq)
                    .take_duration(Duration::from_millis(millis))
                    .amplify(0.25),
            );
        }
    }

    impl FeedbackAudio for SystemAudio {
        fn play(&mut self, kind: FeedbackKind) {
            let Ok(sink) = Sink::try_new(&self.handle) else {
                return;
            };
            match kind {
                FeedbackKind::Correct => {
                    // rising pair
                    Self::tone(&sink, 660.0, 90);
                    Self::tone(&sink, 880.0, 120);
                }
                FeedbackKind::Incorrect => {
                    // falling pair
                    Self::tone(&sink, 330.0, 90);
                    Self::tone(&sink, 220.0, 150);
                }
            }
            sink.detach();
        }
    }
}
