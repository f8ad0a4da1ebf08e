use crate::audio::{FeedbackAudio, FeedbackKind, SpeechSynth};
use crate::generator::generate;
use crate::TICK_RATE_MS;
use itertools::Itertools;

/// Seconds counted down before each round.
pub const COUNTDOWN_SECS: u8 = 3;
/// Fixed time the per-round result stays on screen.
pub const RESULT_SECS: f64 = 2.5;

/// One discrete stage of a round's lifecycle. The cycle
/// Countdown → ShowingNumber → RecallDelay → AwaitingInput → ShowingResult
/// repeats once per round, entered from Setup and exited to GameOver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Setup,
    Countdown,
    ShowingNumber,
    RecallDelay,
    AwaitingInput,
    ShowingResult,
    GameOver,
}

/// Settings for one session; immutable once the session starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub digits: usize,
    pub display_secs: f64,
    pub rounds: usize,
    pub recall_delay_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            digits: 7,
            display_secs: 3.0,
            rounds: 10,
            recall_delay_secs: 0.0,
        }
    }
}

/// Immutable record of one completed round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub target: String,
    pub submitted: String,
    pub correct: bool,
}

/// The round/session state machine.
///
/// Phase advancement is tick-driven: entering a timed phase arms the single
/// pending timer, and every transition out of a phase (including an
/// external reset) disarms it first, so a stale deadline can never fire
/// into a later phase. The controller exclusively owns at most one
/// outstanding timer at a time.
pub struct Session {
    phase: Phase,
    settings: Settings,
    round: usize,
    target: String,
    countdown: u8,
    outcomes: Vec<RoundOutcome>,
    /// Whole ticks until the pending transition fires; None means no timer
    /// armed. Counting ticks rather than fractional seconds keeps the
    /// deadlines exact under repeated decrement.
    phase_timer: Option<u32>,
    sound_enabled: bool,
    speech: Box<dyn SpeechSynth>,
    feedback: Box<dyn FeedbackAudio>,
}

impl Session {
    pub fn new(speech: Box<dyn SpeechSynth>, feedback: Box<dyn FeedbackAudio>) -> Self {
        Self {
            phase: Phase::Setup,
            settings: Settings::default(),
            round: 1,
            target: String::new(),
            countdown: COUNTDOWN_SECS,
            outcomes: Vec::new(),
            phase_timer: None,
            sound_enabled: true,
            speech,
            feedback,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 1-based index of the round currently in progress.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn countdown(&self) -> u8 {
        self.countdown
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.outcomes.last()
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
        if !enabled {
            self.speech.stop();
        }
    }

    /// Begins a session. Settings are range-constrained by the caller's UI;
    /// a zero digit count degrades to an empty target rather than failing.
    pub fn start(&mut self, settings: Settings) {
        self.settings = settings;
        self.round = 1;
        self.outcomes.clear();
        self.begin_round();
    }

    fn begin_round(&mut self) {
        self.countdown = COUNTDOWN_SECS;
        self.target = generate(self.settings.digits);
        self.phase = Phase::Countdown;
        self.arm(1.0);
    }

    /// Arms the single pending timer, overwriting any previous deadline.
    /// A zero duration fires on the next tick, not synchronously.
    fn arm(&mut self, secs: f64) {
        let ticks = (secs.max(0.0) * 1000.0 / TICK_RATE_MS as f64).round() as u32;
        self.phase_timer = Some(ticks);
    }

    /// Advances the pending phase timer by one tick. Call once per
    /// `TICK_RATE_MS` from the event loop.
    pub fn on_tick(&mut self) {
        let Some(remaining) = self.phase_timer else {
            return;
        };
        if remaining > 1 {
            self.phase_timer = Some(remaining - 1);
        } else {
            self.phase_timer = None;
            self.fire();
        }
    }

    /// The scheduled transition for the current phase.
    fn fire(&mut self) {
        match self.phase {
            Phase::Countdown => {
                self.countdown -= 1;
                if self.countdown == 0 {
                    self.enter_showing_number();
                } else {
                    self.arm(1.0);
                }
            }
            Phase::ShowingNumber => {
                self.speech.stop();
                self.phase = Phase::RecallDelay;
                self.arm(self.settings.recall_delay_secs);
            }
            Phase::RecallDelay => {
                self.phase = Phase::AwaitingInput;
            }
            Phase::ShowingResult => self.advance_round(),
            // No timer is ever armed in the remaining phases.
            Phase::Setup | Phase::AwaitingInput | Phase::GameOver => {}
        }
    }

    fn enter_showing_number(&mut self) {
        self.phase = Phase::ShowingNumber;
        self.arm(self.settings.display_secs);
        if self.sound_enabled && !self.target.is_empty() {
            // digits read one at a time
            let spaced = self.target.chars().join(" ");
            self.speech.speak(&spaced);
        }
    }

    /// Scores a submission. Only honoured while awaiting input, so late or
    /// duplicate submissions within one round are ignored. An empty string
    /// still counts as a submission.
    pub fn submit(&mut self, raw: &str) {
        if self.phase != Phase::AwaitingInput {
            return;
        }
        let correct = raw == self.target;
        if self.sound_enabled {
            self.feedback.play(if correct {
                FeedbackKind::Correct
            } else {
                FeedbackKind::Incorrect
            });
        }
        self.outcomes.push(RoundOutcome {
            target: self.target.clone(),
            submitted: raw.to_string(),
            correct,
        });
        self.phase = Phase::ShowingResult;
        self.arm(RESULT_SECS);
    }

    fn advance_round(&mut self) {
        if self.round >= self.settings.rounds {
            self.phase = Phase::GameOver;
        } else {
            self.round += 1;
            self.begin_round();
        }
    }

    /// Returns to Setup from any phase: disarms the pending timer, cancels
    /// any in-flight utterance and clears all per-session state.
    pub fn reset(&mut self) {
        if self.phase == Phase::ShowingNumber {
            self.speech.stop();
        }
        self.phase = Phase::Setup;
        self.phase_timer = None;
        self.round = 1;
        self.countdown = COUNTDOWN_SECS;
        self.target.clear();
        self.outcomes.clear();
    }

    /// True while a phase transition is scheduled.
    pub fn has_pending_timer(&self) -> bool {
        self.phase_timer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSpeech {
        spoken: Arc<Mutex<Vec<String>>>,
        stops: Arc<Mutex<usize>>,
    }

    impl SpeechSynth for RecordingSpeech {
        fn speak(&mut self, text: &str) {
            self.spoken.lock().unwrap().push(text.to_string());
        }
        fn stop(&mut self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    #[derive(Clone, Default)]
    struct RecordingAudio {
        played: Arc<Mutex<Vec<FeedbackKind>>>,
    }

    impl FeedbackAudio for RecordingAudio {
        fn play(&mut self, kind: FeedbackKind) {
            self.played.lock().unwrap().push(kind);
        }
    }

    fn recording_session() -> (Session, RecordingSpeech, RecordingAudio) {
        let speech = RecordingSpeech::default();
        let audio = RecordingAudio::default();
        let session = Session::new(Box::new(speech.clone()), Box::new(audio.clone()));
        (session, speech, audio)
    }

    fn fast_settings(digits: usize, rounds: usize) -> Settings {
        Settings {
            digits,
            display_secs: 0.2,
            rounds,
            recall_delay_secs: 0.0,
        }
    }

    fn tick_until(session: &mut Session, phase: Phase, max_ticks: u32) {
        for _ in 0..max_ticks {
            if session.phase() == phase {
                return;
            }
            session.on_tick();
        }
        panic!("never reached {:?}", phase);
    }

    #[test]
    fn test_new_session_is_in_setup() {
        let (session, _, _) = recording_session();
        assert_eq!(session.phase(), Phase::Setup);
        assert_eq!(session.round(), 1);
        assert!(session.outcomes().is_empty());
        assert!(!session.has_pending_timer());
    }

    #[test]
    fn test_start_enters_countdown_with_fresh_target() {
        let (mut session, _, _) = recording_session();
        session.start(fast_settings(4, 2));

        assert_eq!(session.phase(), Phase::Countdown);
        assert_eq!(session.countdown(), COUNTDOWN_SECS);
        assert_eq!(session.target().len(), 4);
        assert!(session.has_pending_timer());
    }

    #[test]
    fn test_countdown_ticks_down_to_showing_number() {
        let (mut session, speech, _) = recording_session();
        session.start(fast_settings(3, 1));

        // one second per countdown step
        for expected in [2, 1] {
            for _ in 0..10 {
                session.on_tick();
            }
            assert_eq!(session.countdown(), expected);
            assert_eq!(session.phase(), Phase::Countdown);
        }
        for _ in 0..10 {
            session.on_tick();
        }
        assert_eq!(session.phase(), Phase::ShowingNumber);

        let spoken = speech.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        // digits are spaced for the synthesizer
        assert_eq!(spoken[0], session.target().chars().join(" "));
    }

    #[test]
    fn test_full_two_round_session() {
        let (mut session, _, audio) = recording_session();
        session.start(fast_settings(4, 2));

        tick_until(&mut session, Phase::AwaitingInput, 200);
        assert_eq!(session.round(), 1);
        assert_eq!(session.outcomes().len(), 0);

        let target = session.target().to_string();
        session.submit(&target);
        assert_eq!(session.phase(), Phase::ShowingResult);
        assert_eq!(session.outcomes().len(), 1);
        assert!(session.outcomes()[0].correct);

        tick_until(&mut session, Phase::AwaitingInput, 200);
        assert_eq!(session.round(), 2);
        assert_eq!(session.outcomes().len(), 1);

        session.submit("not the number");
        assert_eq!(session.outcomes().len(), 2);
        assert!(!session.outcomes()[1].correct);

        tick_until(&mut session, Phase::GameOver, 200);
        assert_eq!(session.outcomes().len(), 2);
        assert!(!session.has_pending_timer());

        let played = audio.played.lock().unwrap();
        assert_eq!(*played, vec![FeedbackKind::Correct, FeedbackKind::Incorrect]);
    }

    #[test]
    fn test_outcome_count_tracks_round_index() {
        let (mut session, _, _) = recording_session();
        session.start(fast_settings(4, 3));

        for _ in 0..1000 {
            if session.phase() == Phase::GameOver {
                break;
            }
            // len(outcomes) == round - 1 everywhere except ShowingResult,
            // where the just-scored round is appended but not yet advanced
            if session.phase() != Phase::ShowingResult {
                assert_eq!(session.outcomes().len(), session.round() - 1);
            }
            if session.phase() == Phase::AwaitingInput {
                session.submit("");
            }
            session.on_tick();
        }
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.outcomes().len(), 3);
    }

    #[test]
    fn test_duplicate_submission_is_ignored() {
        let (mut session, _, _) = recording_session();
        session.start(fast_settings(4, 1));
        tick_until(&mut session, Phase::AwaitingInput, 200);

        session.submit("1111");
        session.submit("2222");

        assert_eq!(session.outcomes().len(), 1);
        assert_eq!(session.outcomes()[0].submitted, "1111");
    }

    #[test]
    fn test_empty_submission_still_advances() {
        let (mut session, _, _) = recording_session();
        session.start(fast_settings(4, 1));
        tick_until(&mut session, Phase::AwaitingInput, 200);

        session.submit("");

        assert_eq!(session.phase(), Phase::ShowingResult);
        assert_eq!(session.outcomes().len(), 1);
        assert!(!session.outcomes()[0].correct);
    }

    #[test]
    fn test_submission_outside_awaiting_input_is_ignored() {
        let (mut session, _, _) = recording_session();
        session.submit("123");
        assert!(session.outcomes().is_empty());

        session.start(fast_settings(4, 1));
        session.submit("123");
        assert!(session.outcomes().is_empty());
        assert_eq!(session.phase(), Phase::Countdown);
    }

    #[test]
    fn test_reset_mid_countdown_clears_everything() {
        let (mut session, _, _) = recording_session();
        session.start(fast_settings(4, 5));
        for _ in 0..5 {
            session.on_tick();
        }

        session.reset();

        assert_eq!(session.phase(), Phase::Setup);
        assert_eq!(session.round(), 1);
        assert!(session.outcomes().is_empty());
        assert!(!session.has_pending_timer());
        assert_eq!(session.target(), "");

        // a disarmed timer must never fire into the new session
        for _ in 0..100 {
            session.on_tick();
        }
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn test_reset_during_display_cancels_speech() {
        let (mut session, speech, _) = recording_session();
        session.start(fast_settings(4, 1));
        tick_until(&mut session, Phase::ShowingNumber, 200);

        session.reset();

        assert!(*speech.stops.lock().unwrap() >= 1);
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn test_zero_digits_degrades_to_empty_target() {
        let (mut session, speech, _) = recording_session();
        session.start(fast_settings(0, 1));
        tick_until(&mut session, Phase::AwaitingInput, 200);

        // nothing to speak for an empty target
        assert!(speech.spoken.lock().unwrap().is_empty());

        session.submit("");
        assert!(session.outcomes()[0].correct);
    }

    #[test]
    fn test_muted_session_neither_speaks_nor_beeps() {
        let (mut session, speech, audio) = recording_session();
        session.set_sound_enabled(false);
        session.start(fast_settings(4, 1));
        tick_until(&mut session, Phase::AwaitingInput, 200);
        session.submit("0000");

        assert!(speech.spoken.lock().unwrap().is_empty());
        assert!(audio.played.lock().unwrap().is_empty());
    }

    #[test]
    fn test_recall_delay_holds_before_input() {
        let (mut session, _, _) = recording_session();
        session.start(Settings {
            digits: 4,
            display_secs: 0.2,
            rounds: 1,
            recall_delay_secs: 0.5,
        });
        tick_until(&mut session, Phase::RecallDelay, 200);

        // the delay is 5 ticks; input must not open early
        for _ in 0..4 {
            session.on_tick();
            assert_eq!(session.phase(), Phase::RecallDelay);
        }
        session.on_tick();
        assert_eq!(session.phase(), Phase::AwaitingInput);
    }
}
