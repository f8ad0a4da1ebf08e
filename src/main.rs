pub mod audio;
pub mod config;
pub mod generator;
pub mod runtime;
pub mod session;
pub mod summary;
pub mod ui;

use crate::audio::{FeedbackAudio, NullTranscriber, SpeechSynth, Transcriber};
use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::runtime::{CrosstermEventSource, FixedTicker, Runner, Ticker, TrainerEvent, TrainerEventSource};
use crate::session::{Phase, Session, Settings};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

pub const TICK_RATE_MS: u64 = 100;

/// terminal short-term memory trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal short-term memory trainer: a random digit sequence is shown (and spoken, where the platform supports it) for a few seconds, then you recall it from memory. Results are scored per round and summarized at the end of the session."
)]
pub struct Cli {
    /// digits to memorize per round
    #[clap(short = 'd', long, value_parser = clap::value_parser!(u64).range(3..=16))]
    digits: Option<u64>,

    /// seconds the number stays on screen
    #[clap(short = 't', long = "display-time")]
    display_time: Option<f64>,

    /// rounds per session
    #[clap(short = 'r', long, value_parser = clap::value_parser!(u64).range(5..=25))]
    rounds: Option<u64>,

    /// seconds between hiding the number and opening recall input
    #[clap(long = "recall-delay")]
    recall_delay: Option<f64>,

    /// start muted: no spoken digits, no feedback cues
    #[clap(long)]
    no_sound: bool,
}

impl Cli {
    /// Saved defaults overridden by whatever flags were given.
    fn merge_into(&self, config: &mut Config) {
        if let Some(d) = self.digits {
            config.digits = d as usize;
        }
        if let Some(t) = self.display_time {
            config.display_secs = t.clamp(1.0, 10.0);
        }
        if let Some(r) = self.rounds {
            config.rounds = r as usize;
        }
        if let Some(delay) = self.recall_delay {
            config.recall_delay_secs = delay.max(0.0);
        }
        if self.no_sound {
            config.sound = false;
        }
    }
}

/// One adjustable row on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Digits,
    DisplayTime,
    Rounds,
    RecallDelay,
}

impl SetupField {
    pub const ALL: [SetupField; 4] = [
        SetupField::Digits,
        SetupField::DisplayTime,
        SetupField::Rounds,
        SetupField::RecallDelay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SetupField::Digits => "Digits to memorize",
            SetupField::DisplayTime => "Display time",
            SetupField::Rounds => "Rounds",
            SetupField::RecallDelay => "Recall delay",
        }
    }
}

pub struct App {
    pub session: Session,
    /// Settings being edited on the setup screen; applied on Enter.
    pub draft: Settings,
    pub setup_cursor: usize,
    /// Typed recall buffer for the current round.
    pub input: String,
    pub transcriber_supported: bool,
}

impl App {
    pub fn new(
        config: &Config,
        speech: Box<dyn SpeechSynth>,
        feedback: Box<dyn FeedbackAudio>,
    ) -> Self {
        let mut session = Session::new(speech, feedback);
        session.set_sound_enabled(config.sound);
        Self {
            session,
            draft: config.to_settings(),
            setup_cursor: 0,
            input: String::new(),
            transcriber_supported: false,
        }
    }

    pub fn selected_field(&self) -> SetupField {
        SetupField::ALL[self.setup_cursor]
    }

    fn select_prev(&mut self) {
        self.setup_cursor = self
            .setup_cursor
            .checked_sub(1)
            .unwrap_or(SetupField::ALL.len() - 1);
    }

    fn select_next(&mut self) {
        self.setup_cursor = (self.setup_cursor + 1) % SetupField::ALL.len();
    }

    /// Nudges the selected setting one step, clamped to its slider range.
    fn adjust(&mut self, up: bool) {
        match self.selected_field() {
            SetupField::Digits => {
                let d = self.draft.digits as i64 + if up { 1 } else { -1 };
                self.draft.digits = d.clamp(3, 16) as usize;
            }
            SetupField::DisplayTime => {
                let t = self.draft.display_secs + if up { 0.5 } else { -0.5 };
                self.draft.display_secs = t.clamp(1.0, 10.0);
            }
            SetupField::Rounds => {
                let r = self.draft.rounds as i64 + if up { 1 } else { -1 };
                self.draft.rounds = r.clamp(5, 25) as usize;
            }
            SetupField::RecallDelay => {
                let delay = self.draft.recall_delay_secs + if up { 0.5 } else { -0.5 };
                self.draft.recall_delay_secs = delay.clamp(0.0, 10.0);
            }
        }
    }

    fn toggle_sound(&mut self) {
        let enabled = self.session.is_sound_enabled();
        self.session.set_sound_enabled(!enabled);
    }

    /// Digits-only view of a transcription result, submitted as-is.
    fn on_transcript(&mut self, text: &str) {
        if self.session.phase() != Phase::AwaitingInput {
            return;
        }
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        self.input = digits.clone();
        self.session.submit(&digits);
        self.input.clear();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.merge_into(&mut config);

    // Optional capabilities degrade to inert stubs when unavailable.
    let speech = audio::default_speech();
    let feedback = audio::default_feedback();
    // No speech-recognition backend is wired in yet; typed recall always works.
    let mut transcriber = NullTranscriber;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let transcript_tx = events.sender();
    transcriber.start(Box::new(move |text| {
        let _ = transcript_tx.send(TrainerEvent::Transcript(text));
    }));
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let mut app = App::new(&config, speech, feedback);
    app.transcriber_supported = transcriber.is_supported();

    let res = start_tui(&mut terminal, &mut app, &runner, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: TrainerEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TrainerEvent::Tick => {
                let before = app.session.phase();
                app.session.on_tick();
                // redraw while a timer runs or when a transition fired
                if app.session.has_pending_timer() || app.session.phase() != before {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            TrainerEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            TrainerEvent::Transcript(text) => {
                app.on_transcript(&text);
                terminal.draw(|f| ui(app, f))?;
            }
            TrainerEvent::Key(key) => {
                if handle_key(app, key, store) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

/// Per-phase key handling; returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent, store: &dyn ConfigStore) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.session.phase() {
        Phase::Setup => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::BackTab => app.select_prev(),
            KeyCode::Down | KeyCode::Tab => app.select_next(),
            KeyCode::Left => app.adjust(false),
            KeyCode::Right => app.adjust(true),
            KeyCode::Char('m') => app.toggle_sound(),
            KeyCode::Enter => {
                app.input.clear();
                let _ = store.save(&Config::from_settings(
                    &app.draft,
                    app.session.is_sound_enabled(),
                ));
                app.session.start(app.draft.clone());
            }
            _ => {}
        },
        Phase::AwaitingInput => match key.code {
            KeyCode::Esc => {
                app.session.reset();
                app.input.clear();
            }
            KeyCode::Enter => {
                let submission = std::mem::take(&mut app.input);
                app.session.submit(&submission);
            }
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char('m') => app.toggle_sound(),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let cap = app.session.settings().digits;
                if cap == 0 || app.input.len() < cap {
                    app.input.push(c);
                }
            }
            _ => {}
        },
        Phase::GameOver => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Enter | KeyCode::Char('r') => app.session.reset(),
            KeyCode::Char('m') => app.toggle_sound(),
            _ => {}
        },
        // timed phases: allow bailing out and muting, nothing else
        Phase::Countdown | Phase::ShowingNumber | Phase::RecallDelay | Phase::ShowingResult => {
            match key.code {
                KeyCode::Esc => {
                    app.session.reset();
                    app.input.clear();
                }
                KeyCode::Char('m') => app.toggle_sound(),
                _ => {}
            }
        }
    }

    false
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
