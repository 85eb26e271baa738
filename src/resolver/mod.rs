//! Interactive selection among ranked candidates.
//!
//! The session is a small state machine: [`transition`] is a pure function
//! from a state and an operator [`Command`] to the next state plus an
//! [`Effect`] for the caller to render. [`run`] is the read-eval loop that
//! feeds it lines from a channel and Ctrl-C from a future.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::ops::Range;
use tokio::sync::mpsc;

use crate::models::CandidateEntry;
use crate::ui;

/// Candidates revealed per "more" command
pub const BATCH_SIZE: usize = 5;

/// Where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing shown yet
    Initial,
    /// The top `k` candidates have been shown
    Disclosed(usize),
    /// Selection made, quit issued, or input ended
    Terminal,
}

/// An operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowMore,
    /// 1-based candidate index
    Select(usize),
    Quit,
    Invalid(String),
    EndOfInput,
    Interrupt,
}

impl Command {
    /// Interpret one line of operator input.
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        match input.to_lowercase().as_str() {
            "m" | "more" => Command::ShowMore,
            "q" | "quit" => Command::Quit,
            other => match other.parse::<usize>() {
                Ok(index) if index > 0 => Command::Select(index),
                _ => Command::Invalid(input.to_string()),
            },
        }
    }
}

/// What the caller should do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show the candidates in this 0-based range
    Disclose(Range<usize>),
    /// Everything is already visible
    NoMore,
    InvalidInput(String),
    /// The candidate at this 0-based index was chosen
    Select(usize),
    Quit,
    EndOfInput,
    Interrupted,
    /// Terminal state; nothing happens
    Nothing,
}

/// Enter the session: the top candidate is shown immediately.
pub fn begin(total: usize) -> (SessionState, Effect) {
    if total == 0 {
        return (SessionState::Terminal, Effect::Nothing);
    }
    (SessionState::Disclosed(1), Effect::Disclose(0..1))
}

/// Advance the session by one command. `total` is the candidate count.
pub fn transition(state: SessionState, command: &Command, total: usize) -> (SessionState, Effect) {
    let disclosed = match state {
        SessionState::Terminal => return (SessionState::Terminal, Effect::Nothing),
        SessionState::Initial => 0,
        SessionState::Disclosed(k) => k,
    };

    match command {
        Command::EndOfInput => (SessionState::Terminal, Effect::EndOfInput),
        Command::Interrupt => (SessionState::Terminal, Effect::Interrupted),
        Command::Quit => (SessionState::Terminal, Effect::Quit),
        Command::ShowMore if disclosed == 0 => (state, Effect::InvalidInput("more".to_string())),
        Command::ShowMore if disclosed >= total => (state, Effect::NoMore),
        Command::ShowMore => {
            let next = (disclosed + BATCH_SIZE).min(total);
            (SessionState::Disclosed(next), Effect::Disclose(disclosed..next))
        }
        Command::Select(index) if (1..=disclosed).contains(index) => {
            (SessionState::Terminal, Effect::Select(index - 1))
        }
        Command::Select(index) => (state, Effect::InvalidInput(index.to_string())),
        Command::Invalid(input) => (state, Effect::InvalidInput(input.clone())),
    }
}

/// How an interactive session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Selected(CandidateEntry),
    Quit,
    EndOfInput,
    Interrupted,
}

/// A ranked candidate list and the operator's progress through it.
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    candidates: Vec<CandidateEntry>,
    state: SessionState,
}

impl ResolutionSession {
    /// `None` when there is nothing to choose from
    pub fn new(candidates: Vec<CandidateEntry>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            candidates,
            state: SessionState::Initial,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn candidates(&self) -> &[CandidateEntry] {
        &self.candidates
    }

    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    /// Number of candidates shown so far
    pub fn disclosed(&self) -> usize {
        match self.state {
            SessionState::Disclosed(k) => k,
            _ => 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Terminal
    }

    /// Show the top candidate. Only meaningful from `Initial`.
    pub fn start(&mut self) -> Effect {
        if self.state != SessionState::Initial {
            return Effect::Nothing;
        }
        let (state, effect) = begin(self.total());
        self.state = state;
        effect
    }

    pub fn apply(&mut self, command: &Command) -> Effect {
        let (state, effect) = transition(self.state, command, self.total());
        self.state = state;
        effect
    }
}

/// Read operator lines on a dedicated thread.
///
/// The channel closes when stdin reaches end of input. A blocked read does
/// not keep the process alive after `main` returns.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Drive `session` to a terminal state.
///
/// Candidates and prompts are written to `out`; commands come from `input`
/// until it closes, or until `interrupt` resolves.
pub async fn run<W, F>(
    mut session: ResolutionSession,
    input: &mut mpsc::Receiver<String>,
    interrupt: F,
    out: &mut W,
    color: bool,
) -> io::Result<Resolution>
where
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);

    let effect = session.start();
    render(out, &session, &effect, color)?;

    loop {
        write!(out, "{}", ui::prompt_text(session.total(), session.disclosed()))?;
        out.flush()?;

        let command = tokio::select! {
            line = input.recv() => match line {
                Some(line) => Command::parse(&line),
                None => Command::EndOfInput,
            },
            _ = &mut interrupt => Command::Interrupt,
        };
        tracing::debug!("operator command: {:?}", command);

        match session.apply(&command) {
            Effect::Select(index) => {
                return Ok(Resolution::Selected(session.candidates[index].clone()));
            }
            Effect::Quit => return Ok(Resolution::Quit),
            Effect::EndOfInput => {
                writeln!(out)?;
                return Ok(Resolution::EndOfInput);
            }
            Effect::Interrupted => {
                writeln!(out)?;
                return Ok(Resolution::Interrupted);
            }
            effect => render(out, &session, &effect, color)?,
        }
    }
}

fn render<W: Write>(
    out: &mut W,
    session: &ResolutionSession,
    effect: &Effect,
    color: bool,
) -> io::Result<()> {
    match effect {
        Effect::Disclose(range) => {
            for index in range.clone() {
                ui::write_entry(out, index + 1, &session.candidates[index], color)?;
            }
            Ok(())
        }
        Effect::NoMore => ui::write_status(out, ui::Status::Info, "no more candidates", color),
        Effect::InvalidInput(input) => ui::write_status(
            out,
            ui::Status::Warning,
            &format!("invalid input: {:?}", input),
            color,
        ),
        _ => Ok(()),
    }
}
