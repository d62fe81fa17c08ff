use std::io::{self, BufRead};

use crate::error::{Result, SwitchError};

/// Re-prompts allowed before giving up on an invalid answer
pub const MAX_ATTEMPTS: usize = 10;

/// One reply to a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Invalid,
}

impl Answer {
    /// Interpret a typed reply; anything but y/yes/n/no (including empty) is invalid
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Answer::Yes,
            "n" | "no" => Answer::No,
            _ => Answer::Invalid,
        }
    }
}

/// Source of yes/no answers; `None` means input is closed
pub trait Confirm {
    fn ask(&mut self, question: &str) -> Option<Answer>;
}

/// Ask until a yes or no is given
pub fn ask_until_answered(confirm: &mut dyn Confirm, question: &str) -> Result<bool> {
    for attempt in 1..=MAX_ATTEMPTS {
        match confirm.ask(question) {
            Some(Answer::Yes) => return Ok(true),
            Some(Answer::No) => return Ok(false),
            Some(Answer::Invalid) => {
                tracing::debug!(attempt, "invalid confirmation answer");
                crate::ui::warn("Please answer yes or no.");
            }
            None => return Err(SwitchError::ConfirmationExhausted { attempts: attempt }),
        }
    }
    Err(SwitchError::ConfirmationExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Prompts on stdout and reads replies from a line reader (stdin by default)
pub struct StdinConfirm<R> {
    reader: R,
}

impl StdinConfirm<io::StdinLock<'static>> {
    pub fn new() -> Self {
        Self {
            reader: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> StdinConfirm<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Confirm for StdinConfirm<R> {
    fn ask(&mut self, question: &str) -> Option<Answer> {
        crate::ui::prompt(&format!("{question} [y/n]"));
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(Answer::parse(&line)),
        }
    }
}

/// Answer supplied up front by a command-line flag
pub struct Preset(pub bool);

impl Confirm for Preset {
    fn ask(&mut self, _question: &str) -> Option<Answer> {
        Some(if self.0 { Answer::Yes } else { Answer::No })
    }
}
