use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const LABEL_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Step,
    Done,
    Info,
    Warn,
    Error,
}

impl Tone {
    fn to_stderr(self) -> bool {
        matches!(self, Tone::Warn | Tone::Error)
    }

    fn style(self) -> Style {
        let color = match self {
            Tone::Step => AnsiColor::Cyan,
            Tone::Done => AnsiColor::Green,
            Tone::Info => AnsiColor::Blue,
            Tone::Warn => AnsiColor::Yellow,
            Tone::Error => AnsiColor::Red,
        };
        Style::new().bold().fg_color(Some(color.into()))
    }
}

fn use_color(stderr: bool) -> bool {
    let tty = if stderr {
        io::stderr().is_terminal()
    } else {
        io::stdout().is_terminal()
    };
    tty && std::env::var_os("NO_COLOR").is_none()
}

/// Render a right-aligned label followed by the message; continuation lines are indented
fn render(tone: Tone, label: &str, message: &str, color: bool) -> String {
    let label = format!("{label:>width$}", width = LABEL_WIDTH);
    let label = if color {
        let style = tone.style();
        format!("{}{label}{}", style.render(), style.render_reset())
    } else {
        label
    };

    let mut out = String::new();
    for (idx, line) in message.split('\n').enumerate() {
        if idx == 0 {
            out.push_str(&format!("{label} {line}\n"));
        } else {
            out.push_str(&format!("{:>width$} {line}\n", "", width = LABEL_WIDTH));
        }
    }
    out
}

fn emit(tone: Tone, label: &str, message: &str) {
    let stderr = tone.to_stderr();
    let text = render(tone, label, message, use_color(stderr));
    if stderr {
        let mut handle = io::stderr().lock();
        let _ = handle.write_all(text.as_bytes());
        let _ = handle.flush();
    } else {
        let mut handle = io::stdout().lock();
        let _ = handle.write_all(text.as_bytes());
        let _ = handle.flush();
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        match secs % 60 {
            0 => format!("{}m", secs / 60),
            rest => format!("{}m {rest}s", secs / 60),
        }
    } else if duration.as_secs_f64() >= 1.0 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

pub fn status(label: &str, message: impl Display) {
    emit(Tone::Step, label, &message.to_string());
}

pub fn info(message: impl Display) {
    emit(Tone::Info, "Info", &message.to_string());
}

pub fn warn(message: impl Display) {
    emit(Tone::Warn, "Warning", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    emit(Tone::Done, label, &message.to_string());
}

/// Print a question without a trailing newline and flush it
pub fn prompt(question: &str) {
    let color = use_color(false);
    let rendered = render(Tone::Step, "Confirm", question, color);
    let mut handle = io::stdout().lock();
    let _ = write!(handle, "{} ", rendered.trim_end_matches('\n'));
    let _ = handle.flush();
}

/// A long-running provisioning step, reported when it starts and when it ends
pub struct Step {
    message: String,
    started: Instant,
    finished: bool,
}

impl Step {
    pub fn start(label: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        emit(Tone::Step, label, &message);
        Self {
            message,
            started: Instant::now(),
            finished: false,
        }
    }

    pub fn done(mut self, label: &str) {
        self.finished = true;
        let elapsed = format_duration(self.started.elapsed());
        emit(Tone::Done, label, &format!("{} in {elapsed}", self.message));
    }

    pub fn fail(mut self, error: impl Display) {
        self.finished = true;
        let elapsed = format_duration(self.started.elapsed());
        emit(
            Tone::Error,
            "Failed",
            &format!("{} after {elapsed}: {error}", self.message),
        );
    }
}

impl Drop for Step {
    fn drop(&mut self) {
        if !self.finished {
            emit(Tone::Warn, "Interrupted", &format!("{} (aborted)", self.message));
        }
    }
}
