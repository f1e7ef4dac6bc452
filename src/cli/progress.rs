//! Single-line progress display for install runs
//!
//! Pipeline events arrive over a channel and are rendered on a spawned task.
//! In a terminal each step redraws one status line scaled to the window
//! width, with the completed fraction drawn in reverse video, and per-file
//! verdicts (`valid`, `invalid`, `fail`) are printed as colored lines above
//! it. Outside a terminal every event becomes one plain line.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cmpdl::app::{PipelineEvent, ProgressReporter};
//! use cmpdl::cli::{ProgressDisplay, TerminalGuard};
//!
//! # async fn example() {
//! let _guard = TerminalGuard::new();
//! let (reporter, rx) = ProgressReporter::channel();
//! let display = ProgressDisplay::new().spawn(rx);
//!
//! reporter.emit(PipelineEvent::OverlayMerged { files_copied: 3 });
//! drop(reporter);
//! let _ = display.await;
//! # }
//! ```

use std::borrow::Cow;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::{Phase, PipelineEvent};
use crate::constants::progress;

/// A rendered status line and how many of its columns are "complete"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub filled: usize,
}

/// Formats `[index/total] <label> <fileName> ... (<size> MB)` to `width`
///
/// An empty `label` gives the shorter lookup form without the trailing
/// ellipsis. Over-long names are cut so the size stays visible.
pub fn format_status_line(
    index: usize,
    total: usize,
    label: &str,
    file_name: &str,
    size_bytes: u64,
    width: usize,
) -> StatusLine {
    let size = format!("({:.2} MB)", size_bytes as f64 / progress::BYTES_PER_MB);
    let left = if label.is_empty() {
        format!("[{}/{}] {}", index, total, file_name)
    } else {
        format!("[{}/{}] {} {} ...", index, total, label, file_name)
    };

    let text = pad_between(&left, &size, width);
    let filled = completion_columns(index, total, width).min(text.chars().count());
    StatusLine { text, filled }
}

/// `<fileName><padding><verdict>` spanning `width` columns
pub fn format_verdict_line(file_name: &str, verdict: &str, width: usize) -> String {
    pad_between(file_name, verdict, width)
}

/// Columns covered by the completed fraction `index / total`
pub fn completion_columns(index: usize, total: usize, width: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let fraction = index.min(total) as f64 / total as f64;
    (fraction * width as f64).round() as usize
}

fn pad_between(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let room = width.saturating_sub(right_len + 1);
    let left: String = left.chars().take(room.max(1)).collect();
    let gap = width
        .saturating_sub(left.chars().count() + right_len)
        .max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// Colored verdict shown for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Valid,
    Invalid,
    Fail,
}

impl Verdict {
    fn word(self) -> &'static str {
        match self {
            Verdict::Valid => "valid",
            Verdict::Invalid => "invalid",
            Verdict::Fail => "fail",
        }
    }

    fn color(self) -> Color {
        match self {
            Verdict::Valid => Color::Green,
            Verdict::Invalid | Verdict::Fail => Color::Red,
        }
    }
}

/// Renders pipeline events to the terminal or as plain text
#[derive(Debug)]
pub struct ProgressDisplay {
    is_terminal: bool,
    width: usize,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressDisplay {
    /// Create a display matching the current stdout
    pub fn new() -> Self {
        Self::with_mode(atty::is(atty::Stream::Stdout))
    }

    /// Create a display with an explicit mode
    pub fn with_mode(is_terminal: bool) -> Self {
        Self {
            is_terminal,
            width: progress::FALLBACK_COLUMNS as usize,
        }
    }

    /// Consumes events until every reporter is dropped
    pub fn spawn(mut self, mut rx: mpsc::UnboundedReceiver<PipelineEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                if let Err(e) = self.render(&mut out, &event) {
                    debug!("Progress render failed: {}", e);
                }
            }
            debug!("Progress event channel closed");
        })
    }

    /// Writes one event to `out`
    pub fn render<W: Write>(&mut self, out: &mut W, event: &PipelineEvent) -> io::Result<()> {
        if self.is_terminal {
            self.width = terminal::size()
                .map(|(columns, _)| columns as usize)
                .unwrap_or(progress::FALLBACK_COLUMNS as usize);
            self.render_terminal(out, event)?;
        } else {
            self.render_text(out, event)?;
        }
        out.flush()
    }

    fn render_terminal<W: Write>(&self, out: &mut W, event: &PipelineEvent) -> io::Result<()> {
        match event {
            PipelineEvent::PhaseStarted { phase, total } => {
                queue!(out, Clear(ClearType::CurrentLine), cursor::MoveToColumn(0))?;
                let (heading, rule) = phase_heading(*phase, *total);
                queue!(
                    out,
                    Print(heading),
                    Print("\n"),
                    Print(rule.repeat(self.width)),
                    Print("\n")
                )?;
            }
            PipelineEvent::Resolved {
                index,
                total,
                file_name,
                size_bytes,
            } => {
                let line = format_status_line(*index, *total, "", file_name, *size_bytes, self.width);
                self.draw_status(out, &line)?;
            }
            PipelineEvent::LookupFailed { error, .. } => {
                queue!(
                    out,
                    Clear(ClearType::CurrentLine),
                    cursor::MoveToColumn(0),
                    SetForegroundColor(Color::Red),
                    Print(format!("HTTP request failed. Reason: {}", error)),
                    ResetColor,
                    Print("\n")
                )?;
            }
            PipelineEvent::ExistingValid { file_name, .. } => {
                self.draw_verdict(out, file_name, Verdict::Valid)?;
            }
            PipelineEvent::ExistingInvalid { file_name, .. } => {
                self.draw_verdict(out, file_name, Verdict::Invalid)?;
            }
            PipelineEvent::Downloading {
                index,
                total,
                file_name,
                size_bytes,
            } => {
                let line = format_status_line(
                    *index,
                    *total,
                    "Downloading",
                    file_name,
                    *size_bytes,
                    self.width,
                );
                self.draw_status(out, &line)?;
            }
            PipelineEvent::Downloaded { .. } => {}
            PipelineEvent::DownloadFailed { file_name, .. } => {
                self.draw_verdict(out, file_name, Verdict::Fail)?;
            }
            PipelineEvent::OverlayMerged { files_copied } => {
                queue!(
                    out,
                    Clear(ClearType::CurrentLine),
                    cursor::MoveToColumn(0),
                    Print(format!("Copied {} override files.\n", files_copied))
                )?;
            }
        }
        Ok(())
    }

    fn draw_status<W: Write>(&self, out: &mut W, line: &StatusLine) -> io::Result<()> {
        let split = line
            .text
            .char_indices()
            .nth(line.filled)
            .map(|(i, _)| i)
            .unwrap_or(line.text.len());
        let (done, rest) = line.text.split_at(split);

        queue!(
            out,
            cursor::MoveToColumn(0),
            SetAttribute(Attribute::Reverse),
            Print(done),
            SetAttribute(Attribute::Reset),
            Print(rest),
            Print("\r")
        )
    }

    fn draw_verdict<W: Write>(&self, out: &mut W, file_name: &str, verdict: Verdict) -> io::Result<()> {
        let line = format_verdict_line(file_name, verdict.word(), self.width);
        let name_part = &line[..line.len() - verdict.word().len()];

        queue!(
            out,
            Clear(ClearType::CurrentLine),
            cursor::MoveToColumn(0),
            Print(name_part),
            SetForegroundColor(verdict.color()),
            Print(verdict.word()),
            ResetColor,
            Print("\n")
        )
    }

    fn render_text<W: Write>(&self, out: &mut W, event: &PipelineEvent) -> io::Result<()> {
        match event {
            PipelineEvent::PhaseStarted { phase, total } => {
                writeln!(out, "{}", phase_heading(*phase, *total).0)
            }
            PipelineEvent::Resolved {
                index,
                total,
                file_name,
                size_bytes,
            } => writeln!(
                out,
                "[{}/{}] {} ({:.2} MB)",
                index,
                total,
                file_name,
                *size_bytes as f64 / progress::BYTES_PER_MB
            ),
            PipelineEvent::LookupFailed {
                index,
                total,
                project_id,
                file_id,
                error,
            } => writeln!(
                out,
                "[{}/{}] lookup failed for project {} file {}: {}",
                index, total, project_id, file_id, error
            ),
            PipelineEvent::ExistingValid { file_name, .. } => {
                writeln!(out, "{} {}", file_name, Verdict::Valid.word())
            }
            PipelineEvent::ExistingInvalid { file_name, .. } => {
                writeln!(out, "{} {}", file_name, Verdict::Invalid.word())
            }
            PipelineEvent::Downloading {
                index,
                total,
                file_name,
                size_bytes,
            } => writeln!(
                out,
                "[{}/{}] Downloading {} ({:.2} MB)",
                index,
                total,
                file_name,
                *size_bytes as f64 / progress::BYTES_PER_MB
            ),
            PipelineEvent::Downloaded { file_name, .. } => writeln!(out, "{} done", file_name),
            PipelineEvent::DownloadFailed {
                file_name, error, ..
            } => writeln!(out, "{} {}: {}", file_name, Verdict::Fail.word(), error),
            PipelineEvent::OverlayMerged { files_copied } => {
                writeln!(out, "Copied {} override files.", files_copied)
            }
        }
    }
}

fn phase_heading(phase: Phase, total: usize) -> (String, &'static str) {
    match phase {
        Phase::Resolving => (format!("Fetching mod info for {} entries...", total), "="),
        Phase::Downloading => (
            format!("Total {} mods to install. Downloading...", total),
            "#",
        ),
        Phase::Merging => ("Done downloading. Copying overrides...".to_string(), "/"),
    }
}

/// Hides the cursor for its lifetime
///
/// The cursor is shown again on drop, whichever way the run ends.
#[derive(Debug)]
pub struct TerminalGuard {
    active: bool,
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalGuard {
    pub fn new() -> Self {
        let active = atty::is(atty::Stream::Stdout) && execute!(io::stdout(), cursor::Hide).is_ok();
        Self { active }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = execute!(io::stdout(), cursor::Show);
        }
    }
}

/// Spinner for steps without measurable progress
///
/// Hidden when stdout is not a terminal.
pub fn spinner(message: impl Into<Cow<'static, str>>) -> ProgressBar {
    if !atty::is(atty::Stream::Stdout) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(progress::SPINNER_TICK_MS));
    pb
}
