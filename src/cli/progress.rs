// Thinking indicator shown while a turn runs
//
// On a TTY: a braille spinner with whole seconds elapsed, advanced by the
// executor's poll loop. Off a TTY: a single static "Thinking..." line.

use std::io::{self, IsTerminal, Write};

use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::turn::ProgressSink;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];

/// "Thinking", then "Thinking 3s" once a second has passed
pub fn thinking_label(elapsed_secs: u64) -> String {
    if elapsed_secs > 0 {
        format!("Thinking {}s", elapsed_secs)
    } else {
        "Thinking".to_string()
    }
}

pub struct Spinner {
    animate: bool,
    is_tty: bool,
    bar: Option<ProgressBar>,
    notice_shown: bool,
}

impl Spinner {
    /// `animate = false` keeps the static notice but skips ticking updates
    pub fn new(animate: bool) -> Self {
        Self {
            animate,
            is_tty: io::stdout().is_terminal(),
            bar: None,
            notice_shown: false,
        }
    }

    fn start_bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            erase_line();
            let style = ProgressStyle::with_template("  {spinner:.dim} {msg:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(FRAMES);
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            bar.set_style(style);
            bar
        })
    }
}

fn erase_line() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\r");
    let _ = stdout.queue(Clear(ClearType::CurrentLine));
    let _ = stdout.flush();
}

impl ProgressSink for Spinner {
    fn notice(&mut self) {
        let mut stdout = io::stdout();
        let text = if self.is_tty {
            format!("\r  {} {}", FRAMES[0], thinking_label(0))
        } else {
            "  Thinking...".to_string()
        };
        let _ = write!(stdout, "{}", text.dark_grey());
        let _ = stdout.flush();
        self.notice_shown = true;
    }

    fn tick(&mut self, elapsed_secs: u64) {
        if !self.animate || !self.is_tty {
            return;
        }
        let bar = self.start_bar();
        bar.set_message(thinking_label(elapsed_secs));
        bar.tick();
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        } else if self.notice_shown {
            if self.is_tty {
                erase_line();
            } else {
                println!();
            }
        }
        self.notice_shown = false;
    }
}
