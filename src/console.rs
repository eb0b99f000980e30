//! Stage progress lines for the command-line tool
//!
//! Each stage prints `name [  ✓  ]` in green on success or `name [  X  ]` in
//! red on failure. Everything goes to stderr so that JSON on stdout stays
//! clean.

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};
use std::time::Instant;

pub struct Theme {
    pub success: Color,
    pub error: Color,
    pub comment: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    success: Color::Rgb {
        r: 166,
        g: 227,
        b: 161,
    },
    error: Color::Rgb {
        r: 243,
        g: 139,
        b: 168,
    },
    comment: Color::Rgb {
        r: 108,
        g: 112,
        b: 134,
    },
};

/// Run `task` as a named stage and report how it went.
pub fn stage<T, E>(name: &str, task: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let started = Instant::now();
    let result = task();
    let (mark, color) = match result {
        Ok(_) => ("\u{2713}", DEFAULT_THEME.success),
        Err(_) => ("X", DEFAULT_THEME.error),
    };

    if let Err(err) = report(name, mark, color, started.elapsed().as_millis()) {
        log::warn!("Failed to report stage '{name}': {err}");
    }
    result
}

fn report(name: &str, mark: &str, color: Color, millis: u128) -> io::Result<()> {
    let mut stderr = io::stderr();
    execute!(
        stderr,
        Print(name),
        SetForegroundColor(DEFAULT_THEME.comment),
        Print(" ["),
        SetForegroundColor(color),
        Print(format!("  {mark}  ")),
        SetForegroundColor(DEFAULT_THEME.comment),
        Print(format!("] {millis}ms")),
        ResetColor,
        Print("\n"),
    )?;
    stderr.flush()
}
