//! Concrete screens: an interactive raw-mode status line and a plain
//! fallback for non-interactive use.

use super::{Screen, ScanState, UserInput};
use crate::error::{ViewError, ViewResult};
use console::style;
use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};
use futures::stream::{self, LocalBoxStream};
use futures::{future, StreamExt};
use std::io::{self, Stderr, Write};

/// Map a key press to a display input.
fn map_key(key: KeyEvent) -> Option<UserInput> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(UserInput::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserInput::Quit)
        }
        _ => None,
    }
}

/// In-place status line while the terminal is in raw mode.
///
/// Raw mode is needed to see single key presses (and Ctrl+C arrives as a
/// key, not a signal). The terminal is restored on `finish` and on drop.
pub struct TerminalScreen {
    out: Stderr,
    raw: bool,
}

impl TerminalScreen {
    /// Put the terminal into raw mode.
    pub fn init() -> ViewResult<Self> {
        enable_raw_mode().map_err(ViewError::Init)?;
        let mut screen = Self {
            out: io::stderr(),
            raw: true,
        };
        execute!(screen.out, Hide).map_err(ViewError::Init)?;
        Ok(screen)
    }

    /// Key presses from the terminal, as display inputs.
    pub fn input() -> LocalBoxStream<'static, io::Result<UserInput>> {
        EventStream::new()
            .filter_map(|event| {
                future::ready(match event {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        map_key(key).map(Ok)
                    }
                    Ok(Event::Resize(..)) => Some(Ok(UserInput::Redraw)),
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                })
            })
            .boxed_local()
    }

    fn status_line(state: &ScanState) -> String {
        let message = state.render();
        format!(
            "{} {}",
            style(message.trim_end()).cyan(),
            style(format!("[{} open]", state.open_count())).dim()
        )
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.raw {
            return Ok(());
        }
        self.raw = false;
        execute!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Show
        )?;
        disable_raw_mode()
    }
}

impl Screen for TerminalScreen {
    fn draw(&mut self, state: &ScanState) -> ViewResult<()> {
        // The report itself is printed after the terminal is restored.
        if state.is_finished() {
            return Ok(());
        }

        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(Self::status_line(state))
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> ViewResult<()> {
        Ok(self.restore()?)
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Non-interactive screen: one progress message on stderr, nothing else.
#[derive(Debug, Default)]
pub struct PlainScreen {
    announced: bool,
}

impl PlainScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ctrl+C as the only quit input.
    pub fn input() -> LocalBoxStream<'static, io::Result<UserInput>> {
        stream::once(async {
            tokio::signal::ctrl_c().await?;
            Ok::<_, io::Error>(UserInput::Quit)
        })
        .boxed_local()
    }
}

impl Screen for PlainScreen {
    fn draw(&mut self, state: &ScanState) -> ViewResult<()> {
        if !self.announced && !state.is_finished() {
            self.announced = true;
            eprintln!("{}", style("Scanning... Press Ctrl+C to quit").dim());
        }
        Ok(())
    }

    fn finish(&mut self) -> ViewResult<()> {
        Ok(())
    }
}
