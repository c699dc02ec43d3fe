//! Scan display: drives the [`ScanState`] machine from scan events and
//! user input, redrawing a [`Screen`] after each change.

pub mod state;
pub mod terminal;

pub use state::{FinishReason, Phase, ReportLine, ScanState, ViewEvent, QUIT_KEY};
pub use terminal::{PlainScreen, TerminalScreen};

use crate::error::ViewResult;
use crate::scanner::ScanEvent;
use futures::{Stream, StreamExt};
use std::io;
use tokio::sync::mpsc::UnboundedReceiver;

/// Input the display understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    /// Stop now and report what has been found so far.
    Quit,
    /// Terminal changed (e.g. resized); draw again.
    Redraw,
}

/// Output surface for the display.
pub trait Screen {
    /// Show the current state.
    fn draw(&mut self, state: &ScanState) -> ViewResult<()>;

    /// Leave the screen in a normal state once the view is done.
    fn finish(&mut self) -> ViewResult<()>;
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn draw(&mut self, state: &ScanState) -> ViewResult<()> {
        (**self).draw(state)
    }

    fn finish(&mut self) -> ViewResult<()> {
        (**self).finish()
    }
}

/// The event loop that owns the scan state.
pub struct ScanView<S> {
    state: ScanState,
    screen: S,
}

impl<S: Screen> ScanView<S> {
    pub fn new(screen: S) -> Self {
        Self {
            state: ScanState::new(),
            screen,
        }
    }

    /// Process events until the scan completes or the user quits.
    ///
    /// Returns the frozen state for reporting. Probes still running when the
    /// user quits are not waited for.
    pub async fn run<I>(
        mut self,
        events: &mut UnboundedReceiver<ScanEvent>,
        input: I,
    ) -> ViewResult<ScanState>
    where
        I: Stream<Item = io::Result<UserInput>> + Unpin,
    {
        let mut input = input.fuse();
        self.screen.draw(&self.state)?;

        loop {
            let event = tokio::select! {
                Some(key) = input.next() => match key? {
                    UserInput::Quit => ViewEvent::Quit,
                    UserInput::Redraw => {
                        self.screen.draw(&self.state)?;
                        continue;
                    }
                },
                event = events.recv() => match event {
                    Some(event) => ViewEvent::from(event),
                    None => {
                        tracing::warn!("scan engine stopped without signalling completion");
                        ViewEvent::Complete
                    }
                },
            };

            let finished = self.state.apply(event);
            self.screen.draw(&self.state)?;
            if finished {
                break;
            }
        }

        self.screen.finish()?;
        Ok(self.state)
    }
}
