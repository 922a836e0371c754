//! Events exchanged with a front-end.
//!
//! A front-end forwards user [`Intent`]s to [`crate::F75111::apply`] and
//! renders the [`DisplayUpdate`]s it gets back, plus those pushed by the
//! polling loop through a [`DisplaySink`].

use crate::gpio::{GpioLevel, GpioPin, Mode};
use std::sync::mpsc;

/// A user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SwitchToInput,
    SwitchToOutput,
    SetAllHigh,
    SetAllLow,
    SetPin { pin: GpioPin, level: GpioLevel },
}

/// A change the front-end should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUpdate {
    /// Pin indicator. `None` blanks it.
    Level {
        pin: GpioPin,
        level: Option<GpioLevel>,
    },
    /// Output control state of a pin, taken from the output shadow.
    Driven { pin: GpioPin, level: GpioLevel },
    /// Confirms a completed mode switch.
    ModeChanged(Mode),
}

impl DisplayUpdate {
    pub(crate) fn blank_all() -> impl Iterator<Item = DisplayUpdate> {
        GpioPin::all().map(|pin| DisplayUpdate::Level { pin, level: None })
    }
}

/// Receives display updates.
pub trait DisplaySink {
    fn show(&mut self, update: DisplayUpdate);
}

impl DisplaySink for Vec<DisplayUpdate> {
    fn show(&mut self, update: DisplayUpdate) {
        self.push(update);
    }
}

/// Forwards updates to another thread. A hung-up receiver is ignored.
impl DisplaySink for mpsc::Sender<DisplayUpdate> {
    fn show(&mut self, update: DisplayUpdate) {
        let _ = self.send(update);
    }
}
