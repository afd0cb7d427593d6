//! Fetch status indicator: a small square in the top-right corner.

use embedded_graphics::pixelcolor::Rgb565;

use crate::{
    colors,
    layout::{DrawCommand, spec::StatusSpec},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusIndicator {
    /// Fetch in progress.
    Checking,
    /// Reading accepted (the square blends into the background).
    Ok,
    /// Reading fetched but rejected by validation.
    Invalid,
    /// Fetch failed or returned no data.
    Failed,
}

impl StatusIndicator {
    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Checking => colors::STATUS_CHECKING,
            Self::Ok => colors::STATUS_OK,
            Self::Invalid => colors::STATUS_INVALID,
            Self::Failed => colors::STATUS_FAILED,
        }
    }

    pub fn command(
        self,
        spec: &StatusSpec,
    ) -> DrawCommand {
        DrawCommand::FillRect { top_left: spec.top_left, size: spec.size, color: self.color() }
    }
}
