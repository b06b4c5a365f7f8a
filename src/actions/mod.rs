//! Per-button state for the like toggle and the add-to-playlist dialog.

mod like;
mod playlist;

pub use like::*;
pub use playlist::*;
