//! View implementations, one `impl GuiApp` block per screen.
//!
//! - `check` - wallet lookup
//! - `send` - batch transfer form, confirmation and progress

pub mod check;
pub mod send;
