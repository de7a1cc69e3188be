//! Desktop shell built with egui/eframe.
//!
//! - `app` - GuiApp state, job polling and the frame loop
//! - `async_job` - background work on a worker thread, polled per frame
//! - `theme` - colors and styled widgets
//! - `helpers` - small formatting helpers for the views
//! - `notifications` - notification history
//! - `views` - the check and send screens
//!
//! ```no_run
//! use monview::config::Config;
//! use monview::gui;
//!
//! let config = Config::from_env();
//! gui::launch(config).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod helpers;
pub mod notifications;
pub mod theme;
pub mod views;

pub use app::{launch, GuiApp, GuiSection};
pub use async_job::AsyncJob;
pub use notifications::{NotificationEntry, NotificationLevel, Notifications};
pub use theme::{configure_style, AppTheme};
