//! Process-level infrastructure shared by every other crate: command line
//! configuration, the event log file and the `log` facade wiring.

pub mod config;
pub mod event_log;
pub mod logging;

pub use event_log::EventLog;
