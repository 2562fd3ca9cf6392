//! toastq: transient notifications with self-expiring lifetimes
//!
//! The [`notifications`] module is the library proper. The remaining modules
//! back the `toastq` scenario runner binary.

pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod logging;
pub mod notifications;
