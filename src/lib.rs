//! Dexview - paginated catalog browser built on tui-dispatch
//!
//! The library exposes the app's modules for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod logging;
pub mod reconcile;
pub mod reducer;
pub mod state;
