//! Transparent `git` wrapper that keeps a local mirror per clone source and
//! turns every full clone into a `--reference` clone against it.

pub mod args;
pub mod cache;
pub mod config;
pub mod delegate;
pub mod event_log;
pub mod locate;
pub mod populate;
pub mod wrapper;

pub use config::Config;
