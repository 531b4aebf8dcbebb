//! Edit a configuration sheet (CSV) and export it back as CSV or as flat
//! `key: value` YAML.
//!
//! The table engine (`codec`, `table`, `columns`, `paging`, `export`,
//! `editor`) is synchronous and UI-agnostic; `app`, `ui` and `worker` wire it
//! to a terminal.

pub mod app;
pub mod codec;
pub mod columns;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod logging;
pub mod paging;
pub mod session;
pub mod table;
pub mod ui;
pub mod worker;
