//! Browse, filter and edit a table of neurogram recordings, and transform
//! uploaded recordings (segment scrambling, carrier modulation).

pub mod app;
pub mod audio;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
