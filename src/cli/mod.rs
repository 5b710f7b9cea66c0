//! CLI subcommand implementations for the mapscout binary.

pub mod capture_cmd;
pub mod doctor;
pub mod filter_cmd;
pub mod menu;
pub mod output;
pub mod prompt;
pub mod scan_cmd;
