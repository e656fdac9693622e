//! CLI command handlers, one per file.

mod checksum;
mod docs;
mod download;
mod hosts;
mod upload;
mod verify;

pub use checksum::run_checksum;
pub use docs::{run_completions, run_man};
pub use download::run_download;
pub use hosts::run_hosts;
pub use upload::run_upload;
pub use verify::run_verify;
