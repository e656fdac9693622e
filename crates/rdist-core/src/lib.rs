pub mod config;
pub mod logging;

pub mod backend;
pub mod checksum;
pub mod manifest;
pub mod orchestrator;
pub mod reliability;
