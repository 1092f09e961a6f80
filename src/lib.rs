pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod ledger;
pub mod mailmap;
pub mod model;
pub mod progress;
pub mod report;
pub mod snapshot;
pub mod stats;
pub mod timeline;
pub mod util;
