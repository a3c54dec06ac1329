pub mod config;
pub mod context;
pub mod report;
pub mod reset;
pub mod run;
pub mod status;
