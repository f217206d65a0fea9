pub mod calendar;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod goals;
pub mod ids;
pub mod ledger;
pub mod logging;
pub mod nutrition;
pub mod report;
pub mod state;
