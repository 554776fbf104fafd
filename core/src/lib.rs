pub mod action;
pub mod api;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod process;
pub mod report;
pub mod run;
