pub mod commands;
pub mod config;
pub mod delivery;
pub mod dom;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod scheduler;
pub mod simulate;
