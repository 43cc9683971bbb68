pub mod auth;
pub mod commands;
pub mod config;
pub mod session;
pub mod util;
