pub mod common;
pub mod config;
pub mod geocoding;
pub mod plugin;

pub mod database;
pub mod server;
pub mod services;
