pub mod asset;
pub mod config;
pub mod generator;
pub mod http;
pub mod installer;
pub mod platform;
pub mod provider;
pub mod render;
pub mod server;
