pub mod config;
pub mod formatter;
pub mod gateway;
pub mod http;
pub mod services;
