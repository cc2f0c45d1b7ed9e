#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod fixtures;
pub mod server_utils;
