pub mod account;
pub mod backend;
pub mod cli;
pub mod client;
pub mod codes;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod generator;
pub mod logging;
pub mod session;
pub mod vault;
