pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod directory;
pub mod output;
pub mod pagination;
pub mod player;
pub mod query;
pub mod session;
pub mod store;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
