// Slash commands
pub mod config;
pub mod panels;
pub mod ticket;
