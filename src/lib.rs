pub mod commands;
pub mod config;
pub mod deps;
pub mod heroku;
pub mod project;
pub mod registry;
pub mod secret;
pub mod shell;

mod testutil;
