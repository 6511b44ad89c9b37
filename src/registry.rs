use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::Config;

pub type Handler = fn(&CommandContext, &[String]) -> anyhow::Result<()>;

/// Shared state handed to every command handler.
pub struct CommandContext<'a> {
    pub registry: &'a Registry,
    pub config: &'a Config,
}

/// A named, documented, callable operation. Built once at process start;
/// never mutated afterwards.
#[derive(Debug)]
pub struct Command {
    pub name: &'static str,
    /// Multi-line help text. The first line doubles as the usage summary.
    /// Empty means "no help available".
    pub description: &'static str,
    pub handler: Handler,
}

impl Command {
    pub fn new(name: &'static str, description: &'static str, handler: Handler) -> Self {
        Command {
            name,
            description,
            handler,
        }
    }

    pub fn short_description(&self) -> &'static str {
        self.description.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command {0:?} is already registered")]
    DuplicateCommand(String),
    #[error("no command found for {0}")]
    UnknownCommand(String),
}

/// Name → command mapping. Lookup is case-sensitive exact match; there is no
/// fuzzy or prefix matching.
#[derive(Default)]
pub struct Registry {
    commands: BTreeMap<&'static str, Command>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Duplicate names are rejected rather than overwritten, so a collision
    /// in the registration table surfaces instead of shadowing a command.
    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        if self.commands.contains_key(command.name) {
            return Err(RegistryError::DuplicateCommand(command.name.to_string()));
        }
        self.commands.insert(command.name, command);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&Command, RegistryError> {
        self.commands
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))
    }

    /// Every registered (name, usage summary) pair, sorted by name.
    pub fn list_commands(&self) -> Vec<(&'static str, &'static str)> {
        self.commands
            .values()
            .map(|c| (c.name, c.short_description()))
            .collect()
    }

    /// Full help text for a command. A command without help text yields a
    /// sentinel message instead of an error.
    pub fn describe(&self, name: &str) -> Result<String, RegistryError> {
        let command = self.resolve(name)?;
        if command.description.is_empty() {
            return Ok(format!("No help information found for command {}", name));
        }
        Ok(command.description.to_string())
    }
}
