//! Static suggestion catalog for the docker CLI.
//!
//! The catalog is one embedded JSON asset parsed once at startup. Commands,
//! subcommands, and flags are pure data; nothing here touches the engine or
//! the network.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use super::Suggestion;

/// The embedded catalog asset.
const CATALOG_JSON: &str = include_str!("../../assets/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog asset is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog asset is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    commands: Vec<CommandDoc>,
}

#[derive(Debug, Deserialize)]
struct CommandDoc {
    name: String,
    description: String,
    #[serde(default)]
    subcommands: Vec<Suggestion>,
    #[serde(default)]
    flags: Vec<Suggestion>,
}

/// One top-level command and its completion tables.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub name: String,
    pub description: String,
    pub subcommands: Vec<Suggestion>,
    pub flags: Vec<Suggestion>,
}

/// Read-only catalog of known commands, loaded once at process start.
#[derive(Debug)]
pub struct Catalog {
    commands: Vec<CommandEntry>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Parse the embedded asset.
    pub fn load() -> Result<Self, CatalogError> {
        Self::from_json(CATALOG_JSON)
    }

    fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = serde_json::from_str(json)?;
        if doc.commands.is_empty() {
            return Err(CatalogError::Empty);
        }
        let commands: Vec<CommandEntry> = doc
            .commands
            .into_iter()
            .map(|c| CommandEntry {
                name: c.name,
                description: c.description,
                subcommands: c.subcommands,
                flags: c.flags,
            })
            .collect();
        let by_name = commands
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Ok(Self { commands, by_name })
    }

    /// Whether a token is a known top-level command.
    pub fn is_command(&self, token: &str) -> bool {
        self.by_name.contains_key(token)
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.by_name.get(name).map(|&i| &self.commands[i])
    }

    /// Top-level command suggestions for the root context.
    pub fn root_suggestions(&self) -> Vec<Suggestion> {
        self.commands
            .iter()
            .map(|c| Suggestion::new(&c.name, &c.description))
            .collect()
    }

    /// A command's full table: subcommands first, then flags.
    pub fn command_table(&self, name: &str) -> Vec<Suggestion> {
        match self.command(name) {
            Some(entry) => {
                let mut table = entry.subcommands.clone();
                table.extend(entry.flags.iter().cloned());
                table
            }
            None => Vec::new(),
        }
    }

    /// A command's flag suggestions.
    pub fn flags(&self, name: &str) -> Vec<Suggestion> {
        self.command(name)
            .map(|c| c.flags.clone())
            .unwrap_or_default()
    }

    /// A command's subcommand suggestions.
    pub fn subcommands(&self, name: &str) -> Vec<Suggestion> {
        self.command(name)
            .map(|c| c.subcommands.clone())
            .unwrap_or_default()
    }

    /// Whether `token` names a subcommand of `command`.
    pub fn is_subcommand(&self, command: &str, token: &str) -> bool {
        self.command(command)
            .map(|c| c.subcommands.iter().any(|s| s.text == token))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_asset() {
        let catalog = Catalog::load().unwrap();
        assert!(catalog.root_suggestions().len() > 50);
    }

    #[test]
    fn run_has_expected_description() {
        let catalog = Catalog::load().unwrap();
        let run = catalog.command("run").unwrap();
        assert_eq!(run.description, "Run a command in a new container");
    }

    #[test]
    fn run_flags_include_publish() {
        let catalog = Catalog::load().unwrap();
        let flags = catalog.flags("run");
        assert!(flags.iter().any(|f| f.text == "--publish"));
        assert!(flags.iter().any(|f| f.text == "-p"));
    }

    #[test]
    fn service_subcommands() {
        let catalog = Catalog::load().unwrap();
        assert!(catalog.is_subcommand("service", "create"));
        assert!(catalog.is_subcommand("service", "rollback"));
        assert!(!catalog.is_subcommand("service", "publish"));
    }

    #[test]
    fn command_table_puts_subcommands_first() {
        let catalog = Catalog::load().unwrap();
        let table = catalog.command_table("service");
        assert_eq!(table[0].text, "create");
        assert!(table.iter().any(|s| s.text == "--detach"));
    }

    #[test]
    fn unknown_command_yields_empty_tables() {
        let catalog = Catalog::load().unwrap();
        assert!(!catalog.is_command("docker"));
        assert!(catalog.command_table("docker").is_empty());
    }

    #[test]
    fn rejects_empty_doc() {
        assert!(matches!(
            Catalog::from_json(r#"{"commands": []}"#),
            Err(CatalogError::Empty)
        ));
    }
}
