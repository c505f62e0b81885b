//! Human readable commands.
use crate::base::ActionKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// A command given by a human operator.
///
/// Nodes, vulnerabilities, ports and credentials are referenced by name.
/// Environments implementing [`CommandEnv`](crate::CommandEnv) translate
/// commands into their own actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Command {
    /// Exploits a local vulnerability on an owned node.
    Local {
        /// Target node.
        node: String,
        /// Local vulnerability.
        vulnerability: String,
    },

    /// Exploits a remote vulnerability of a discovered node.
    Remote {
        /// Owned node the attack is launched from.
        source: String,
        /// Remote vulnerability.
        vulnerability: String,
        /// Profile used to issue the request.
        #[serde(default)]
        profile: String,
        /// Property targeted by the request.
        #[serde(default)]
        property: String,
    },

    /// Connects to a remote node with a credential.
    Connect {
        /// Owned node the connection is opened from.
        source: String,
        /// Target node.
        target: String,
        /// Port name.
        port: String,
        /// Credential identifier.
        credential: String,
    },
}

impl Command {
    /// Kind of the action the command translates to.
    pub fn kind(&self) -> ActionKind {
        match self {
            Command::Local { .. } => ActionKind::Local,
            Command::Remote { .. } => ActionKind::Remote,
            Command::Connect { .. } => ActionKind::Connect,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Local {
                node,
                vulnerability,
            } => write!(f, "local {} {}", node, vulnerability),
            Command::Remote {
                source,
                vulnerability,
                profile,
                property,
            } => {
                write!(f, "remote {} {}", source, vulnerability)?;
                if !profile.is_empty() {
                    write!(f, " profile={}", profile)?;
                }
                if !property.is_empty() {
                    write!(f, " property={}", property)?;
                }
                Ok(())
            }
            Command::Connect {
                source,
                target,
                port,
                credential,
            } => write!(f, "connect {} {} {} {}", source, target, port, credential),
        }
    }
}

/// A sequence of commands replayed by the trace runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandScript {
    /// Commands in the order they are applied.
    pub commands: Vec<Command>,
}

impl CommandScript {
    /// Constructs a script.
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Loads a script from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let rdr = BufReader::new(File::open(path)?);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the script to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the script has no command.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command at the given position.
    pub fn get(&self, ix: usize) -> Option<&Command> {
        self.commands.get(ix)
    }

    /// Iterates over the commands.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}
