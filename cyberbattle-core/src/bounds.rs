//! Bounds of the observation and action spaces.
use serde::{Deserialize, Serialize};

/// Identifiers referenced by an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identifiers {
    /// Node properties.
    pub properties: Vec<String>,

    /// Port names.
    pub ports: Vec<String>,

    /// Local vulnerabilities.
    pub local_vulnerabilities: Vec<String>,

    /// Remote vulnerabilities.
    pub remote_vulnerabilities: Vec<String>,
}

/// Bounds shared by environments a learner is trained or evaluated on.
///
/// Learners trained on one environment can be evaluated on another one
/// as long as both fit in the same bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentBounds {
    /// Maximum number of nodes.
    pub maximum_node_count: usize,

    /// Maximum number of credentials that can be gathered.
    pub maximum_total_credentials: usize,

    /// Number of node properties.
    pub property_count: usize,

    /// Number of ports.
    pub port_count: usize,

    /// Number of local vulnerabilities.
    pub local_attacks_count: usize,

    /// Number of remote vulnerabilities.
    pub remote_attacks_count: usize,
}

impl EnvironmentBounds {
    /// Constructs bounds from the identifiers of an environment.
    pub fn of_identifiers(
        maximum_node_count: usize,
        maximum_total_credentials: usize,
        identifiers: &Identifiers,
    ) -> Self {
        Self {
            maximum_node_count,
            maximum_total_credentials,
            property_count: identifiers.properties.len(),
            port_count: identifiers.ports.len(),
            local_attacks_count: identifiers.local_vulnerabilities.len(),
            remote_attacks_count: identifiers.remote_vulnerabilities.len(),
        }
    }

    /// Bounds with the given number of nodes and no identifiers.
    pub fn with_node_count(maximum_node_count: usize) -> Self {
        Self::of_identifiers(maximum_node_count, 0, &Identifiers::default())
    }
}
