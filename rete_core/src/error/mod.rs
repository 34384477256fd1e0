//! Error types for network construction, insertion and configuration.

use rete_facts::PredicateError;
use thiserror::Error;

use crate::network::{NodeId, NodeKind};

/// Error returned by a terminal action. The network never inspects it.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the network.
#[derive(Debug, Error)]
pub enum ReteError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("{child} cannot be attached under {parent} ({kind})")]
    InvalidParent {
        parent: NodeId,
        kind: NodeKind,
        child: NodeKind,
    },

    #[error("a join needs a fact memory, a token parent, or both")]
    DanglingJoin,

    #[error("join test reads token[{index}] but tokens from {parent} hold {arity} fact(s)")]
    TokenIndexOutOfRange {
        parent: NodeId,
        index: usize,
        arity: usize,
    },

    #[error("{node} ({kind}) is not a {expected}")]
    WrongKind {
        node: NodeId,
        kind: NodeKind,
        expected: &'static str,
    },

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error("action for rule `{rule}` failed")]
    Action {
        rule: String,
        #[source]
        source: ActionError,
    },

    #[error("shared network lock was poisoned")]
    Poisoned,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading a [`crate::NetworkConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
