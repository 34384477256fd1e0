//! Node definitions - the seven kinds of vertices in the network arena.

use rete_facts::{ConditionTest, Fact, JoinTest, Token};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::memory::Memory;
use crate::error::ActionError;

/// Index of a node in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Condition,
    FactMemory,
    PartialMatchMemory,
    Adapter,
    Join,
    Terminal,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Condition => "condition",
            NodeKind::FactMemory => "fact memory",
            NodeKind::PartialMatchMemory => "partial-match memory",
            NodeKind::Adapter => "adapter",
            NodeKind::Join => "join",
            NodeKind::Terminal => "terminal",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback run when a terminal receives a complete token.
pub type Action = Box<dyn FnMut(&str, &Token) -> Result<(), ActionError> + Send>;

/// Entry point for every inserted fact.
#[derive(Debug, Default)]
pub struct RootNode {
    pub children: Vec<NodeId>,
}

/// Single-field filter between the root and a fact memory.
#[derive(Debug)]
pub struct ConditionNode {
    pub test: ConditionTest,
    pub children: Vec<NodeId>,
}

/// Facts that passed one chain of condition tests.
#[derive(Debug)]
pub struct FactMemoryNode {
    pub facts: Memory<Arc<Fact>>,
    pub children: Vec<NodeId>,
}

/// Tokens produced so far at one point of a rule.
#[derive(Debug)]
pub struct PartialMatchMemoryNode {
    pub tokens: Memory<Token>,
    /// Length of every token stored here.
    pub arity: usize,
    pub children: Vec<NodeId>,
}

/// Presents a fact memory as a memory of one-fact tokens.
#[derive(Debug)]
pub struct AdapterNode {
    pub source: NodeId,
    pub tokens: Memory<Token>,
    pub children: Vec<NodeId>,
}

/// Extends tokens from `token_parent` with facts from `fact_parent`.
#[derive(Debug)]
pub struct JoinNode {
    pub fact_parent: Option<NodeId>,
    pub token_parent: Option<NodeId>,
    pub tests: Vec<JoinTest>,
    /// Length of the tokens this join emits.
    pub arity: usize,
    pub children: Vec<NodeId>,
}

/// A fully matched rule.
pub struct TerminalNode {
    pub name: String,
    pub action: Action,
}

impl std::fmt::Debug for TerminalNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalNode")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A vertex of the network, tagged by kind.
#[derive(Debug)]
pub enum Node {
    Root(RootNode),
    Condition(ConditionNode),
    FactMemory(FactMemoryNode),
    PartialMatchMemory(PartialMatchMemoryNode),
    Adapter(AdapterNode),
    Join(JoinNode),
    Terminal(TerminalNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Condition(_) => NodeKind::Condition,
            Node::FactMemory(_) => NodeKind::FactMemory,
            Node::PartialMatchMemory(_) => NodeKind::PartialMatchMemory,
            Node::Adapter(_) => NodeKind::Adapter,
            Node::Join(_) => NodeKind::Join,
            Node::Terminal(_) => NodeKind::Terminal,
        }
    }

    /// Nodes this node forwards activations to, in registration order.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Root(node) => &node.children,
            Node::Condition(node) => &node.children,
            Node::FactMemory(node) => &node.children,
            Node::PartialMatchMemory(node) => &node.children,
            Node::Adapter(node) => &node.children,
            Node::Join(node) => &node.children,
            Node::Terminal(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Node::Root(node) => Some(&mut node.children),
            Node::Condition(node) => Some(&mut node.children),
            Node::FactMemory(node) => Some(&mut node.children),
            Node::PartialMatchMemory(node) => Some(&mut node.children),
            Node::Adapter(node) => Some(&mut node.children),
            Node::Join(node) => Some(&mut node.children),
            Node::Terminal(_) => None,
        }
    }

    /// Length of the tokens this node emits, for token-producing kinds.
    pub fn token_arity(&self) -> Option<usize> {
        match self {
            Node::Adapter(_) => Some(1),
            Node::PartialMatchMemory(node) => Some(node.arity),
            Node::Join(node) => Some(node.arity),
            _ => None,
        }
    }

    /// Stored tokens, for the kinds that keep them.
    pub fn tokens(&self) -> Option<&[Token]> {
        match self {
            Node::PartialMatchMemory(node) => Some(node.tokens.as_slice()),
            Node::Adapter(node) => Some(node.tokens.as_slice()),
            _ => None,
        }
    }

    /// Stored facts, for fact memories.
    pub fn facts(&self) -> Option<&[Arc<Fact>]> {
        match self {
            Node::FactMemory(node) => Some(node.facts.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &str, _: &Token) -> Result<(), ActionError> {
        Ok(())
    }

    #[test]
    fn test_terminal_has_no_children() {
        let node = Node::Terminal(TerminalNode {
            name: "rule".to_string(),
            action: Box::new(noop),
        });
        assert!(node.children().is_empty());
        assert_eq!(node.kind(), NodeKind::Terminal);
        assert!(format!("{:?}", node).contains("rule"));
    }
}
