//! Diagnostics: statistics, text dumps and serializable snapshots.
//!
//! None of these formats are stable; they exist for debugging.

use rete_facts::{ConditionTest, Fact, JoinTest, Token};
use serde::Serialize;
use std::sync::Arc;

use super::{NetworkId, Node, NodeId, NodeKind, ReteNetwork};
use crate::config::NetworkConfig;
use crate::error::ReteError;

/// Network statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub total_nodes: usize,
    pub conditions: usize,
    pub fact_memories: usize,
    pub partial_match_memories: usize,
    pub adapters: usize,
    pub joins: usize,
    pub terminals: usize,
    /// Facts held by all fact memories, repeats included.
    pub stored_facts: usize,
    /// Tokens held by all partial-match memories and adapters.
    pub stored_tokens: usize,
    pub facts_inserted: u64,
    /// (fact, token) pairs tested by joins.
    pub join_attempts: u64,
    /// Extended tokens emitted by joins.
    pub tokens_emitted: u64,
    pub rules_fired: u64,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Nodes: {} (cond:{}, fmem:{}, pmem:{}, adapt:{}, join:{}, term:{}), Facts: {}, Tokens: {}, Inserted: {}, Joins: {}/{}, Fired: {}",
            self.total_nodes,
            self.conditions,
            self.fact_memories,
            self.partial_match_memories,
            self.adapters,
            self.joins,
            self.terminals,
            self.stored_facts,
            self.stored_tokens,
            self.facts_inserted,
            self.tokens_emitted,
            self.join_attempts,
            self.rules_fired
        )
    }
}

/// Serializable view of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub children: Vec<NodeId>,
    #[serde(flatten)]
    pub detail: NodeDetail,
}

/// Per-kind contents of a [`NodeSnapshot`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDetail {
    Root,
    Condition {
        test: ConditionTest,
    },
    FactMemory {
        facts: Vec<Arc<Fact>>,
    },
    PartialMatchMemory {
        arity: usize,
        tokens: Vec<Token>,
    },
    Adapter {
        source: NodeId,
        tokens: Vec<Token>,
    },
    Join {
        fact_parent: Option<NodeId>,
        token_parent: Option<NodeId>,
        tests: Vec<JoinTest>,
    },
    Terminal {
        name: String,
    },
}

/// Serializable view of a whole network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub network: NetworkId,
    pub config: NetworkConfig,
    pub stats: NetworkStats,
    pub nodes: Vec<NodeSnapshot>,
}

impl NetworkSnapshot {
    /// Render the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl ReteNetwork {
    /// Get network statistics.
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats {
            total_nodes: self.nodes.len(),
            facts_inserted: self.counters.facts_inserted,
            join_attempts: self.counters.join_attempts,
            tokens_emitted: self.counters.tokens_emitted,
            rules_fired: self.counters.rules_fired,
            ..Default::default()
        };

        for node in &self.nodes {
            match node {
                Node::Root(_) => {}
                Node::Condition(_) => stats.conditions += 1,
                Node::FactMemory(memory) => {
                    stats.fact_memories += 1;
                    stats.stored_facts += memory.facts.len();
                }
                Node::PartialMatchMemory(memory) => {
                    stats.partial_match_memories += 1;
                    stats.stored_tokens += memory.tokens.len();
                }
                Node::Adapter(adapter) => {
                    stats.adapters += 1;
                    stats.stored_tokens += adapter.tokens.len();
                }
                Node::Join(_) => stats.joins += 1,
                Node::Terminal(_) => stats.terminals += 1,
            }
        }

        stats
    }

    /// Describe one node: its configuration, links and stored contents.
    pub fn describe(&self, id: NodeId) -> Result<String, ReteError> {
        let node = self.node(id)?;
        let mut text = format!("{} {}", id, node.kind());

        match node {
            Node::Root(_) => {}
            Node::Condition(condition) => text.push_str(&format!(" [{}]", condition.test)),
            Node::FactMemory(memory) => text.push_str(&format!(" ({} facts)", memory.facts.len())),
            Node::PartialMatchMemory(memory) => text.push_str(&format!(
                " (arity {}, {} tokens)",
                memory.arity,
                memory.tokens.len()
            )),
            Node::Adapter(adapter) => text.push_str(&format!(
                " of {} ({} tokens)",
                adapter.source,
                adapter.tokens.len()
            )),
            Node::Join(join) => {
                text.push_str(&format!(
                    " [facts {}, tokens {}]",
                    describe_parent(join.fact_parent),
                    describe_parent(join.token_parent)
                ));
                if !join.tests.is_empty() {
                    let tests: Vec<_> = join.tests.iter().map(|t| t.to_string()).collect();
                    text.push_str(&format!(" where {}", tests.join(" and ")));
                }
            }
            Node::Terminal(terminal) => text.push_str(&format!(" \"{}\"", terminal.name)),
        }

        if !node.children().is_empty() {
            let children: Vec<_> = node.children().iter().map(|c| c.to_string()).collect();
            text.push_str(&format!(" -> {}", children.join(", ")));
        }
        text.push('\n');

        if let Some(facts) = node.facts() {
            for fact in facts {
                text.push_str(&format!("    {}\n", fact));
            }
        }
        if let Some(tokens) = node.tokens() {
            for token in tokens {
                text.push_str(&format!("    {}\n", token));
            }
        }

        Ok(text)
    }

    /// Describe every node, in arena order.
    pub fn dump(&self) -> String {
        let mut text = format!("network {}\n", self.id);
        for (id, _) in self.nodes() {
            if let Ok(description) = self.describe(id) {
                text.push_str(&description);
            }
        }
        text
    }

    /// Capture the network's structure and contents.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let nodes = self
            .nodes()
            .map(|(id, node)| NodeSnapshot {
                id,
                children: node.children().to_vec(),
                detail: detail(node),
            })
            .collect();

        NetworkSnapshot {
            network: self.id,
            config: self.config.clone(),
            stats: self.stats(),
            nodes,
        }
    }

    /// Count the nodes of one kind.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|node| node.kind() == kind).count()
    }
}

fn describe_parent(parent: Option<NodeId>) -> String {
    parent.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

fn detail(node: &Node) -> NodeDetail {
    match node {
        Node::Root(_) => NodeDetail::Root,
        Node::Condition(condition) => NodeDetail::Condition {
            test: condition.test.clone(),
        },
        Node::FactMemory(memory) => NodeDetail::FactMemory {
            facts: memory.facts.as_slice().to_vec(),
        },
        Node::PartialMatchMemory(memory) => NodeDetail::PartialMatchMemory {
            arity: memory.arity,
            tokens: memory.tokens.as_slice().to_vec(),
        },
        Node::Adapter(adapter) => NodeDetail::Adapter {
            source: adapter.source,
            tokens: adapter.tokens.as_slice().to_vec(),
        },
        Node::Join(join) => NodeDetail::Join {
            fact_parent: join.fact_parent,
            token_parent: join.token_parent,
            tests: join.tests.clone(),
        },
        Node::Terminal(terminal) => NodeDetail::Terminal {
            name: terminal.name.clone(),
        },
    }
}
