//! A hand-wired blocks-world network.
//!
//! The single rule `blocks-red-right` matches
//! `(<x> on <y>) (<y> left_of <z>) (<z> color red)`:
//!
//! ```text
//! root ── attr == on ─────────────────────── on_facts ── adapter ─┐
//!      ├─ attr == left_of ────────────────── left_of_facts ─── join(y) ── pending ─┐
//!      └─ attr == color ── value == red ──── red_facts ─────────────────── join(z) ── matches ── terminal
//! ```

use rete_facts::{ConditionTest, Field, JoinTest, Token, Variable};

use crate::config::NetworkConfig;
use crate::error::{ActionError, ReteError};
use crate::network::{NodeId, ReteNetwork};

/// Name of the rule wired by [`blocks_world`].
pub const BLOCKS_RULE: &str = "blocks-red-right";

/// Node IDs of interest in the blocks-world network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlocksWorld {
    pub on_facts: NodeId,
    pub left_of_facts: NodeId,
    pub red_facts: NodeId,
    pub first: NodeId,
    /// Tokens `[(x on y), (y left_of z)]`.
    pub pending: NodeId,
    /// Tokens `[(x on y), (y left_of z), (z color red)]`.
    pub matches: NodeId,
    pub terminal: NodeId,
}

/// Build the blocks-world network, running `action` for each match.
pub fn blocks_world<F>(config: NetworkConfig, action: F) -> Result<(ReteNetwork, BlocksWorld), ReteError>
where
    F: FnMut(&str, &Token) -> Result<(), ActionError> + Send + 'static,
{
    let mut net = ReteNetwork::new(config);
    let root = net.root();

    let on = net.add_condition(root, ConditionTest::equals(Field::Attribute, "on"))?;
    let on_facts = net.add_fact_memory(on)?;

    let left_of = net.add_condition(root, ConditionTest::equals(Field::Attribute, "left_of"))?;
    let left_of_facts = net.add_fact_memory(left_of)?;

    let color = net.add_condition(root, ConditionTest::equals(Field::Attribute, "color"))?;
    let red = net.add_condition(color, ConditionTest::equals(Field::Value, "red"))?;
    let red_facts = net.add_fact_memory(red)?;

    let first = net.add_adapter(on_facts)?;

    // (<y> left_of <z>): id must equal the value of (<x> on <y>)
    let join_y = net.register_join(
        Some(left_of_facts),
        Some(first),
        vec![JoinTest::equals(Field::Identifier, 0, Field::Value).with_binding(Variable::new("y"))],
    )?;
    let pending = net.add_partial_match_memory(join_y)?;

    // (<z> color red): id must equal the value of (<y> left_of <z>)
    let join_z = net.register_join(
        Some(red_facts),
        Some(pending),
        vec![JoinTest::equals(Field::Identifier, 1, Field::Value).with_binding(Variable::new("z"))],
    )?;
    let matches = net.add_partial_match_memory(join_z)?;
    let terminal = net.add_terminal(matches, BLOCKS_RULE, action)?;

    Ok((
        net,
        BlocksWorld {
            on_facts,
            left_of_facts,
            red_facts,
            first,
            pending,
            matches,
            terminal,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NodeKind;

    #[test]
    fn test_blocks_world_shape() {
        let (net, ids) = blocks_world(NetworkConfig::default(), |_, _| Ok(())).unwrap();

        assert_eq!(net.count(NodeKind::Condition), 4);
        assert_eq!(net.count(NodeKind::FactMemory), 3);
        assert_eq!(net.count(NodeKind::Adapter), 1);
        assert_eq!(net.count(NodeKind::Join), 2);
        assert_eq!(net.count(NodeKind::PartialMatchMemory), 2);
        assert_eq!(net.count(NodeKind::Terminal), 1);

        assert_eq!(net.node(ids.pending).unwrap().token_arity(), Some(2));
        assert_eq!(net.node(ids.matches).unwrap().token_arity(), Some(3));
    }
}
