use std::collections::HashSet;

use opensilicon_core::{NetlistNode, NodeKind, GROUND_NET, SUPPLY_NET};

/// Naming and node-registration state for a single extraction call.
///
/// Every call builds its own context, so concurrent extractions never share
/// counters and names restart at zero for each result.
#[derive(Debug)]
pub struct ExtractionContext {
    nodes: Vec<NetlistNode>,
    node_names: HashSet<String>,
    next_net: usize,
    next_device: usize,
    next_parasitic: usize,
}

impl ExtractionContext {
    /// A fresh context with the global supplies already registered.
    pub fn new() -> Self {
        let mut ctx = Self {
            nodes: Vec::new(),
            node_names: HashSet::new(),
            next_net: 0,
            next_device: 0,
            next_parasitic: 0,
        };
        ctx.register_node(SUPPLY_NET, NodeKind::Power);
        ctx.register_node(GROUND_NET, NodeKind::Ground);
        ctx
    }

    /// Register a node unless one with the same name exists. Returns whether
    /// the node was new.
    pub fn register_node(&mut self, name: &str, kind: NodeKind) -> bool {
        if self.node_names.contains(name) {
            return false;
        }
        self.node_names.insert(name.to_string());
        self.nodes.push(NetlistNode::new(name, kind));
        true
    }

    /// Allocate and register a new signal net.
    pub fn fresh_net(&mut self) -> String {
        loop {
            let name = format!("n{}", self.next_net);
            self.next_net += 1;
            if self.register_node(&name, NodeKind::Signal) {
                return name;
            }
        }
    }

    pub fn next_device_name(&mut self) -> String {
        let name = format!("M{}", self.next_device);
        self.next_device += 1;
        name
    }

    pub fn next_parasitic_name(&mut self) -> String {
        let name = format!("RP{}", self.next_parasitic);
        self.next_parasitic += 1;
        name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn into_nodes(self) -> Vec<NetlistNode> {
        self.nodes
    }
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self::new()
    }
}
