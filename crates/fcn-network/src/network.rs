//! Logic Network - Input of Physical Design
//!
//! A logic network is a DAG of primary inputs and gates whose outputs are
//! exported through named primary outputs. Nodes are stored in creation
//! order, which is always a topological order because a gate can only read
//! nodes that already exist.
//!
//! ```text
//! LogicNetwork ──exact──▶ GateLevelLayout ──▶ DRV check / throughput
//! ```

use crate::error::{NetworkError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Node Types
// ============================================================================

/// Unique identifier for a node in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Logic functions available as network gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateType {
    Buf,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    Maj,
}

impl GateType {
    pub const ALL: [GateType; 9] = [
        GateType::Buf,
        GateType::Not,
        GateType::And,
        GateType::Nand,
        GateType::Or,
        GateType::Nor,
        GateType::Xor,
        GateType::Xnor,
        GateType::Maj,
    ];

    /// Number of fanins the gate reads
    pub fn arity(self) -> usize {
        match self {
            GateType::Buf | GateType::Not => 1,
            GateType::Maj => 3,
            _ => 2,
        }
    }

    /// Evaluate the gate function. `inputs` must hold exactly `arity()` values.
    pub fn evaluate(self, inputs: &[bool]) -> bool {
        match (self, inputs) {
            (GateType::Buf, [a]) => *a,
            (GateType::Not, [a]) => !a,
            (GateType::And, [a, b]) => *a && *b,
            (GateType::Nand, [a, b]) => !(*a && *b),
            (GateType::Or, [a, b]) => *a || *b,
            (GateType::Nor, [a, b]) => !(*a || *b),
            (GateType::Xor, [a, b]) => a ^ b,
            (GateType::Xnor, [a, b]) => !(a ^ b),
            (GateType::Maj, [a, b, c]) => (*a && *b) || (*a && *c) || (*b && *c),
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GateType::Buf => "BUF",
            GateType::Not => "NOT",
            GateType::And => "AND",
            GateType::Nand => "NAND",
            GateType::Or => "OR",
            GateType::Nor => "NOR",
            GateType::Xor => "XOR",
            GateType::Xnor => "XNOR",
            GateType::Maj => "MAJ",
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a node computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Pi,
    Gate(GateType),
}

/// A node of the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Nodes driving this one, in operand order
    #[serde(default)]
    pub fanins: Vec<NodeId>,
    /// Optional signal name (always set for primary inputs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Node {
    pub fn is_pi(&self) -> bool {
        matches!(self.kind, NodeKind::Pi)
    }

    pub fn gate_type(&self) -> Option<GateType> {
        match self.kind {
            NodeKind::Gate(g) => Some(g),
            NodeKind::Pi => None,
        }
    }
}

/// A named primary output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub signal: NodeId,
    pub name: String,
}

// ============================================================================
// Network
// ============================================================================

/// Technology-independent logic network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicNetwork {
    #[serde(default)]
    name: String,
    nodes: Vec<Node>,
    #[serde(default)]
    pis: Vec<NodeId>,
    #[serde(default)]
    pos: Vec<Output>,
}

impl LogicNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Create a primary input. Unnamed inputs are called `x<i>`.
    pub fn create_pi(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut name: String = name.into();
        if name.is_empty() {
            name = format!("x{}", self.pis.len());
        }
        self.nodes.push(Node {
            kind: NodeKind::Pi,
            fanins: Vec::new(),
            name: Some(name),
        });
        self.pis.push(id);
        id
    }

    /// Export `signal` as a primary output. Unnamed outputs are called `y<i>`.
    pub fn create_po(&mut self, signal: NodeId, name: impl Into<String>) {
        debug_assert!(self.contains(signal), "primary output reads unknown node");
        let mut name: String = name.into();
        if name.is_empty() {
            name = format!("y{}", self.pos.len());
        }
        self.pos.push(Output { signal, name });
    }

    /// Create a gate after validating its fanins
    pub fn create_gate(&mut self, gate: GateType, fanins: &[NodeId]) -> Result<NodeId> {
        if fanins.len() != gate.arity() {
            return Err(NetworkError::ArityMismatch {
                gate,
                expected: gate.arity(),
                actual: fanins.len(),
            });
        }
        if let Some(unknown) = fanins.iter().find(|f| !self.contains(**f)) {
            return Err(NetworkError::UnknownNode(unknown.0));
        }
        Ok(self.push_gate(gate, fanins.to_vec()))
    }

    fn push_gate(&mut self, gate: GateType, fanins: Vec<NodeId>) -> NodeId {
        debug_assert!(fanins.iter().all(|f| self.contains(*f)));
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: NodeKind::Gate(gate),
            fanins,
            name: None,
        });
        id
    }

    pub fn create_buf(&mut self, a: NodeId) -> NodeId {
        self.push_gate(GateType::Buf, vec![a])
    }

    pub fn create_not(&mut self, a: NodeId) -> NodeId {
        self.push_gate(GateType::Not, vec![a])
    }

    pub fn create_and(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_gate(GateType::And, vec![a, b])
    }

    pub fn create_nand(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_gate(GateType::Nand, vec![a, b])
    }

    pub fn create_or(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_gate(GateType::Or, vec![a, b])
    }

    pub fn create_nor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_gate(GateType::Nor, vec![a, b])
    }

    pub fn create_xor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_gate(GateType::Xor, vec![a, b])
    }

    pub fn create_xnor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.push_gate(GateType::Xnor, vec![a, b])
    }

    pub fn create_maj(&mut self, a: NodeId, b: NodeId, c: NodeId) -> NodeId {
        self.push_gate(GateType::Maj, vec![a, b, c])
    }

    /// Attach a name to an internal signal
    pub fn set_node_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.name = Some(name.into());
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes with their ids, in topological order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Gate nodes only (primary inputs excluded)
    pub fn gates(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes().filter(|(_, n)| !n.is_pi())
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn pis(&self) -> &[NodeId] {
        &self.pis
    }

    pub fn pos(&self) -> &[Output] {
        &self.pos
    }

    pub fn num_pis(&self) -> usize {
        self.pis.len()
    }

    pub fn num_pos(&self) -> usize {
        self.pos.len()
    }

    pub fn num_gates(&self) -> usize {
        self.nodes.len() - self.pis.len()
    }

    pub fn is_pi(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_pi)
    }

    pub fn fanins(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.fanins.as_slice()).unwrap_or(&[])
    }

    pub fn fanin_size(&self, id: NodeId) -> usize {
        self.fanins(id).len()
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.name.as_deref())
    }

    pub fn po_name(&self, index: usize) -> Option<&str> {
        self.pos.get(index).map(|o| o.name.as_str())
    }

    /// Number of consumers of every node, counting primary outputs
    pub fn fanout_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for node in &self.nodes {
            for fanin in &node.fanins {
                counts[fanin.index()] += 1;
            }
        }
        for po in &self.pos {
            counts[po.signal.index()] += 1;
        }
        counts
    }

    pub fn fanout_size(&self, id: NodeId) -> usize {
        self.fanout_counts().get(id.index()).copied().unwrap_or(0)
    }

    pub fn max_fanin_size(&self) -> usize {
        self.nodes.iter().map(|n| n.fanins.len()).max().unwrap_or(0)
    }

    pub fn max_fanout_size(&self) -> usize {
        self.fanout_counts().into_iter().max().unwrap_or(0)
    }

    // ------------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------------

    /// Evaluate all primary outputs for one input assignment (PI order)
    pub fn simulate(&self, inputs: &[bool]) -> Result<Vec<bool>> {
        if inputs.len() != self.pis.len() {
            return Err(NetworkError::InputCount {
                expected: self.pis.len(),
                actual: inputs.len(),
            });
        }

        let mut values = vec![false; self.nodes.len()];
        let mut next_input = inputs.iter();
        for (i, node) in self.nodes.iter().enumerate() {
            values[i] = match node.kind {
                NodeKind::Pi => next_input.next().copied().unwrap_or(false),
                NodeKind::Gate(g) => {
                    let operands: Vec<bool> =
                        node.fanins.iter().map(|f| values[f.index()]).collect();
                    g.evaluate(&operands)
                }
            };
        }

        Ok(self.pos.iter().map(|o| values[o.signal.index()]).collect())
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Check the structural invariants that construction through the API guarantees
    pub fn validate(&self) -> Result<()> {
        let mut pi_iter = self.pis.iter();
        for (i, node) in self.nodes.iter().enumerate() {
            let id = i as u32;
            match node.kind {
                NodeKind::Pi => {
                    if pi_iter.next() != Some(&NodeId(id)) || !node.fanins.is_empty() {
                        return Err(NetworkError::InconsistentInputs(id));
                    }
                }
                NodeKind::Gate(gate) => {
                    if node.fanins.len() != gate.arity() {
                        return Err(NetworkError::ArityMismatch {
                            gate,
                            expected: gate.arity(),
                            actual: node.fanins.len(),
                        });
                    }
                    if let Some(f) = node.fanins.iter().find(|f| f.0 >= id) {
                        return Err(NetworkError::NotTopological {
                            node: id,
                            fanin: f.0,
                        });
                    }
                }
            }
        }
        if let Some(extra) = pi_iter.next() {
            return Err(NetworkError::InconsistentInputs(extra.0));
        }
        if let Some(po) = self.pos.iter().find(|o| !self.contains(o.signal)) {
            return Err(NetworkError::UnknownNode(po.signal.0));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let ntk: LogicNetwork = serde_json::from_str(json)?;
        ntk.validate()?;
        Ok(ntk)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
