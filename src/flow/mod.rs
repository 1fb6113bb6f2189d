//! Flow graph model.
//!
//! A project's flow is a directed graph of typed nodes. Node identifiers are
//! assigned by the editor and treated as opaque keys; the store keeps its own
//! integer primary keys and the codec maps between the two.

pub mod codec;
pub mod store;
pub mod wire;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use codec::{decode, decode_payload, encode};
pub use wire::{FlowPayload, WireGraph};

pub const INPUT_NODE_LABEL: &str = "Transcripts";
pub const OUTPUT_NODE_LABEL: &str = "Output";
pub const INPUT_NODE_POSITION: Position = Position { x: 100.0, y: 100.0 };
pub const OUTPUT_NODE_POSITION: Position = Position { x: 800.0, y: 100.0 };

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    InputNode,
    OutputNode,
    AiNode,
    CodeNode,
    TemplateNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

/// Type-specific node content. Input and output nodes carry nothing beyond
/// their label and position.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Input,
    Output,
    Ai {
        prompt: String,
        examples: Vec<Example>,
    },
    Code {
        code: String,
    },
    Template {
        template: String,
    },
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Input => NodeKind::InputNode,
            NodePayload::Output => NodeKind::OutputNode,
            NodePayload::Ai { .. } => NodeKind::AiNode,
            NodePayload::Code { .. } => NodeKind::CodeNode,
            NodePayload::Template { .. } => NodeKind::TemplateNode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub position: Position,
    pub payload: NodePayload,
}

impl FlowNode {
    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl FlowEdge {
    /// Identifier given to edges submitted without one.
    pub fn synthesized_id(source: &str, target: &str) -> String {
        format!("xy-edge__{}-{}", source, target)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// The input/output pair every new project starts with. Identifiers are
/// derived from creator and project so they are stable across re-seeding.
pub fn default_nodes(creator_id: i32, project_id: i32) -> [FlowNode; 2] {
    [
        FlowNode {
            id: format!("{}_{}_input", creator_id, project_id),
            label: INPUT_NODE_LABEL.to_string(),
            position: INPUT_NODE_POSITION,
            payload: NodePayload::Input,
        },
        FlowNode {
            id: format!("{}_{}_output", creator_id, project_id),
            label: OUTPUT_NODE_LABEL.to_string(),
            position: OUTPUT_NODE_POSITION,
            payload: NodePayload::Output,
        },
    ]
}
