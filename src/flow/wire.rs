//! JSON shapes exchanged with the flow editor.
//!
//! Inbound (`FlowPayload`) is lenient: numeric identifiers are stringified,
//! missing positions and data fields default. Outbound (`WireGraph`) is what
//! both load and save answer with.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Example, NodeKind, Position};
use crate::errors::{FlowError, FlowResult};

#[derive(Debug, Clone, Deserialize)]
pub struct FlowPayload {
    pub nodes: Vec<WireNode>,
    pub edges: Vec<WireEdge>,
}

impl FlowPayload {
    pub fn from_value(value: Value) -> FlowResult<Self> {
        if !value.is_object() {
            return Err(FlowError::InvalidPayload(
                "expected an object with `nodes` and `edges`".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| FlowError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireNode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: WireNodeData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireNodeData {
    pub label: Option<String>,
    pub prompt: Option<String>,
    pub code: Option<String>,
    pub template: Option<String>,
    pub examples: Option<Vec<Example>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireEdge {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub source: String,
    #[serde(deserialize_with = "string_or_number")]
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGraph {
    pub nodes: Vec<SerializedNode>,
    pub edges: Vec<SerializedEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeKind,
    pub data: SerializedNodeData,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_position: Option<HandlePosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_position: Option<HandlePosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNodeData {
    pub label: String,
    pub examples: Vec<Example>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub marker_end: MarkerEnd,
}

/// Rendering hint for the editor; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEnd {
    #[serde(rename = "type")]
    pub marker_type: String,
}

impl Default for MarkerEnd {
    fn default() -> Self {
        Self {
            marker_type: "arrowclosed".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Integer(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_edges_key_is_rejected() {
        let err = FlowPayload::from_value(json!({ "nodes": [] })).unwrap_err();
        assert!(matches!(err, FlowError::InvalidPayload(ref msg) if msg.contains("edges")));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = FlowPayload::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FlowError::InvalidPayload(_)));
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let payload = FlowPayload::from_value(json!({
            "nodes": [{ "id": 12, "type": "input_node" }],
            "edges": [{ "source": 12, "target": "b" }]
        }))
        .unwrap();

        assert_eq!(payload.nodes[0].id, "12");
        assert_eq!(payload.nodes[0].position, Position::default());
        assert!(payload.nodes[0].data.label.is_none());
        assert_eq!(payload.edges[0].source, "12");
        assert!(payload.edges[0].id.is_none());
    }

    #[test]
    fn test_handle_positions_are_omitted_when_absent() {
        let node = SerializedNode {
            id: "c".to_string(),
            node_type: NodeKind::CodeNode,
            data: SerializedNodeData {
                label: "Code".to_string(),
                examples: vec![],
                prompt: None,
                code: Some("print(1)".to_string()),
                template: None,
            },
            position: Position { x: 1.0, y: 2.0 },
            source_position: None,
            target_position: None,
        };

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "c",
                "type": "code_node",
                "data": { "label": "Code", "examples": [], "code": "print(1)" },
                "position": { "x": 1.0, "y": 2.0 }
            })
        );
    }
}
