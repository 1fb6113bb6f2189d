//! Conversion between the editor's wire format, the `FlowGraph` model and
//! store rows.
//!
//! Decoding rejects payloads it cannot represent (unknown node types,
//! duplicate node ids) before anything touches the store. Duplicate
//! (source, target) edges collapse to their first occurrence. Edges whose
//! endpoints are missing are *not* filtered here: they are dropped while the
//! graph is installed, where the node map of the save is known.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use super::wire::{
    FlowPayload, HandlePosition, MarkerEnd, SerializedEdge, SerializedNode, SerializedNodeData,
    WireGraph, WireNode,
};
use super::{Example, FlowEdge, FlowGraph, FlowNode, NodeKind, NodePayload, Position};
use crate::database::entities::{
    ai_node_examples, ai_nodes, code_nodes, edges, nodes, template_nodes,
};
use crate::errors::{FlowError, FlowResult};

/// Parse and decode a raw JSON request body.
pub fn decode_payload(value: Value) -> FlowResult<FlowGraph> {
    decode(FlowPayload::from_value(value)?)
}

pub fn decode(payload: FlowPayload) -> FlowResult<FlowGraph> {
    let mut seen_nodes = HashSet::with_capacity(payload.nodes.len());
    let mut nodes = Vec::with_capacity(payload.nodes.len());

    for wire in payload.nodes {
        if !seen_nodes.insert(wire.id.clone()) {
            return Err(FlowError::DuplicateNode(wire.id));
        }
        nodes.push(decode_node(wire)?);
    }

    let mut seen_pairs = HashSet::with_capacity(payload.edges.len());
    let mut edges = Vec::with_capacity(payload.edges.len());

    for wire in payload.edges {
        if !seen_pairs.insert((wire.source.clone(), wire.target.clone())) {
            debug!(
                source = %wire.source,
                target = %wire.target,
                "Dropping duplicate edge"
            );
            continue;
        }
        let id = wire
            .id
            .unwrap_or_else(|| FlowEdge::synthesized_id(&wire.source, &wire.target));
        edges.push(FlowEdge {
            id,
            source: wire.source,
            target: wire.target,
        });
    }

    Ok(FlowGraph { nodes, edges })
}

fn decode_node(wire: WireNode) -> FlowResult<FlowNode> {
    let kind = NodeKind::from_str(&wire.node_type).map_err(|_| FlowError::UnknownNodeType {
        node: wire.id.clone(),
        node_type: wire.node_type.clone(),
    })?;

    let data = wire.data;
    let payload = match kind {
        NodeKind::InputNode => NodePayload::Input,
        NodeKind::OutputNode => NodePayload::Output,
        NodeKind::AiNode => NodePayload::Ai {
            prompt: data.prompt.unwrap_or_default(),
            examples: data.examples.unwrap_or_default(),
        },
        NodeKind::CodeNode => NodePayload::Code {
            code: data.code.unwrap_or_default(),
        },
        NodeKind::TemplateNode => NodePayload::Template {
            template: data.template.unwrap_or_default(),
        },
    };

    Ok(FlowNode {
        id: wire.id,
        label: data.label.unwrap_or_default(),
        position: wire.position,
        payload,
    })
}

pub fn encode(graph: &FlowGraph) -> WireGraph {
    WireGraph {
        nodes: graph.nodes.iter().map(encode_node).collect(),
        edges: graph.edges.iter().map(encode_edge).collect(),
    }
}

fn encode_node(node: &FlowNode) -> SerializedNode {
    let mut data = SerializedNodeData {
        label: node.label.clone(),
        examples: Vec::new(),
        prompt: None,
        code: None,
        template: None,
    };

    match &node.payload {
        NodePayload::Input | NodePayload::Output => {}
        NodePayload::Ai { prompt, examples } => {
            data.prompt = Some(prompt.clone());
            data.examples = examples.clone();
        }
        NodePayload::Code { code } => data.code = Some(code.clone()),
        NodePayload::Template { template } => data.template = Some(template.clone()),
    }

    let kind = node.kind();
    SerializedNode {
        id: node.id.clone(),
        node_type: kind,
        data,
        position: node.position,
        source_position: (kind == NodeKind::InputNode).then_some(HandlePosition::Right),
        target_position: (kind == NodeKind::OutputNode).then_some(HandlePosition::Left),
    }
}

fn encode_edge(edge: &FlowEdge) -> SerializedEdge {
    SerializedEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        marker_end: MarkerEnd::default(),
    }
}

/// Every row making up one project's flow, as read from the store.
#[derive(Debug, Default)]
pub struct FlowRecords {
    pub nodes: Vec<nodes::Model>,
    pub ai_nodes: Vec<ai_nodes::Model>,
    pub examples: Vec<ai_node_examples::Model>,
    pub code_nodes: Vec<code_nodes::Model>,
    pub template_nodes: Vec<template_nodes::Model>,
    pub edges: Vec<edges::Model>,
}

/// Rebuild the graph from store rows. Row order is preserved.
///
/// A typed node whose payload row is missing decodes with empty content; an
/// edge pointing at a node outside `records.nodes` is skipped.
pub fn assemble(records: FlowRecords) -> FlowResult<FlowGraph> {
    let mut examples_by_ai: HashMap<i32, Vec<Example>> = HashMap::new();
    for example in records.examples {
        examples_by_ai
            .entry(example.ai_node_id)
            .or_default()
            .push(Example {
                name: example.name,
                input: example.input_text,
                output: example.output_text,
            });
    }

    let mut ai_by_node: HashMap<i32, ai_nodes::Model> = records
        .ai_nodes
        .into_iter()
        .map(|ai| (ai.node_id, ai))
        .collect();
    let mut code_by_node: HashMap<i32, String> = records
        .code_nodes
        .into_iter()
        .map(|code| (code.node_id, code.code))
        .collect();
    let mut template_by_node: HashMap<i32, String> = records
        .template_nodes
        .into_iter()
        .map(|template| (template.node_id, template.template))
        .collect();

    let mut external_ids: HashMap<i32, String> = HashMap::with_capacity(records.nodes.len());
    let mut nodes = Vec::with_capacity(records.nodes.len());

    for row in records.nodes {
        let kind = NodeKind::from_str(&row.node_type).map_err(|_| FlowError::CorruptNode {
            node: row.node_internal_id.clone(),
            reason: format!("unknown type '{}'", row.node_type),
        })?;

        let payload = match kind {
            NodeKind::InputNode => NodePayload::Input,
            NodeKind::OutputNode => NodePayload::Output,
            NodeKind::AiNode => match ai_by_node.remove(&row.id) {
                Some(ai) => NodePayload::Ai {
                    prompt: ai.prompt,
                    examples: examples_by_ai.remove(&ai.id).unwrap_or_default(),
                },
                None => {
                    warn!(node = %row.node_internal_id, "AI node has no payload row");
                    NodePayload::Ai {
                        prompt: String::new(),
                        examples: Vec::new(),
                    }
                }
            },
            NodeKind::CodeNode => NodePayload::Code {
                code: code_by_node.remove(&row.id).unwrap_or_else(|| {
                    warn!(node = %row.node_internal_id, "Code node has no payload row");
                    String::new()
                }),
            },
            NodeKind::TemplateNode => NodePayload::Template {
                template: template_by_node.remove(&row.id).unwrap_or_else(|| {
                    warn!(node = %row.node_internal_id, "Template node has no payload row");
                    String::new()
                }),
            },
        };

        external_ids.insert(row.id, row.node_internal_id.clone());
        nodes.push(FlowNode {
            id: row.node_internal_id,
            label: row.label,
            position: Position {
                x: row.position_x,
                y: row.position_y,
            },
            payload,
        });
    }

    let edges = records
        .edges
        .into_iter()
        .filter_map(|edge| {
            match (
                external_ids.get(&edge.source_id),
                external_ids.get(&edge.target_id),
            ) {
                (Some(source), Some(target)) => Some(FlowEdge {
                    id: edge.edge_internal_id,
                    source: source.clone(),
                    target: target.clone(),
                }),
                _ => {
                    warn!(edge = %edge.edge_internal_id, "Edge references a node outside the flow");
                    None
                }
            }
        })
        .collect();

    Ok(FlowGraph { nodes, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_graph() -> FlowGraph {
        FlowGraph {
            nodes: vec![
                FlowNode {
                    id: "in".to_string(),
                    label: "Transcripts".to_string(),
                    position: Position { x: 100.0, y: 100.0 },
                    payload: NodePayload::Input,
                },
                FlowNode {
                    id: "summarise".to_string(),
                    label: "Summarise".to_string(),
                    position: Position { x: 400.0, y: 80.5 },
                    payload: NodePayload::Ai {
                        prompt: "Summarise the call".to_string(),
                        examples: vec![Example {
                            name: "short".to_string(),
                            input: "long call".to_string(),
                            output: "summary".to_string(),
                        }],
                    },
                },
                FlowNode {
                    id: "fmt".to_string(),
                    label: "Format".to_string(),
                    position: Position { x: 600.0, y: 100.0 },
                    payload: NodePayload::Template {
                        template: "# {{ summary }}".to_string(),
                    },
                },
                FlowNode {
                    id: "out".to_string(),
                    label: "Output".to_string(),
                    position: Position { x: 800.0, y: 100.0 },
                    payload: NodePayload::Output,
                },
            ],
            edges: vec![
                FlowEdge {
                    id: "e1".to_string(),
                    source: "in".to_string(),
                    target: "summarise".to_string(),
                },
                FlowEdge {
                    id: "xy-edge__summarise-fmt".to_string(),
                    source: "summarise".to_string(),
                    target: "fmt".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_encode_then_decode_is_identity() {
        let graph = sample_graph();
        let value = serde_json::to_value(encode(&graph)).unwrap();
        let decoded = decode_payload(value).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_encode_shape() {
        let value = serde_json::to_value(encode(&sample_graph())).unwrap();

        assert_eq!(value["nodes"][0]["sourcePosition"], json!("right"));
        assert!(value["nodes"][0].get("targetPosition").is_none());
        assert_eq!(value["nodes"][0]["data"], json!({ "label": "Transcripts", "examples": [] }));
        assert_eq!(value["nodes"][3]["targetPosition"], json!("left"));
        assert!(value["nodes"][3].get("sourcePosition").is_none());
        assert_eq!(
            value["nodes"][1]["data"]["examples"],
            json!([{ "name": "short", "input": "long call", "output": "summary" }])
        );
        assert_eq!(value["edges"][0]["markerEnd"], json!({ "type": "arrowclosed" }));
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let graph = decode_payload(json!({
            "nodes": [
                { "id": "a", "type": "ai_node", "position": { "x": 5 } },
                { "id": "c", "type": "code_node", "data": { "label": "Run" } }
            ],
            "edges": [{ "source": "a", "target": "c" }]
        }))
        .unwrap();

        assert_eq!(graph.nodes[0].label, "");
        assert_eq!(graph.nodes[0].position, Position { x: 5.0, y: 0.0 });
        assert_eq!(
            graph.nodes[0].payload,
            NodePayload::Ai {
                prompt: String::new(),
                examples: vec![]
            }
        );
        assert_eq!(
            graph.nodes[1].payload,
            NodePayload::Code {
                code: String::new()
            }
        );
        assert_eq!(graph.edges[0].id, "xy-edge__a-c");
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = decode_payload(json!({
            "nodes": [
                { "id": "a", "type": "input_node" },
                { "id": "b", "type": "webhook_node" }
            ],
            "edges": []
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            FlowError::UnknownNodeType { ref node, ref node_type }
                if node == "b" && node_type == "webhook_node"
        ));
    }

    #[test]
    fn test_decode_rejects_duplicate_node_ids() {
        let err = decode_payload(json!({
            "nodes": [
                { "id": "a", "type": "input_node" },
                { "id": "a", "type": "output_node" }
            ],
            "edges": []
        }))
        .unwrap_err();

        assert!(matches!(err, FlowError::DuplicateNode(ref id) if id == "a"));
    }

    #[test]
    fn test_decode_keeps_first_of_duplicate_edges() {
        let graph = decode_payload(json!({
            "nodes": [
                { "id": "a", "type": "input_node" },
                { "id": "b", "type": "output_node" }
            ],
            "edges": [
                { "id": "first", "source": "a", "target": "b" },
                { "id": "second", "source": "a", "target": "b" },
                { "id": "reverse", "source": "b", "target": "a" }
            ]
        }))
        .unwrap();

        let ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "reverse"]);
    }

    #[test]
    fn test_assemble_maps_primary_keys_to_external_ids() {
        let now = Utc::now();
        let node = |id: i32, external: &str, node_type: &str| nodes::Model {
            id,
            project_id: 1,
            node_internal_id: external.to_string(),
            node_type: node_type.to_string(),
            label: external.to_uppercase(),
            position_x: id as f64,
            position_y: 0.0,
            created_at: now,
            updated_at: now,
        };

        let records = FlowRecords {
            nodes: vec![node(10, "src", "input_node"), node(11, "gen", "ai_node")],
            ai_nodes: vec![ai_nodes::Model {
                id: 3,
                node_id: 11,
                prompt: "Write".to_string(),
                updated_at: now,
            }],
            examples: vec![ai_node_examples::Model {
                id: 1,
                ai_node_id: 3,
                name: "ex".to_string(),
                input_text: "i".to_string(),
                output_text: "o".to_string(),
                created_at: now,
            }],
            edges: vec![
                edges::Model {
                    id: 1,
                    project_id: 1,
                    edge_internal_id: "e".to_string(),
                    source_id: 10,
                    target_id: 11,
                    created_at: now,
                },
                edges::Model {
                    id: 2,
                    project_id: 1,
                    edge_internal_id: "stray".to_string(),
                    source_id: 10,
                    target_id: 99,
                    created_at: now,
                },
            ],
            ..Default::default()
        };

        let graph = assemble(records).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(
            graph.edges,
            vec![FlowEdge {
                id: "e".to_string(),
                source: "src".to_string(),
                target: "gen".to_string(),
            }]
        );
        match &graph.nodes[1].payload {
            NodePayload::Ai { prompt, examples } => {
                assert_eq!(prompt, "Write");
                assert_eq!(examples.len(), 1);
                assert_eq!(examples[0].output, "o");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_assemble_rejects_unknown_stored_type() {
        let now = Utc::now();
        let records = FlowRecords {
            nodes: vec![nodes::Model {
                id: 1,
                project_id: 1,
                node_internal_id: "x".to_string(),
                node_type: "legacy_node".to_string(),
                label: String::new(),
                position_x: 0.0,
                position_y: 0.0,
                created_at: now,
                updated_at: now,
            }],
            ..Default::default()
        };

        assert!(matches!(
            assemble(records),
            Err(FlowError::CorruptNode { .. })
        ));
    }
}
