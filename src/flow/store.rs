//! Row-level access to a project's flow.
//!
//! Functions are generic over `ConnectionTrait` so the same code runs on the
//! pool and inside the replace transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::debug;

use super::codec::{assemble, FlowRecords};
use super::{FlowGraph, FlowNode, NodePayload};
use crate::database::entities::{
    ai_node_examples, ai_nodes, code_nodes, edges, nodes, template_nodes,
};
use crate::errors::FlowResult;

/// What an install actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub nodes: usize,
    pub edges: usize,
    /// Edges skipped because an endpoint is not among the installed nodes
    pub dropped_edges: usize,
}

/// Insert one node row and its type-specific payload rows.
pub async fn insert_node<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
    node: &FlowNode,
    now: DateTime<Utc>,
) -> Result<nodes::Model, DbErr> {
    let row = nodes::ActiveModel {
        project_id: Set(project_id),
        node_internal_id: Set(node.id.clone()),
        node_type: Set(node.kind().to_string()),
        label: Set(node.label.clone()),
        position_x: Set(node.position.x),
        position_y: Set(node.position.y),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    match &node.payload {
        NodePayload::Input | NodePayload::Output => {}
        NodePayload::Ai { prompt, examples } => {
            let ai = ai_nodes::ActiveModel {
                node_id: Set(row.id),
                prompt: Set(prompt.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;

            for example in examples {
                ai_node_examples::ActiveModel {
                    ai_node_id: Set(ai.id),
                    name: Set(example.name.clone()),
                    input_text: Set(example.input.clone()),
                    output_text: Set(example.output.clone()),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        NodePayload::Code { code } => {
            code_nodes::ActiveModel {
                node_id: Set(row.id),
                code: Set(code.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        NodePayload::Template { template } => {
            template_nodes::ActiveModel {
                node_id: Set(row.id),
                template: Set(template.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }

    Ok(row)
}

/// Insert an edge between two node rows identified by primary key.
pub async fn insert_edge<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
    edge_id: &str,
    source_id: i32,
    target_id: i32,
    now: DateTime<Utc>,
) -> Result<edges::Model, DbErr> {
    edges::ActiveModel {
        project_id: Set(project_id),
        edge_internal_id: Set(edge_id.to_string()),
        source_id: Set(source_id),
        target_id: Set(target_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Write a decoded graph into an empty project flow.
///
/// Node identifiers are resolved to the primary keys assigned here; an edge
/// whose source or target is not part of `graph.nodes` is skipped.
pub async fn install_graph<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
    graph: &FlowGraph,
    now: DateTime<Utc>,
) -> Result<InstallReport, DbErr> {
    let mut primary_keys: HashMap<&str, i32> = HashMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let row = insert_node(conn, project_id, node, now).await?;
        primary_keys.insert(node.id.as_str(), row.id);
    }

    let mut report = InstallReport {
        nodes: graph.nodes.len(),
        ..Default::default()
    };

    for edge in &graph.edges {
        match (
            primary_keys.get(edge.source.as_str()),
            primary_keys.get(edge.target.as_str()),
        ) {
            (Some(&source_id), Some(&target_id)) => {
                insert_edge(conn, project_id, &edge.id, source_id, target_id, now).await?;
                report.edges += 1;
            }
            _ => {
                debug!(
                    project_id,
                    edge = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Skipping edge with unresolved endpoint"
                );
                report.dropped_edges += 1;
            }
        }
    }

    Ok(report)
}

/// Remove every node, edge and payload row belonging to a project.
///
/// Children are deleted before parents (edges, payload rows, nodes) so the
/// result does not depend on SQLite's `foreign_keys` pragma.
pub async fn clear_graph<C: ConnectionTrait>(conn: &C, project_id: i32) -> Result<(), DbErr> {
    let node_ids: Vec<i32> = nodes::Entity::find()
        .filter(nodes::Column::ProjectId.eq(project_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|n| n.id)
        .collect();

    edges::Entity::delete_many()
        .filter(edges::Column::ProjectId.eq(project_id))
        .exec(conn)
        .await?;

    if !node_ids.is_empty() {
        let ai_ids: Vec<i32> = ai_nodes::Entity::find()
            .filter(ai_nodes::Column::NodeId.is_in(node_ids.clone()))
            .all(conn)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();

        if !ai_ids.is_empty() {
            ai_node_examples::Entity::delete_many()
                .filter(ai_node_examples::Column::AiNodeId.is_in(ai_ids))
                .exec(conn)
                .await?;
        }

        ai_nodes::Entity::delete_many()
            .filter(ai_nodes::Column::NodeId.is_in(node_ids.clone()))
            .exec(conn)
            .await?;
        code_nodes::Entity::delete_many()
            .filter(code_nodes::Column::NodeId.is_in(node_ids.clone()))
            .exec(conn)
            .await?;
        template_nodes::Entity::delete_many()
            .filter(template_nodes::Column::NodeId.is_in(node_ids))
            .exec(conn)
            .await?;
    }

    nodes::Entity::delete_many()
        .filter(nodes::Column::ProjectId.eq(project_id))
        .exec(conn)
        .await?;

    Ok(())
}

/// Read a project's flow in insertion order.
pub async fn read_graph<C: ConnectionTrait>(conn: &C, project_id: i32) -> FlowResult<FlowGraph> {
    let node_rows = nodes::Entity::find()
        .filter(nodes::Column::ProjectId.eq(project_id))
        .order_by_asc(nodes::Column::Id)
        .all(conn)
        .await?;
    let node_ids: Vec<i32> = node_rows.iter().map(|n| n.id).collect();

    let mut records = FlowRecords {
        nodes: node_rows,
        edges: edges::Entity::find()
            .filter(edges::Column::ProjectId.eq(project_id))
            .order_by_asc(edges::Column::Id)
            .all(conn)
            .await?,
        ..Default::default()
    };

    if !node_ids.is_empty() {
        records.ai_nodes = ai_nodes::Entity::find()
            .filter(ai_nodes::Column::NodeId.is_in(node_ids.clone()))
            .all(conn)
            .await?;
        records.code_nodes = code_nodes::Entity::find()
            .filter(code_nodes::Column::NodeId.is_in(node_ids.clone()))
            .all(conn)
            .await?;
        records.template_nodes = template_nodes::Entity::find()
            .filter(template_nodes::Column::NodeId.is_in(node_ids))
            .all(conn)
            .await?;

        let ai_ids: Vec<i32> = records.ai_nodes.iter().map(|a| a.id).collect();
        if !ai_ids.is_empty() {
            records.examples = ai_node_examples::Entity::find()
                .filter(ai_node_examples::Column::AiNodeId.is_in(ai_ids))
                .order_by_asc(ai_node_examples::Column::Id)
                .all(conn)
                .await?;
        }
    }

    assemble(records)
}
