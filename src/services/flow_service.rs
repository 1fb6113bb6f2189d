use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use serde_json::Value;
use tracing::{debug, info};

use crate::common::transaction::{claim_project, with_write_retry};
use crate::database::entities::projects;
use crate::errors::{FlowError, FlowResult};
use crate::flow::store::{self, InstallReport};
use crate::flow::{decode_payload, encode, FlowGraph, WireGraph};

/// Loads and replaces project flows
#[derive(Clone)]
pub struct FlowService {
    db: DatabaseConnection,
}

impl FlowService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Serialized flow of a project, in the shape the editor submits
    pub async fn load_flow(&self, project_id: i32) -> FlowResult<WireGraph> {
        Ok(encode(&self.load_graph(project_id).await?))
    }

    pub async fn load_graph(&self, project_id: i32) -> FlowResult<FlowGraph> {
        self.ensure_project(project_id).await?;
        store::read_graph(&self.db, project_id).await
    }

    /// Replace a project's whole flow with the submitted payload.
    ///
    /// The payload is decoded before the transaction opens, so malformed input
    /// never touches the store. Everything after that runs in one transaction:
    /// any failure leaves the previous flow in place.
    pub async fn save_flow(&self, project_id: i32, payload: Value) -> FlowResult<WireGraph> {
        self.ensure_project(project_id).await?;
        let graph = decode_payload(payload)?;
        let (saved, _) = self.replace_graph(project_id, &graph).await?;
        Ok(encode(&saved))
    }

    /// Swap the stored flow for `graph` and return what was persisted.
    ///
    /// Concurrent saves of one project run one after another; the last to
    /// commit wins.
    pub async fn replace_graph(
        &self,
        project_id: i32,
        graph: &FlowGraph,
    ) -> FlowResult<(FlowGraph, InstallReport)> {
        let (saved, report) = with_write_retry("save flow", || {
            self.replace_graph_once(project_id, graph)
        })
        .await?;

        if report.dropped_edges > 0 {
            debug!(
                project_id,
                dropped = report.dropped_edges,
                "Dropped edges with unresolved endpoints"
            );
        }
        info!(
            project_id,
            nodes = report.nodes,
            edges = report.edges,
            "Saved flow"
        );

        Ok((saved, report))
    }

    async fn replace_graph_once(
        &self,
        project_id: i32,
        graph: &FlowGraph,
    ) -> FlowResult<(FlowGraph, InstallReport)> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        if !claim_project(&txn, project_id).await? {
            return Err(FlowError::ProjectNotFound(project_id));
        }
        store::clear_graph(&txn, project_id).await?;
        let report = store::install_graph(&txn, project_id, graph, now).await?;
        let saved = store::read_graph(&txn, project_id).await?;

        txn.commit().await?;
        Ok((saved, report))
    }

    async fn ensure_project(&self, project_id: i32) -> FlowResult<()> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(FlowError::ProjectNotFound(project_id))
    }
}
