use std::collections::BTreeSet;

use flowbuilder::config::PoolConfig;
use flowbuilder::database::entities::users::UserRole;
use flowbuilder::database::entities::{nodes, project_transcript_languages, transcript_languages};
use flowbuilder::database::{get_database_url, setup_database};
use flowbuilder::services::{FlowService, LanguageService, NewProject, ProjectService, UserService};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use tempfile::TempDir;

const WRITERS: usize = 16;

/// File-backed database with a multi-connection pool
async fn setup_shared_db() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flows.db");
    let url = get_database_url(path.to_str());
    let db = setup_database(&url, &PoolConfig::default()).await.unwrap();
    (dir, db)
}

async fn create_project(db: &DatabaseConnection, slug: &str) -> i32 {
    let creator = UserService::new(db.clone())
        .create_user(&format!("{}@example.com", slug), UserRole::Creator)
        .await
        .unwrap();
    ProjectService::new(db.clone(), "en")
        .create_project(
            creator.id,
            NewProject {
                name: slug.to_string(),
                slug: slug.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
}

async fn language_id(db: &DatabaseConnection, code: &str) -> i32 {
    transcript_languages::Entity::find()
        .filter(transcript_languages::Column::Code.eq(code))
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reconciles_converge() {
    let (_dir, db) = setup_shared_db().await;
    let project_id = create_project(&db, "parallel-langs").await;
    let desired = BTreeSet::from([language_id(&db, "fr").await, language_id(&db, "de").await]);

    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let service = LanguageService::new(db.clone());
        let desired = desired.clone();
        handles.push(tokio::spawn(async move {
            service.reconcile(project_id, &desired).await
        }));
    }

    let mut added = 0;
    let mut removed = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        added += outcome.added.len();
        removed += outcome.removed.len();
    }

    // one writer did the work, the rest found nothing to change
    assert_eq!(added, 2);
    assert_eq!(removed, 1);

    let rows = project_transcript_languages::Entity::find()
        .filter(project_transcript_languages::Column::ProjectId.eq(project_id))
        .all(&db)
        .await
        .unwrap();
    let stored: BTreeSet<i32> = rows.iter().map(|row| row.language_id).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(stored, desired);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_last_writer_wins() {
    let (_dir, db) = setup_shared_db().await;
    let project_id = create_project(&db, "parallel-saves").await;

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let service = FlowService::new(db.clone());
        let payload = json!({
            "nodes": [
                { "id": format!("in-{}", i), "type": "input_node" },
                { "id": format!("code-{}", i), "type": "code_node", "data": { "code": format!("v{}", i) } },
                { "id": format!("out-{}", i), "type": "output_node" }
            ],
            "edges": [
                { "source": format!("in-{}", i), "target": format!("code-{}", i) },
                { "source": format!("code-{}", i), "target": format!("out-{}", i) }
            ]
        });
        handles.push(tokio::spawn(async move {
            service.save_flow(project_id, payload).await
        }));
    }

    let mut saved = Vec::new();
    for handle in handles {
        saved.push(handle.await.unwrap().unwrap());
    }

    // the stored flow is exactly one submission, never a mix of several
    let stored = FlowService::new(db.clone()).load_flow(project_id).await.unwrap();
    assert!(saved.contains(&stored));
    assert_eq!(stored.nodes.len(), 3);
    assert_eq!(stored.edges.len(), 2);
    assert_eq!(
        nodes::Entity::find()
            .filter(nodes::Column::ProjectId.eq(project_id))
            .count(&db)
            .await
            .unwrap(),
        3
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_save_and_reconcile() {
    let (_dir, db) = setup_shared_db().await;
    let project_id = create_project(&db, "mixed-writers").await;
    let desired = BTreeSet::from([language_id(&db, "es").await]);

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let flows = FlowService::new(db.clone());
        let languages = LanguageService::new(db.clone());
        let desired = desired.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                flows
                    .save_flow(
                        project_id,
                        json!({ "nodes": [{ "id": "only", "type": "input_node" }], "edges": [] }),
                    )
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            } else {
                languages
                    .reconcile(project_id, &desired)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    let codes: Vec<String> = LanguageService::new(db.clone())
        .project_languages(project_id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.code)
        .collect();
    assert_eq!(codes, vec!["es"]);
}
