use chrono::Utc;
use flowbuilder::database::entities::users::UserRole;
use flowbuilder::database::entities::{nodes, projects, users};
use flowbuilder::database::migrations::Migrator;
use flowbuilder::errors::ProjectError;
use flowbuilder::flow::{NodeKind, Position};
use flowbuilder::services::{
    FlowService, LanguageService, NewProject, ProjectService, ProjectUpdate, UserService,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use serde_json::json;

async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_user(db: &DatabaseConnection, email: &str, role: UserRole) -> users::Model {
    UserService::new(db.clone())
        .create_user(email, role)
        .await
        .unwrap()
}

fn new_project(name: &str, slug: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        slug: slug.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_provisioning_is_deterministic() {
    let db = setup_test_db().await.unwrap();

    users::ActiveModel {
        id: Set(7),
        email: Set("creator7@example.com".to_string()),
        role: Set(UserRole::Creator.into()),
        is_active: Set(true),
        date_joined: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .unwrap();

    let mut project = projects::ActiveModel::new();
    project.id = Set(42);
    project.name = Set("Fixed".to_string());
    project.slug = Set("fixed".to_string());
    project.creator_id = Set(7);
    project.insert(&db).await.unwrap();

    let service = ProjectService::new(db.clone(), "en");
    let inserted = service.provision_default_nodes(42).await.unwrap();
    assert_eq!(inserted.len(), 2);

    let graph = FlowService::new(db.clone()).load_graph(42).await.unwrap();
    assert_eq!(graph.nodes.len(), 2);

    let input = &graph.nodes[0];
    assert_eq!(input.id, "7_42_input");
    assert_eq!(input.kind(), NodeKind::InputNode);
    assert_eq!(input.label, "Transcripts");
    assert_eq!(input.position, Position { x: 100.0, y: 100.0 });

    let output = &graph.nodes[1];
    assert_eq!(output.id, "7_42_output");
    assert_eq!(output.kind(), NodeKind::OutputNode);
    assert_eq!(output.label, "Output");
    assert_eq!(output.position, Position { x: 800.0, y: 100.0 });

    // re-seeding only fills gaps
    assert!(service.provision_default_nodes(42).await.unwrap().is_empty());
    assert_eq!(nodes::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_provision_restores_missing_default_node() {
    let db = setup_test_db().await.unwrap();
    let creator = create_user(&db, "ada@example.com", UserRole::Creator).await;
    let service = ProjectService::new(db.clone(), "en");
    let project = service
        .create_project(creator.id, new_project("Desk", "desk"))
        .await
        .unwrap();

    FlowService::new(db.clone())
        .save_flow(
            project.id,
            json!({
                "nodes": [{ "id": format!("{}_{}_input", creator.id, project.id), "type": "input_node" }],
                "edges": []
            }),
        )
        .await
        .unwrap();

    let inserted = service.provision_default_nodes(project.id).await.unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(
        inserted[0].node_internal_id,
        format!("{}_{}_output", creator.id, project.id)
    );
}

#[tokio::test]
async fn test_create_project_seeds_nodes_and_default_language() {
    let db = setup_test_db().await.unwrap();
    let creator = create_user(&db, "ada@example.com", UserRole::Creator).await;
    let service = ProjectService::new(db.clone(), "en");

    let project = service
        .create_project(
            creator.id,
            NewProject {
                name: "  Support Desk ".to_string(),
                slug: "support-desk".to_string(),
                description: Some("Triage inbound calls".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(project.name, "Support Desk");
    assert_eq!(project.main_color, "#007FFF");
    assert_eq!(project.creator_id, creator.id);

    let node_ids: Vec<String> = nodes::Entity::find()
        .filter(nodes::Column::ProjectId.eq(project.id))
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.node_internal_id)
        .collect();
    assert_eq!(
        node_ids,
        vec![
            format!("{}_{}_input", creator.id, project.id),
            format!("{}_{}_output", creator.id, project.id)
        ]
    );

    let languages = LanguageService::new(db.clone())
        .project_languages(project.id)
        .await
        .unwrap();
    let codes: Vec<&str> = languages.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, vec!["en"]);
}

#[tokio::test]
async fn test_duplicate_slug_fails_before_mutation() {
    let db = setup_test_db().await.unwrap();
    let creator = create_user(&db, "ada@example.com", UserRole::Creator).await;
    let service = ProjectService::new(db.clone(), "en");

    service
        .create_project(creator.id, new_project("First", "acme"))
        .await
        .unwrap();
    let projects_before = projects::Entity::find().count(&db).await.unwrap();
    let nodes_before = nodes::Entity::find().count(&db).await.unwrap();

    let err = service
        .create_project(creator.id, new_project("Second", "acme"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProjectError::DuplicateSlug(ref slug) if slug == "acme"));
    assert!(err.is_client_error());
    assert_eq!(err.field(), Some("slug"));
    assert_eq!(projects::Entity::find().count(&db).await.unwrap(), projects_before);
    assert_eq!(nodes::Entity::find().count(&db).await.unwrap(), nodes_before);
}

#[tokio::test]
async fn test_create_project_validation() {
    let db = setup_test_db().await.unwrap();
    let creator = create_user(&db, "ada@example.com", UserRole::Creator).await;
    let client = create_user(&db, "bob@example.com", UserRole::Client).await;
    let service = ProjectService::new(db.clone(), "en");

    let err = service
        .create_project(creator.id, new_project("Bad", "Not A Slug"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::InvalidSlug { .. }));

    let err = service
        .create_project(creator.id, new_project("Bad", &"a".repeat(31)))
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::InvalidSlug { .. }));

    let err = service
        .create_project(
            creator.id,
            NewProject {
                main_color: Some("blue".to_string()),
                ..new_project("Bad", "bad-color")
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("main_color"));

    let err = service
        .create_project(client.id, new_project("Mine", "mine"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::WrongRole { .. }));

    let err = service
        .create_project(999, new_project("Ghost", "ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::UserNotFound(999)));

    assert_eq!(projects::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_slug_availability_and_update() {
    let db = setup_test_db().await.unwrap();
    let creator = create_user(&db, "ada@example.com", UserRole::Creator).await;
    let service = ProjectService::new(db.clone(), "en");

    let first = service
        .create_project(creator.id, new_project("First", "first"))
        .await
        .unwrap();
    service
        .create_project(creator.id, new_project("Second", "second"))
        .await
        .unwrap();

    assert!(!service.is_slug_available("first").await.unwrap());
    assert!(service.is_slug_available("third").await.unwrap());
    assert!(service.is_slug_available("Third!").await.is_err());

    // keeping its own slug is fine
    let updated = service
        .update_project(
            first.id,
            ProjectUpdate {
                slug: Some("first".to_string()),
                main_color: Some("#ff0000".to_string()),
                human_name: Some("First Line".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.main_color, "#FF0000");
    assert_eq!(updated.human_name.as_deref(), Some("First Line"));

    let err = service
        .update_project(
            first.id,
            ProjectUpdate {
                slug: Some("second".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::DuplicateSlug(_)));

    let renamed = service
        .update_project(
            first.id,
            ProjectUpdate {
                slug: Some("first-line".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.slug, "first-line");
    assert_eq!(
        service.get_project_by_slug("first-line").await.unwrap().id,
        first.id
    );
    assert!(matches!(
        service.get_project_by_slug("first").await,
        Err(ProjectError::SlugNotFound(_))
    ));
}

#[tokio::test]
async fn test_list_and_delete_projects() {
    let db = setup_test_db().await.unwrap();
    let ada = create_user(&db, "ada@example.com", UserRole::Creator).await;
    let grace = create_user(&db, "grace@example.com", UserRole::Creator).await;
    let service = ProjectService::new(db.clone(), "en");

    let older = service
        .create_project(ada.id, new_project("Older", "older"))
        .await
        .unwrap();
    let newer = service
        .create_project(ada.id, new_project("Newer", "newer"))
        .await
        .unwrap();
    service
        .create_project(grace.id, new_project("Other", "other"))
        .await
        .unwrap();

    let listed: Vec<i32> = service
        .list_projects(ada.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![newer.id, older.id]);

    service.delete_project(older.id).await.unwrap();
    assert!(matches!(
        service.get_project(older.id).await,
        Err(ProjectError::NotFound(_))
    ));
    assert_eq!(
        nodes::Entity::find()
            .filter(nodes::Column::ProjectId.eq(older.id))
            .count(&db)
            .await
            .unwrap(),
        0
    );
    assert!(matches!(
        service.delete_project(older.id).await,
        Err(ProjectError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_duplicate_email() {
    let db = setup_test_db().await.unwrap();
    let users = UserService::new(db);

    users
        .create_user("ada@example.com", UserRole::Creator)
        .await
        .unwrap();
    let err = users
        .create_user("ADA@example.com", UserRole::Client)
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::DuplicateEmail(_)));
}
