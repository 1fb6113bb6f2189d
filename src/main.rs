use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use flowbuilder::database::entities::users::UserRole;
use flowbuilder::database::{
    establish_connection, get_database_url, migrate_database, setup_database, MigrateDirection,
};
use flowbuilder::errors::{CoreError, FlowError, ProjectError};
use flowbuilder::services::{NewProject, ProjectUpdate};
use flowbuilder::{AppConfig, AppContext};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// TOML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database path, or `:memory:`
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    User {
        #[clap(subcommand)]
        command: UserCommands,
    },
    Project {
        #[clap(subcommand)]
        command: ProjectCommands,
    },
    Flow {
        #[clap(subcommand)]
        command: FlowCommands,
    },
    Languages {
        #[clap(subcommand)]
        command: LanguageCommands,
    },
    Client {
        #[clap(subcommand)]
        command: ClientCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    Create {
        #[clap(long)]
        email: String,
        /// admin, creator or client
        #[clap(long)]
        role: UserRole,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommands {
    Create {
        #[clap(long)]
        creator: i32,
        #[clap(long)]
        name: String,
        #[clap(long)]
        slug: String,
        #[clap(long)]
        human_name: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        color: Option<String>,
        #[clap(long)]
        logo: Option<String>,
    },
    Update {
        id: i32,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        slug: Option<String>,
        #[clap(long)]
        human_name: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        color: Option<String>,
        #[clap(long)]
        logo: Option<String>,
    },
    List {
        #[clap(long)]
        creator: i32,
    },
    /// Project fields with enabled and available languages
    Show { id: i32 },
    CheckSlug { slug: String },
    /// Re-create missing default input/output nodes
    Provision { id: i32 },
    Delete { id: i32 },
}

#[derive(Subcommand, Debug)]
enum FlowCommands {
    Show {
        project: i32,
    },
    /// Replace the whole flow with the JSON payload in FILE (`-` for stdin)
    Save {
        project: i32,
        #[clap(long)]
        file: String,
    },
}

#[derive(Subcommand, Debug)]
enum LanguageCommands {
    List,
    Show {
        project: i32,
    },
    /// Enable exactly the given language ids, e.g. --json '[1, 3]'
    Set {
        project: i32,
        #[clap(long)]
        json: String,
    },
}

#[derive(Subcommand, Debug)]
enum ClientCommands {
    /// Public system info for a project slug
    System { slug: String },
    Assign {
        #[clap(long)]
        client: i32,
        #[clap(long)]
        project: i32,
    },
    CreateJob {
        #[clap(long)]
        user: i32,
        #[clap(long)]
        name: String,
    },
    AddTranscript {
        #[clap(long)]
        job: i32,
        #[clap(long)]
        file: String,
    },
    SetOutput {
        #[clap(long)]
        job: i32,
        #[clap(long)]
        file: String,
    },
    Jobs {
        #[clap(long)]
        user: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    setup_logging(&config.log_level);

    match run(args.command, &config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&error_body(&err))?);
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<Value, CoreError> {
    match command {
        Commands::Db { command } => run_db(config, command).await,
        Commands::User { command } => match command {
            UserCommands::Create { email, role } => {
                let ctx = open_context(config).await?;
                to_output(ctx.user_service().create_user(&email, role).await?)
            }
        },
        Commands::Project { command } => run_project(&open_context(config).await?, command).await,
        Commands::Flow { command } => {
            let ctx = open_context(config).await?;
            match command {
                FlowCommands::Show { project } => {
                    to_output(ctx.flow_service().load_flow(project).await?)
                }
                FlowCommands::Save { project, file } => {
                    let raw = read_input(&file)?;
                    let payload: Value = serde_json::from_str(&raw)
                        .map_err(|e| FlowError::InvalidPayload(e.to_string()))?;
                    to_output(ctx.flow_service().save_flow(project, payload).await?)
                }
            }
        }
        Commands::Languages { command } => {
            let ctx = open_context(config).await?;
            match command {
                LanguageCommands::List => {
                    to_output(ctx.language_service().list_languages().await?)
                }
                LanguageCommands::Show { project } => {
                    to_output(ctx.language_service().project_languages(project).await?)
                }
                LanguageCommands::Set { project, json } => {
                    let value: Value = serde_json::from_str(&json)
                        .map_err(|e| ProjectError::validation("language_ids", e.to_string()))?;
                    to_output(ctx.set_project_languages(project, &value).await?)
                }
            }
        }
        Commands::Client { command } => run_client(&open_context(config).await?, command).await,
    }
}

async fn open_context(config: &AppConfig) -> Result<AppContext, CoreError> {
    let database_url = get_database_url(Some(&config.database));
    let db = setup_database(&database_url, &config.pool)
        .await
        .context("Failed to open database")?;
    Ok(AppContext::new(db, config))
}

async fn run_db(config: &AppConfig, command: DbCommands) -> Result<Value, CoreError> {
    let database_url = get_database_url(Some(&config.database));
    let db = establish_connection(&database_url, &config.pool)
        .await
        .context("Failed to connect to database")?;

    let direction = match command {
        DbCommands::Init => MigrateDirection::Up,
        DbCommands::Migrate { direction } => direction,
    };
    info!("Migrating database: {}", config.database);
    migrate_database(&db, direction)
        .await
        .context("Database migration failed")?;

    Ok(json!({ "database": config.database, "migration": format!("{:?}", direction) }))
}

async fn run_project(ctx: &AppContext, command: ProjectCommands) -> Result<Value, CoreError> {
    let projects = ctx.project_service();
    match command {
        ProjectCommands::Create {
            creator,
            name,
            slug,
            human_name,
            description,
            color,
            logo,
        } => {
            let input = NewProject {
                name,
                slug,
                human_name,
                description,
                main_color: color,
                logo,
            };
            let project = projects.create_project(creator, input).await?;
            to_output(ctx.project_settings(project.id).await?)
        }
        ProjectCommands::Update {
            id,
            name,
            slug,
            human_name,
            description,
            color,
            logo,
        } => {
            let update = ProjectUpdate {
                name,
                slug,
                human_name,
                description,
                main_color: color,
                logo,
            };
            let (settings, _) = ctx.update_project_settings(id, update, None).await?;
            to_output(settings)
        }
        ProjectCommands::List { creator } => to_output(projects.list_projects(creator).await?),
        ProjectCommands::Show { id } => to_output(ctx.project_settings(id).await?),
        ProjectCommands::CheckSlug { slug } => {
            let available = projects.is_slug_available(&slug).await?;
            Ok(json!({ "slug": slug, "available": available }))
        }
        ProjectCommands::Provision { id } => {
            to_output(projects.provision_default_nodes(id).await?)
        }
        ProjectCommands::Delete { id } => {
            projects.delete_project(id).await?;
            Ok(json!({ "deleted": id }))
        }
    }
}

async fn run_client(ctx: &AppContext, command: ClientCommands) -> Result<Value, CoreError> {
    let clients = ctx.client_service();
    match command {
        ClientCommands::System { slug } => to_output(clients.system_info(&slug).await?),
        ClientCommands::Assign { client, project } => {
            to_output(clients.assign_client(client, project).await?)
        }
        ClientCommands::CreateJob { user, name } => {
            to_output(clients.create_job(user, &name).await?)
        }
        ClientCommands::AddTranscript { job, file } => {
            let content = read_input(&file)?;
            to_output(clients.add_transcript(job, &content).await?)
        }
        ClientCommands::SetOutput { job, file } => {
            let markdown = read_input(&file)?;
            to_output(clients.set_job_output(job, &markdown).await?)
        }
        ClientCommands::Jobs { user } => to_output(clients.list_jobs(user).await?),
    }
}

fn to_output<T: Serialize>(value: T) -> Result<Value, CoreError> {
    serde_json::to_value(value)
        .context("Failed to serialize output")
        .map_err(CoreError::from)
}

fn read_input(path: &str) -> Result<String, CoreError> {
    let content = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    };
    Ok(content)
}

fn error_body(err: &CoreError) -> Value {
    json!({
        "error": {
            "status": err.http_status(),
            "code": err.code(),
            "message": err.message(),
            "fields": err.fields(),
        }
    })
}

fn setup_logging(log_level: &str) {
    let log_level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
