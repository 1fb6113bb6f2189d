pub mod ai_node_examples;
pub mod ai_nodes;
pub mod client_jobs;
pub mod code_nodes;
pub mod edges;
pub mod nodes;
pub mod project_clients;
pub mod project_transcript_languages;
pub mod projects;
pub mod template_nodes;
pub mod transcript_languages;
pub mod transcripts;
pub mod users;
