pub mod content_generator;
pub mod content_service;
pub mod llm_service;

pub use content_generator::{parse_questions, ContentGenerator, GenerationReport};
pub use content_service::ContentService;
pub use llm_service::{CompletionClient, CompletionRequest, LlmClientFactory, LlmService};
