//! LLM integration module

pub mod agent;
pub mod openai;
pub mod prompts;
pub mod response;

pub use agent::{AgentRequest, AgentResponse, AgentRole, LanguageModel, TokenUsage};
pub use openai::OpenAiModel;
