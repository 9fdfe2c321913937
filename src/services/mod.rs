pub mod anthropic;
pub mod envelope;
pub mod gateway;
pub mod llm;
pub mod ollama;
pub mod prompt;
