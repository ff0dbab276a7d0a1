pub mod assessment;
pub mod llm;
pub mod messages;
pub mod prompt;
pub mod traits;
