// Tailoring core: fact store, generation adapter, output parser, fact validator
// and the orchestrator that ties them together.
// All model calls go through llm_client.

pub mod adapter;
pub mod facts;
pub mod handlers;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod validator;

pub use orchestrator::{Tailor, TailoringResult};
