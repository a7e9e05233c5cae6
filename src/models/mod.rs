//! Model definitions.

pub mod openai;

pub use openai::OpenAiModel;
