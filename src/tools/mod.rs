//! Tool system for function calling.

pub mod arguments;
pub mod builtin;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use builtin::{BuiltinTool, FetchPageTool, SearchTool};
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool, ToolExecutionContext};
pub use types::ToolParameters;
pub use validation::validate_arguments;
