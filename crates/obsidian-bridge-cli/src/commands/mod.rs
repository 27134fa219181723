pub mod call;
pub mod serve;
pub mod tools;

pub use call::CallCommand;
pub use serve::ServeArgs;
pub use tools::ToolsCommand;
