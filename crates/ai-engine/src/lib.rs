pub mod prompt;
pub mod analyzer;
pub mod validator;
pub mod llm;

pub use prompt::*;
pub use analyzer::*;
pub use validator::*;
pub use llm::*;
