pub mod delete;
pub mod dry_run;

pub use delete::*;
pub use dry_run::*;
