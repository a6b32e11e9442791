pub mod file_entry;
pub mod scan_result;
pub mod risk;
pub mod suggestion;
pub mod trash_outcome;

pub use file_entry::*;
pub use scan_result::*;
pub use risk::*;
pub use suggestion::*;
pub use trash_outcome::*;
