pub mod scanner;
pub mod filters;

pub use scanner::{scan_large_files, scan_large_files_with_progress, ProgressCb};
pub use filters::*;
pub use klinex_domain::{FileEntry, ScanResult};
