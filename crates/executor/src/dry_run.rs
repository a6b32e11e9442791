use std::path::Path;

use klinex_common::KlinexError;

use crate::delete::Trasher;

/// 只记录日志、不移动任何文件
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunTrash;

impl Trasher for DryRunTrash {
    fn trash(&self, path: &Path) -> Result<(), KlinexError> {
        log::info!("[dry run] would move to trash: {}", path.display());
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }
}
