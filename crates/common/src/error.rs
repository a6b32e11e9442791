use thiserror::Error;

#[derive(Error, Debug)]
pub enum KlinexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    /// 远端模型返回了非 2xx 状态码
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Could not move to trash: {0}")]
    Trash(String),
}

impl KlinexError {
    /// 将 io::Error 按权限/其它分类，保留出错路径
    pub fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            KlinexError::PermissionDenied(path.display().to_string())
        } else {
            KlinexError::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, KlinexError>;
