use std::path::{Path, PathBuf};

/// 1 MB = 1024 * 1024 字节
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// macOS 下通常无权限或不应清理的系统目录
const SYSTEM_PREFIXES: &[&str] = &[
    "/Applications",
    "/System",
    "/Library",
    "/usr",
    "/bin",
    "/sbin",
    "/cores",
    "/dev",
    "/etc",
    "/net",
    "/private",
    "/tmp",
    "/var",
];

/// 用户目录下由系统管理的缓存/容器目录
const HOME_LIBRARY_SUBDIRS: &[&str] = &[
    "Caches",
    "Containers",
    "Application Support",
    "Group Containers",
];

/// 扫描过滤器
#[derive(Debug, Clone)]
pub struct ScanFilters {
    /// 严格大于该值的文件才会被保留
    pub min_size_bytes: u64,
    pub top_n: usize,
    /// 需要剪枝的目录前缀（按路径组件匹配）
    pub exclude_prefixes: Vec<PathBuf>,
}

impl Default for ScanFilters {
    fn default() -> Self {
        Self {
            min_size_bytes: 50 * BYTES_PER_MB,
            top_n: 50,
            exclude_prefixes: default_exclude_prefixes(),
        }
    }
}

impl ScanFilters {
    pub fn from_megabytes(min_size_mb: u64, top_n: usize) -> Self {
        Self {
            min_size_bytes: min_size_mb.saturating_mul(BYTES_PER_MB),
            top_n,
            ..Self::default()
        }
    }

    /// 对给定扫描根，返回实际生效的排除前缀：包含扫描根本身的前缀被忽略，
    /// 用户显式要求扫描某个被排除区域时照常扫描
    pub fn active_excludes<'a>(&'a self, root: &Path) -> Vec<&'a Path> {
        self.exclude_prefixes
            .iter()
            .map(PathBuf::as_path)
            .filter(|prefix| !root.starts_with(prefix))
            .collect()
    }
}

pub fn default_exclude_prefixes() -> Vec<PathBuf> {
    let mut prefixes: Vec<PathBuf> = SYSTEM_PREFIXES.iter().map(PathBuf::from).collect();
    if let Some(home) = dirs::home_dir() {
        let library = home.join("Library");
        prefixes.extend(HOME_LIBRARY_SUBDIRS.iter().map(|d| library.join(d)));
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_megabytes() {
        let f = ScanFilters::from_megabytes(50, 20);
        assert_eq!(f.min_size_bytes, 50 * 1024 * 1024);
        assert_eq!(f.top_n, 20);
        assert!(!f.exclude_prefixes.is_empty());
    }

    #[test]
    fn test_defaults_contain_system_dirs() {
        let prefixes = default_exclude_prefixes();
        assert!(prefixes.contains(&PathBuf::from("/System")));
        assert!(prefixes.contains(&PathBuf::from("/tmp")));
    }

    #[test]
    fn test_active_excludes_skip_prefixes_containing_root() {
        let filters = ScanFilters {
            exclude_prefixes: vec![PathBuf::from("/tmp"), PathBuf::from("/usr")],
            ..ScanFilters::default()
        };
        let active = filters.active_excludes(Path::new("/tmp/work"));
        assert_eq!(active, vec![Path::new("/usr")]);
    }

    #[test]
    fn test_prefix_match_is_component_wise() {
        let filters = ScanFilters {
            exclude_prefixes: vec![PathBuf::from("/var")],
            ..ScanFilters::default()
        };
        // "/variants" 不以组件 "/var" 开头
        let active = filters.active_excludes(Path::new("/variants"));
        assert_eq!(active.len(), 1);
        assert!(!Path::new("/variants/x").starts_with(active[0]));
    }
}
