use std::io::Write;

/// 初始化全局日志。`RUST_LOG` 优先，否则 verbose 时为 debug，默认 info。
/// 重复调用是安全的（第二次 init 会被忽略）。
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[Klinex] {} {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
