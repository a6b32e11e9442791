mod form;
mod pipeline;
mod render;
mod server;
mod session;

use klinex_common::{AppConfig, KlinexError};
use klinex_executor::{DryRunTrash, SystemTrash, Trasher};

pub use server::{route, App, Reply, Route};

/// 启动本地 Web 服务并阻塞直到进程退出
pub fn run(config: AppConfig) -> Result<(), KlinexError> {
    let server = tiny_http::Server::http(config.bind.as_str())
        .map_err(|e| KlinexError::Config(format!("cannot listen on {}: {}", config.bind, e)))?;
    let url = format!("http://{}", config.bind);
    log::info!("Klinex is running at {}", url);

    let trasher: Box<dyn Trasher> = if config.dry_run {
        log::warn!("dry run: files will not be moved to the trash");
        Box::new(DryRunTrash)
    } else {
        Box::new(SystemTrash)
    };

    if config.open_browser {
        if let Err(e) = open::that(&url) {
            log::warn!("cannot open browser: {}", e);
        }
    }

    let mut app = App::new(config, trasher)?;
    server::serve(&mut app, &server);
    Ok(())
}
