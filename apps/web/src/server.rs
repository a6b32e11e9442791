//! 本地 HTTP 服务：单线程顺序处理请求，会话状态归这个循环所有。
//! 所有表单提交都以 303 跳回首页（Post/Redirect/Get）。

use std::io::Read;
use std::time::Duration;

use klinex_ai::GeminiClient;
use klinex_common::{AppConfig, KlinexError};
use klinex_executor::Trasher;
use klinex_scanner::ScanFilters;
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Runtime;

use crate::form::{FormFields, ScanForm};
use crate::pipeline::scan_and_analyze;
use crate::render::render_page;
use crate::session::{NoticeLevel, Session};

/// 请求体上限
const MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Scan,
    Trash,
    TrashSelected,
    SessionJson,
    NotFound,
}

/// 按方法与路径（忽略查询串）选择路由
pub fn route(method: &Method, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or("");
    match (method, path) {
        (Method::Get, "/") => Route::Index,
        (Method::Get, "/api/session") => Route::SessionJson,
        (Method::Post, "/scan") => Route::Scan,
        (Method::Post, "/trash") => Route::Trash,
        (Method::Post, "/trash-selected") => Route::TrashSelected,
        _ => Route::NotFound,
    }
}

#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<&'static str>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
            location: None,
        }
    }

    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
            location: None,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
            location: None,
        }
    }

    fn redirect_home() -> Self {
        Self {
            status: 303,
            content_type: "text/plain; charset=utf-8",
            body: String::new(),
            location: Some("/"),
        }
    }
}

pub struct App {
    config: AppConfig,
    runtime: Runtime,
    trasher: Box<dyn Trasher>,
    session: Session,
}

impl App {
    pub fn new(config: AppConfig, trasher: Box<dyn Trasher>) -> Result<Self, KlinexError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.max_workers.clamp(1, 8))
            .enable_all()
            .build()?;
        let session = Session::new(&config);
        Ok(Self {
            config,
            runtime,
            trasher,
            session,
        })
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn handle(&mut self, route: Route, body: &str) -> Reply {
        match route {
            Route::Index => {
                self.session.prune_vanished();
                let notices = self.session.take_notices();
                Reply::html(render_page(&self.session, &notices, self.config.dry_run))
            }
            Route::SessionJson => match serde_json::to_string(&self.session.snapshot()) {
                Ok(json) => Reply::json(json),
                Err(e) => {
                    log::error!("cannot serialize session: {}", e);
                    Reply::text(500, "Internal Server Error")
                }
            },
            Route::Scan => {
                self.handle_scan(&FormFields::parse(body));
                Reply::redirect_home()
            }
            Route::Trash => {
                let fields = FormFields::parse(body);
                match fields.get("path") {
                    Some(path) => {
                        self.session.trash_one(self.trasher.as_ref(), path);
                    }
                    None => self.session.notify(NoticeLevel::Warning, "No file given."),
                }
                Reply::redirect_home()
            }
            Route::TrashSelected => {
                let selected = FormFields::parse(body).get_all("selected");
                self.session.trash_selected(self.trasher.as_ref(), &selected);
                Reply::redirect_home()
            }
            Route::NotFound => Reply::text(404, "Not Found"),
        }
    }

    fn handle_scan(&mut self, fields: &FormFields) {
        self.session.remember_api_key(fields.get("api_key"));

        let form = match ScanForm::from_fields(fields, self.session.form()) {
            Ok(form) => form,
            Err(e) => {
                self.session.notify(NoticeLevel::Error, e.to_string());
                return;
            }
        };

        let api_key = match self.session.api_key() {
            Some(key) => key.to_string(),
            None => {
                self.session.notify(
                    NoticeLevel::Error,
                    "Please provide a valid Gemini API Key before starting the scan and analysis.",
                );
                return;
            }
        };

        let model = match GeminiClient::new(
            &api_key,
            &form.model,
            &self.config.api_base_url,
            Duration::from_secs(self.config.request_timeout_secs),
        ) {
            Ok(model) => model,
            Err(e) => {
                self.session.notify(
                    NoticeLevel::Error,
                    format!("Failed to configure Gemini API: {}", e),
                );
                return;
            }
        };

        log::info!(
            "scan requested: {} (top {}, > {} MB, model {})",
            form.path,
            form.top_n,
            form.min_size_mb,
            model.model()
        );
        self.session.begin_scan(form.clone());
        let filters = ScanFilters::from_megabytes(form.min_size_mb, form.top_n);

        match scan_and_analyze(&self.runtime, &model, &form, filters, self.config.max_workers) {
            Ok(out) => self.session.finish_scan(&out.scan, out.analysis),
            Err(e) => {
                log::error!("scan failed: {}", e);
                self.session.fail_scan(format!("Scan failed: {}", e));
            }
        }
    }
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn read_body(request: &mut Request) -> Result<String, std::io::Error> {
    let mut body = String::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body)?;
    Ok(body)
}

fn respond(request: Request, reply: Reply) {
    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Some(h) = header("Content-Type", reply.content_type) {
        response = response.with_header(h);
    }
    if let Some(h) = reply.location.and_then(|loc| header("Location", loc)) {
        response = response.with_header(h);
    }
    if let Err(e) = request.respond(response) {
        log::warn!("failed to send response: {}", e);
    }
}

/// 阻塞处理请求直到服务关闭
pub fn serve(app: &mut App, server: &Server) {
    for mut request in server.incoming_requests() {
        let route = route(request.method(), request.url());
        log::debug!("{} {} -> {:?}", request.method(), request.url(), route);

        let body = match read_body(&mut request) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("cannot read request body: {}", e);
                respond(request, Reply::text(400, "Bad Request"));
                continue;
            }
        };

        let reply = app.handle(route, &body);
        respond(request, reply);
    }
}
