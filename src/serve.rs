//! JSON editing API.
//!
//! A blocking `tiny_http` server. Requests are handled one at a time on the
//! main thread, so a save returns only after its rebuild has finished.
//!
//! # Routes
//!
//! ```text
//! GET    /api/pages            list pages
//! GET    /api/pages/<path>     read page
//! POST   /api/pages/<path>     save page, rebuild
//! DELETE /api/pages/<path>     delete page, rebuild
//! GET    /api/data             list data files
//! GET    /api/data/<path>      read data file
//! POST   /api/data/<path>      save data file, rebuild
//! DELETE /api/data/<path>      delete data file, rebuild
//! GET    /api/fields/<path>    editable fields of a data file
//! POST   /api/drafts           draft a new page (nothing is written)
//! ```
//!
//! Every body is a JSON object with `success`; failures carry `error`.

use crate::{
    config::cfg,
    document::FieldDescriptor,
    error::EditorError,
    log,
    logger::log_request,
    workspace::{SaveData, SavePage, Workspace, draft_page},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{io::Read, net::SocketAddr, sync::Arc};
use tiny_http::{Header, Method, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Prefix shared by every route.
const API_PREFIX: &str = "/api/";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the API server.
///
/// Binds to the configured interface and port (retrying on conflicts), sets
/// up a Ctrl+C handler, then serves until interrupted.
pub fn serve_editor() -> Result<()> {
    let c = cfg();
    let interface: std::net::IpAddr = c
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", c.serve.interface))?;

    let (server, addr) = try_bind_port(interface, c.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}{}", addr, API_PREFIX);
    log!("serve"; "pages: {}", c.paths.pages.display());
    log!("serve"; "data: {}", c.paths.data.display());
    if c.config_path.exists() {
        log!("serve"; "config: {}", c.config_path.display());
    }

    let workspace = Workspace::from_config(&c);
    let limits = Limits {
        max_body: c.get_max_body(),
        cors: c.serve.cors,
    };

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &workspace, limits) {
            log!("error"; "request error: {e:#}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Limits {
    max_body: usize,
    cors: bool,
}

/// Read, route, and answer one request.
fn handle_request(mut request: Request, workspace: &Workspace, limits: Limits) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_owned();

    let reply = match read_body(&mut request, limits.max_body)? {
        Some(body) => route(&method, &url, &body, workspace),
        None => ApiReply::error(
            413,
            format!("request body exceeds {} bytes", limits.max_body),
        ),
    };

    log_request(method.as_str(), &url, reply.status);
    request.respond(reply.into_response(limits.cors))?;
    Ok(())
}

/// Read the body, or `None` if it is larger than `max_body`.
fn read_body(request: &mut Request, max_body: usize) -> Result<Option<Vec<u8>>> {
    if request.body_length().is_some_and(|len| len > max_body) {
        return Ok(None);
    }

    let mut body = Vec::new();
    let limit = u64::try_from(max_body).unwrap_or(u64::MAX).saturating_add(1);
    request
        .as_reader()
        .take(limit)
        .read_to_end(&mut body)
        .context("Failed to read request body")?;

    Ok((body.len() <= max_body).then_some(body))
}

// ============================================================================
// Routing
// ============================================================================

/// Status and JSON body of an API answer. `body` is `None` for 204.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiReply {
    /// `{"success": true, ...fields of value}`
    fn ok<T: Serialize>(value: &T) -> Self {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(true));
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => body.extend(fields),
            Ok(_) => {}
            Err(err) => return Self::from(EditorError::from(err)),
        }
        Self {
            status: 200,
            body: Some(Value::Object(body)),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "success": false, "error": message.into() })),
        }
    }

    const fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn into_response(self, cors: bool) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut headers = vec![("Content-Type", "application/json; charset=utf-8")];
        if cors {
            headers.extend([
                ("Access-Control-Allow-Origin", "*"),
                ("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS"),
                ("Access-Control-Allow-Headers", "Content-Type"),
            ]);
        }

        let data = self.body.map(|b| b.to_string()).unwrap_or_default();
        let mut response = Response::from_data(data).with_status_code(self.status);
        for header in headers
            .into_iter()
            .filter_map(|(k, v)| Header::from_bytes(k, v).ok())
        {
            response.add_header(header);
        }
        response
    }
}

impl From<EditorError> for ApiReply {
    fn from(err: EditorError) -> Self {
        let status = err.status();
        if status >= 500 {
            log!("error"; "{err}");
        }
        Self::error(status, err.to_string())
    }
}

/// Wrap a workspace result as a reply.
fn reply<T: Serialize>(result: crate::error::Result<T>) -> ApiReply {
    match result {
        Ok(value) => ApiReply::ok(&value),
        Err(err) => ApiReply::from(err),
    }
}

#[derive(Debug, Serialize)]
struct FieldList {
    fields: Vec<FieldDescriptor>,
}

/// Body of `POST /api/drafts`.
#[derive(Debug, Deserialize)]
struct DraftRequest {
    path: String,
}

/// Dispatch one request to the workspace.
///
/// `url` is the raw request target: its query string is cut off first, then
/// the path is percent-decoded, so an encoded `?` stays in the file name.
pub fn route(method: &Method, url: &str, body: &[u8], workspace: &Workspace) -> ApiReply {
    if *method == Method::Options {
        return ApiReply::no_content();
    }

    let raw_path = url.split_once('?').map_or(url, |(path, _)| path);
    let decoded = urlencoding::decode(raw_path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| raw_path.to_owned());
    let path = decoded.as_str();

    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return ApiReply::error(404, format!("no route for `{path}`"));
    };
    let (resource, rel) = rest.split_once('/').unwrap_or((rest, ""));

    match (resource, rel.is_empty(), method) {
        ("pages", true, Method::Get) => ApiReply::ok(&json!({ "pages": workspace.list_pages() })),
        ("pages", false, Method::Get) => reply(workspace.get_page(rel)),
        ("pages", false, Method::Post) => {
            reply(parse::<SavePage>(body).and_then(|req| workspace.save_page(rel, &req)))
        }
        ("pages", false, Method::Delete) => reply(workspace.delete_page(rel)),

        ("data", true, Method::Get) => ApiReply::ok(&json!({ "files": workspace.list_data() })),
        ("data", false, Method::Get) => reply(workspace.get_data(rel)),
        ("data", false, Method::Post) => {
            reply(parse::<SaveData>(body).and_then(|req| workspace.save_data(rel, req)))
        }
        ("data", false, Method::Delete) => reply(workspace.delete_data(rel)),

        ("fields", false, Method::Get) => {
            reply(workspace.fields(rel).map(|fields| FieldList { fields }))
        }

        ("drafts", true, Method::Post) => {
            reply(parse::<DraftRequest>(body).and_then(|req| draft_page(&req.path)))
        }

        ("pages" | "data" | "fields" | "drafts", _, _) if known_route(resource, rel.is_empty()) => {
            ApiReply::error(405, format!("{method} not allowed on `{path}`"))
        }
        _ => ApiReply::error(404, format!("no route for `{path}`")),
    }
}

/// True if some method is served for this resource shape.
fn known_route(resource: &str, is_collection: bool) -> bool {
    matches!(
        (resource, is_collection),
        ("pages" | "data", _) | ("fields", false) | ("drafts", true)
    )
}

fn parse<'a, T: Deserialize<'a>>(body: &'a [u8]) -> crate::error::Result<T> {
    Ok(serde_json::from_slice(body)?)
}

// ============================================================================
// Tests
// ============================================================================
