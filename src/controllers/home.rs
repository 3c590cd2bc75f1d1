//! `home` namespace.

use serde_json::json;

use crate::handler::Handler;
use crate::http::request::Request;

pub fn index() -> Handler {
    Handler::new("home.index").get(|_: &Request| Ok("Welcome to FyMO"))
}

/// Echoes what the pipeline saw, useful when checking tweaks and proxies.
pub fn home() -> Handler {
    Handler::new("home.home").get(|req: &Request| {
        Ok(json!({
            "path": req.path,
            "requested": req.raw_path,
            "query": req.query_string,
            "server": req.server_name,
        }))
    })
}
