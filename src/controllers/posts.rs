//! `posts` namespace. Read-only sample data.

use serde::Serialize;

use crate::dispatch::RequestError;
use crate::handler::Handler;
use crate::http::request::Request;
use crate::http::response::Response;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: u32,
    pub title: &'static str,
}

pub const POSTS: &[Post] = &[
    Post { id: 1, title: "Hello World" },
    Post { id: 2, title: "Routing with tweaks" },
    Post { id: 3, title: "Going to production" },
];

pub fn index() -> Handler {
    Handler::new("posts.index").get(list)
}

/// `?limit=N` caps the number of posts returned.
fn list(req: &Request) -> Result<Response, RequestError> {
    let limit = match req.query_param("limit") {
        None => POSTS.len(),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| RequestError::bad_request(format!("Invalid limit '{}'.", raw)))?,
    };
    let posts: Vec<&Post> = POSTS.iter().take(limit).collect();
    Response::json(&posts).map_err(|e| {
        RequestError::with_status(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode posts: {}", e),
        )
    })
}
