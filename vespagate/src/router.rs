//! Request dispatch
//!
//! Routing mirrors how search clusters route: the path is split on `/`
//! (keeping the leading empty segment) and walked through an ordered
//! per-method action table; the first matching action handles the
//! request. Fixed meta-segments are listed before the generic
//! index-name matchers, which refuse segments starting with `_`.
//! Anything unmatched gets the 405 error envelope.

use crate::actions::{bulk, cluster, document, indices, search, GatewayState};
use crate::error::GatewayError;
use axum::body::{to_bytes, Bytes};
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Routable operations, in no particular order; precedence lives in
/// the per-method tables of [`Action::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Root,
    ClusterHealth,
    ClusterState,
    CatIndices,
    Search,
    Count,
    Mget,
    Bulk,
    Refresh,
    Update,
    Create,
    Document,
    Indices,
    Mapping,
    Settings,
}

impl Action {
    /// First action in the method's table whose predicate accepts the
    /// path segments.
    pub fn resolve(method: &Method, segments: &[&str]) -> Option<Action> {
        use Action::*;
        let table: &[Action] = if *method == Method::GET {
            &[
                Root,
                ClusterHealth,
                ClusterState,
                CatIndices,
                Search,
                Count,
                Mget,
                Indices,
                Mapping,
                Settings,
                Document,
            ]
        } else if *method == Method::POST {
            &[Bulk, Search, Count, Mget, Update, Refresh, Create, Document]
        } else if *method == Method::PUT {
            &[Bulk, Indices, Mapping, Settings, Create, Document]
        } else if *method == Method::DELETE {
            &[Indices, Document]
        } else if *method == Method::HEAD {
            &[Indices]
        } else {
            &[]
        };
        table.iter().copied().find(|action| action.matches(segments))
    }

    fn matches(&self, p: &[&str]) -> bool {
        match self {
            Action::Root => p.len() <= 1 || (p.len() == 2 && p[1].is_empty()),
            Action::ClusterHealth => {
                (p.len() == 3 || p.len() == 4) && p[1] == "_cluster" && p[2] == "health"
            }
            Action::ClusterState => p.len() == 3 && p[1] == "_cluster" && p[2] == "state",
            Action::CatIndices => {
                (p.len() == 3 || p.len() == 4) && p[1] == "_cat" && p[2] == "indices"
            }
            Action::Search => meta_op(p, "_search"),
            Action::Count => meta_op(p, "_count"),
            Action::Mget => meta_op(p, "_mget"),
            Action::Bulk => meta_op(p, "_bulk"),
            Action::Refresh => meta_op(p, "_refresh"),
            Action::Update => p.len() == 4 && is_index(p[1]) && p[2] == "_update",
            Action::Create => p.len() == 4 && is_index(p[1]) && p[2] == "_create",
            Action::Document => {
                (p.len() == 3 || p.len() == 4) && is_index(p[1]) && p[2] == "_doc"
            }
            Action::Indices => p.len() == 2 && is_index(p[1]),
            Action::Mapping => p.len() == 3 && is_index(p[1]) && p[2] == "_mapping",
            Action::Settings => p.len() == 3 && is_index(p[1]) && p[2] == "_settings",
        }
    }
}

/// Meta operations accept both the bare and the index-scoped form
fn meta_op(p: &[&str], op: &str) -> bool {
    (p.len() == 2 && p[1] == op) || (p.len() == 3 && is_index(p[1]) && p[2] == op)
}

/// An index name never starts with an underscore
fn is_index(segment: &str) -> bool {
    !segment.is_empty() && !segment.starts_with('_')
}

/// Build the gateway service
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(State(state): State<GatewayState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let body = match to_bytes(request.into_body(), state.config.server.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return GatewayError::InvalidRequestBody(e.to_string()).into_response();
        }
    };

    match route(&state, &method, &path, &body).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn route(
    state: &GatewayState,
    method: &Method,
    path: &str,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let prefix = state.config.server.path_prefix.as_str();
    let effective = if !prefix.is_empty() {
        path.strip_prefix(prefix).unwrap_or(path)
    } else {
        path
    };
    let p: Vec<&str> = effective.split('/').collect();

    let no_handler = || GatewayError::NoHandler {
        method: method.to_string(),
        path: path.to_string(),
    };

    let action = Action::resolve(method, &p).ok_or_else(no_handler)?;

    match action {
        Action::Root => cluster::root_info(state).await,
        Action::ClusterHealth => cluster::cluster_health(state, p.get(3).copied()).await,
        Action::ClusterState => cluster::cluster_state(state).await,
        Action::CatIndices => cluster::cat_indices(state, p.get(3).copied()).await,
        Action::Refresh => cluster::refresh(state, scoped_index(&p)).await,

        Action::Search => search::search(state, scoped_index(&p), body).await,
        Action::Count => search::count(state, scoped_index(&p), body).await,
        Action::Mget => search::mget(state, scoped_index(&p), body).await,

        Action::Bulk => bulk::bulk(state, scoped_index(&p), body).await,

        Action::Update => document::update_document(state, p[1], p[3], body).await,
        Action::Create => {
            document::create_document(state, p[1], p[3], body, *method == Method::PUT).await
        }
        Action::Document => {
            let id = p.get(3).copied();
            if *method == Method::POST {
                document::post_document(state, p[1], id, body).await
            } else if let Some(id) = id {
                if *method == Method::GET {
                    document::get_document(state, p[1], id).await
                } else if *method == Method::PUT {
                    document::put_document(state, p[1], id, body).await
                } else if *method == Method::DELETE {
                    document::delete_document(state, p[1], id).await
                } else {
                    Err(no_handler())
                }
            } else {
                Err(no_handler())
            }
        }

        Action::Indices => {
            if *method == Method::PUT {
                indices::create_index(state, p[1], body).await
            } else if *method == Method::DELETE {
                indices::delete_index(state, p[1]).await
            } else if *method == Method::GET {
                indices::get_index(state, p[1]).await
            } else if *method == Method::HEAD {
                indices::index_exists(state, p[1]).await
            } else {
                Err(no_handler())
            }
        }
        Action::Mapping => {
            if *method == Method::GET {
                indices::get_mapping(state, p[1]).await
            } else if *method == Method::PUT {
                indices::put_mapping(state, p[1], body).await
            } else {
                Err(no_handler())
            }
        }
        Action::Settings => {
            if *method == Method::GET {
                indices::get_settings(state, p[1]).await
            } else if *method == Method::PUT {
                indices::put_settings(state, p[1], body).await
            } else {
                Err(no_handler())
            }
        }
    }
}

/// Index segment of the index-scoped form of a meta operation
fn scoped_index<'a>(p: &[&'a str]) -> Option<&'a str> {
    if p.len() == 3 && is_index(p[1]) {
        Some(p[1])
    } else {
        None
    }
}
