//! Query DSL parsing and YQL compilation

mod compiler;
mod types;

pub use compiler::{compile, compile_request, escape_yql, YqlQuery};
pub use types::{BoolClause, QueryClause, RangeBounds, SearchRequest};
