//! Query DSL to YQL condition compiler
//!
//! Compilation is pure and total: every clause tree yields a condition
//! string, with unknown clauses degrading to an always-true condition
//! rather than an error.

use crate::query::types::{BoolClause, QueryClause, RangeBounds, SearchRequest};
use serde_json::Value;

/// Default result window when the request does not specify one
const DEFAULT_SIZE: i64 = 10;

/// A compiled backend query. Paging values are signed and carried
/// through uninterpreted; the backend decides what to do with
/// out-of-range windows.
#[derive(Debug, Clone, PartialEq)]
pub struct YqlQuery {
    pub yql: String,
    pub hits: i64,
    pub offset: i64,
}

/// Compile a full search request into a YQL select plus paging params
pub fn compile_request(request: &SearchRequest) -> YqlQuery {
    let condition = request
        .query
        .as_ref()
        .map(compile)
        .unwrap_or_else(|| "true".to_string());

    YqlQuery {
        yql: format!("select * from sources * where {condition}"),
        hits: request.size.unwrap_or(DEFAULT_SIZE),
        offset: request.from.unwrap_or(0),
    }
}

/// Compile a single clause into a YQL condition string
pub fn compile(clause: &QueryClause) -> String {
    match clause {
        QueryClause::MatchAll => "true".to_string(),

        QueryClause::Match { field, value } => {
            format!("{} contains \"{}\"", field, escape_yql(&value_text(value)))
        }

        QueryClause::MatchPhrase { field, value } => {
            format!(
                "{} contains phrase(\"{}\")",
                field,
                escape_yql(&value_text(value))
            )
        }

        QueryClause::MultiMatch { query, fields } => {
            if fields.is_empty() {
                return "true".to_string();
            }
            let escaped = escape_yql(query);
            let parts: Vec<String> = fields
                .iter()
                .map(|f| format!("{f} contains \"{escaped}\""))
                .collect();
            join_group(parts, " OR ")
        }

        QueryClause::Term { field, value } => {
            format!("{} matches \"{}\"", field, escape_yql(&value_text(value)))
        }

        QueryClause::Terms { field, values } => {
            if values.is_empty() {
                return "false".to_string();
            }
            let parts: Vec<String> = values
                .iter()
                .map(|v| format!("{} matches \"{}\"", field, escape_yql(&value_text(v))))
                .collect();
            format!("({})", parts.join(" OR "))
        }

        QueryClause::Range { field, bounds } => compile_range(field, bounds),

        // Approximation: matches non-empty strings or any non-zero
        // numeric; zero-valued numerics and false booleans are missed.
        QueryClause::Exists { field } => {
            format!("({field} matches \"*\" OR {field} > 0 OR {field} < 0)")
        }

        QueryClause::Prefix { field, value } => {
            format!("{} matches \"{}*\"", field, escape_yql(value))
        }

        QueryClause::Wildcard { field, value } => {
            format!("{} matches \"{}\"", field, escape_yql(value))
        }

        QueryClause::Bool(bool_clause) => compile_bool(bool_clause),

        QueryClause::Ids { values } => {
            if values.is_empty() {
                return "false".to_string();
            }
            let parts: Vec<String> = values
                .iter()
                .map(|id| format!("documentid contains \"{}\"", escape_yql(id)))
                .collect();
            format!("({})", parts.join(" OR "))
        }

        QueryClause::QueryString { query, fields } => {
            let escaped = escape_yql(query);
            if fields.is_empty() {
                return format!("default contains \"{escaped}\"");
            }
            let parts: Vec<String> = fields
                .iter()
                .map(|f| format!("{f} contains \"{escaped}\""))
                .collect();
            join_group(parts, " OR ")
        }

        QueryClause::Unknown => "true".to_string(),
    }
}

fn compile_range(field: &str, bounds: &RangeBounds) -> String {
    let mut parts = vec![];

    // gte wins over gt, lte over lt, when both bounds are present
    if let Some(v) = bounds.gte.as_ref() {
        parts.push(format!("{} >= {}", field, value_text(v)));
    } else if let Some(v) = bounds.gt.as_ref() {
        parts.push(format!("{} > {}", field, value_text(v)));
    }

    if let Some(v) = bounds.lte.as_ref() {
        parts.push(format!("{} <= {}", field, value_text(v)));
    } else if let Some(v) = bounds.lt.as_ref() {
        parts.push(format!("{} < {}", field, value_text(v)));
    }

    if parts.is_empty() {
        return "true".to_string();
    }
    format!("({})", parts.join(" AND "))
}

fn compile_bool(clause: &BoolClause) -> String {
    let mut parts = vec![];

    if !clause.must.is_empty() {
        parts.push(compile_group(&clause.must, " AND "));
    }
    if !clause.filter.is_empty() {
        parts.push(compile_group(&clause.filter, " AND "));
    }
    if !clause.should.is_empty() {
        parts.push(compile_group(&clause.should, " OR "));
    }
    for negated in &clause.must_not {
        parts.push(format!("!({})", compile(negated)));
    }

    if parts.is_empty() {
        return "true".to_string();
    }
    format!("({})", parts.join(" AND "))
}

fn compile_group(clauses: &[QueryClause], separator: &str) -> String {
    let parts: Vec<String> = clauses.iter().map(compile).collect();
    join_group(parts, separator)
}

// Groups keep their parentheses even with a single member
fn join_group(parts: Vec<String>, separator: &str) -> String {
    format!("({})", parts.join(separator))
}

/// Escape a value for interpolation into a quoted YQL string literal.
/// Backslashes first so the quote escapes are not doubled.
pub fn escape_yql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a JSON scalar as bare text. Strings drop their quotes;
/// everything else keeps its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
