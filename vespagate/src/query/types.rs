//! Query DSL request types
//!
//! The clause tree is parsed explicitly from JSON rather than derived,
//! so unrecognized query kinds degrade to [`QueryClause::Unknown`]
//! instead of failing the whole request.

use serde::de::{Deserialize, Deserializer};
use serde_json::Value;

/// Root search request body
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SearchRequest {
    /// The query to execute (absent means match all)
    #[serde(default)]
    pub query: Option<QueryClause>,

    /// Starting offset (default 0). Passed through uninterpreted;
    /// negative or oversized values are the backend's problem.
    #[serde(default)]
    pub from: Option<i64>,

    /// Maximum number of results (default 10). Uninterpreted, like `from`.
    #[serde(default)]
    pub size: Option<i64>,
}

/// A single Query DSL clause, keyed by its query kind
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    MatchAll,
    Match { field: String, value: Value },
    MatchPhrase { field: String, value: Value },
    MultiMatch { query: String, fields: Vec<String> },
    Term { field: String, value: Value },
    Terms { field: String, values: Vec<Value> },
    Range { field: String, bounds: RangeBounds },
    Exists { field: String },
    Prefix { field: String, value: String },
    Wildcard { field: String, value: String },
    Bool(BoolClause),
    Ids { values: Vec<String> },
    QueryString { query: String, fields: Vec<String> },
    /// Anything we do not recognize; compiles to an always-true condition
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gte: Option<Value>,
    pub gt: Option<Value>,
    pub lte: Option<Value>,
    pub lt: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolClause {
    pub must: Vec<QueryClause>,
    pub filter: Vec<QueryClause>,
    pub should: Vec<QueryClause>,
    pub must_not: Vec<QueryClause>,
}

impl<'de> Deserialize<'de> for QueryClause {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(QueryClause::from_value(&value))
    }
}

impl QueryClause {
    /// Parse a clause from its JSON representation.
    ///
    /// Only the first key of the clause object is considered, mirroring
    /// how the Query DSL nests exactly one query kind per object.
    pub fn from_value(value: &Value) -> QueryClause {
        let Some(obj) = value.as_object() else {
            return QueryClause::Unknown;
        };
        let Some((kind, body)) = obj.iter().next() else {
            return QueryClause::Unknown;
        };

        match kind.as_str() {
            "match_all" => QueryClause::MatchAll,
            "match" => parse_field_value(body)
                .map(|(field, value)| QueryClause::Match {
                    field,
                    value: unwrap_param(value, "query"),
                })
                .unwrap_or(QueryClause::Unknown),
            "match_phrase" => parse_field_value(body)
                .map(|(field, value)| QueryClause::MatchPhrase {
                    field,
                    value: unwrap_param(value, "query"),
                })
                .unwrap_or(QueryClause::Unknown),
            "multi_match" => parse_multi_match(body),
            "term" => parse_field_value(body)
                .map(|(field, value)| QueryClause::Term {
                    field,
                    value: unwrap_param(value, "value"),
                })
                .unwrap_or(QueryClause::Unknown),
            "terms" => parse_terms(body),
            "range" => parse_range(body),
            "exists" => body
                .get("field")
                .and_then(Value::as_str)
                .map(|field| QueryClause::Exists {
                    field: field.to_string(),
                })
                .unwrap_or(QueryClause::Unknown),
            "prefix" => parse_pattern(body).map_or(QueryClause::Unknown, |(field, value)| {
                QueryClause::Prefix { field, value }
            }),
            "wildcard" => parse_pattern(body).map_or(QueryClause::Unknown, |(field, value)| {
                QueryClause::Wildcard { field, value }
            }),
            "bool" => QueryClause::Bool(parse_bool(body)),
            "ids" => parse_ids(body),
            "query_string" => parse_query_string(body),
            _ => QueryClause::Unknown,
        }
    }
}

/// Single field-keyed clause body: {"field": <value>}
fn parse_field_value(body: &Value) -> Option<(String, Value)> {
    let obj = body.as_object()?;
    let (field, value) = obj.iter().next()?;
    Some((field.clone(), value.clone()))
}

/// Unwrap parameterized form {"query": v} / {"value": v} to the bare value
fn unwrap_param(value: Value, key: &str) -> Value {
    if let Value::Object(obj) = &value {
        if let Some(inner) = obj.get(key) {
            return inner.clone();
        }
    }
    value
}

fn parse_multi_match(body: &Value) -> QueryClause {
    let Some(query) = body.get("query").and_then(Value::as_str) else {
        return QueryClause::Unknown;
    };
    let fields = string_list(body.get("fields"));
    QueryClause::MultiMatch {
        query: query.to_string(),
        fields,
    }
}

fn parse_terms(body: &Value) -> QueryClause {
    let Some(obj) = body.as_object() else {
        return QueryClause::Unknown;
    };
    let Some((field, values)) = obj.iter().next() else {
        return QueryClause::Unknown;
    };
    QueryClause::Terms {
        field: field.clone(),
        values: values.as_array().cloned().unwrap_or_default(),
    }
}

fn parse_range(body: &Value) -> QueryClause {
    let Some(obj) = body.as_object() else {
        return QueryClause::Unknown;
    };
    let Some((field, params)) = obj.iter().next() else {
        return QueryClause::Unknown;
    };
    let bounds = RangeBounds {
        gte: params.get("gte").cloned(),
        gt: params.get("gt").cloned(),
        lte: params.get("lte").cloned(),
        lt: params.get("lt").cloned(),
    };
    QueryClause::Range {
        field: field.clone(),
        bounds,
    }
}

/// Prefix/wildcard clause body: {"field": "pattern"} or {"field": {"value": "pattern"}}
fn parse_pattern(body: &Value) -> Option<(String, String)> {
    let (field, value) = parse_field_value(body)?;
    let pattern = match unwrap_param(value, "value") {
        Value::String(s) => s,
        _ => return None,
    };
    Some((field, pattern))
}

fn parse_bool(body: &Value) -> BoolClause {
    BoolClause {
        must: clause_group(body.get("must")),
        filter: clause_group(body.get("filter")),
        should: clause_group(body.get("should")),
        must_not: clause_group(body.get("must_not")),
    }
}

/// A bool group is either a single clause object or a list of them
fn clause_group(value: Option<&Value>) -> Vec<QueryClause> {
    match value {
        Some(Value::Array(items)) => items.iter().map(QueryClause::from_value).collect(),
        Some(v @ Value::Object(_)) => vec![QueryClause::from_value(v)],
        _ => vec![],
    }
}

fn parse_ids(body: &Value) -> QueryClause {
    QueryClause::Ids {
        values: body
            .get("values")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn parse_query_string(body: &Value) -> QueryClause {
    let Some(query) = body.get("query").and_then(Value::as_str) else {
        return QueryClause::Unknown;
    };
    QueryClause::QueryString {
        query: query.to_string(),
        fields: string_list(body.get("fields")),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
