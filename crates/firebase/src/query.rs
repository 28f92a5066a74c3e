//! Collection queries.
//!
//! Only the shapes the applications need: equality and array-contains
//! filters on top-level fields, ordering and a limit.

use std::cmp::Ordering;

use serde_json::{Value, json};

use crate::document::Fields;
use crate::value::encode_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    ArrayContains,
}

impl FilterOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::ArrayContains => "ARRAY_CONTAINS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

/// A query against a single collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    /// Every document in `collection`.
    #[must_use]
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op: FilterOp::Equal,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn where_array_contains(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push((field.into(), direction));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Firestore `StructuredQuery` body for `documents:runQuery`.
    #[must_use]
    pub fn to_structured_query(&self) -> Value {
        let mut query = serde_json::Map::new();
        query.insert(
            "from".to_string(),
            json!([{ "collectionId": self.collection }]),
        );

        let filters: Vec<Value> = self
            .filters
            .iter()
            .map(|filter| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": quote_field_path(&filter.field) },
                        "op": filter.op.as_str(),
                        "value": encode_value(&filter.value),
                    }
                })
            })
            .collect();
        match filters.len() {
            0 => {}
            1 => {
                if let Some(filter) = filters.into_iter().next() {
                    query.insert("where".to_string(), filter);
                }
            }
            _ => {
                query.insert(
                    "where".to_string(),
                    json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
                );
            }
        }

        if !self.order_by.is_empty() {
            let orders: Vec<Value> = self
                .order_by
                .iter()
                .map(|(field, direction)| {
                    json!({
                        "field": { "fieldPath": quote_field_path(field) },
                        "direction": direction.as_str(),
                    })
                })
                .collect();
            query.insert("orderBy".to_string(), Value::Array(orders));
        }

        if let Some(limit) = self.limit {
            query.insert("limit".to_string(), json!(limit));
        }

        Value::Object(query)
    }

    /// Whether a document's fields satisfy every filter.
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters.iter().all(|filter| {
            let Some(actual) = fields.get(&filter.field) else {
                return false;
            };
            match filter.op {
                FilterOp::Equal => values_equal(actual, &filter.value),
                FilterOp::ArrayContains => actual
                    .as_array()
                    .is_some_and(|items| items.iter().any(|item| values_equal(item, &filter.value))),
            }
        })
    }

    /// Order two documents by this query's `order_by` clauses.
    #[must_use]
    pub fn compare(&self, a: &Fields, b: &Fields) -> Ordering {
        for (field, direction) in &self.order_by {
            let ordering = compare_values(a.get(field), b.get(field));
            let ordering = match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Firestore treats `1` and `1.0` as equal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Firestore type order: null < bool < number < string < array < map.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Backtick-quote field names that are not simple identifiers.
fn quote_field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    #[test]
    fn test_structured_query_single_filter() {
        let query = Query::collection("products")
            .where_eq("categoryId", "lenses")
            .order_by("createdAt", Direction::Descending)
            .limit(5);

        assert_eq!(
            query.to_structured_query(),
            json!({
                "from": [{"collectionId": "products"}],
                "where": {"fieldFilter": {
                    "field": {"fieldPath": "categoryId"},
                    "op": "EQUAL",
                    "value": {"stringValue": "lenses"}
                }},
                "orderBy": [{"field": {"fieldPath": "createdAt"}, "direction": "DESCENDING"}],
                "limit": 5
            })
        );
    }

    #[test]
    fn test_structured_query_composite_filter() {
        let query = Query::collection("users")
            .where_eq("role", "admin")
            .where_array_contains("favorites", "fx3");
        let structured = query.to_structured_query();
        let filters = structured["where"]["compositeFilter"]["filters"]
            .as_array()
            .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1]["fieldFilter"]["op"], "ARRAY_CONTAINS");
    }

    #[test]
    fn test_matches() {
        let doc = fields(json!({"categoryId": "lenses", "order": 2, "tags": ["a", "b"]}));

        assert!(Query::collection("c").matches(&doc));
        assert!(Query::collection("c").where_eq("order", 2.0).matches(&doc));
        assert!(Query::collection("c").where_array_contains("tags", "b").matches(&doc));
        assert!(!Query::collection("c").where_eq("categoryId", "cameras").matches(&doc));
        assert!(!Query::collection("c").where_eq("missing", "x").matches(&doc));
    }

    #[test]
    fn test_compare_orders_missing_first() {
        let query = Query::collection("c").order_by("order", Direction::Ascending);
        let a = fields(json!({"order": 1}));
        let b = fields(json!({"order": 2}));
        let missing = fields(json!({}));
        assert_eq!(query.compare(&a, &b), Ordering::Less);
        assert_eq!(query.compare(&missing, &a), Ordering::Less);
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("createdAt"), "createdAt");
        assert_eq!(quote_field_path("pop-up"), "`pop-up`");
    }
}
