//! In-memory query backend over JSON rows.
//!
//! Rows are JSON objects. A relation is a nested object (to-one) or an array
//! of objects (to-many) stored under the relation name. Matching follows SQL
//! semantics: `NULL` never equals anything and `LIKE` understands `%`, `_`,
//! and `\` escapes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::predicate::{Filter, Predicate};
use crate::result::FilterResult;
use crate::traits::query::{ConditionSink, Materialize, QueryContext};
use crate::types::key::RelationPath;
use crate::types::value::Scalar;

/// A deferred query over a shared set of rows.
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    rows: Arc<Vec<Value>>,
    filter: Filter,
    case_insensitive: bool,
}

impl MemoryQuery {
    /// Create a query over owned rows.
    pub fn new(rows: Vec<Value>) -> Self {
        Self::from_shared(Arc::new(rows))
    }

    /// Create a query over rows shared with other queries.
    pub fn from_shared(rows: Arc<Vec<Value>>) -> Self {
        Self {
            rows,
            filter: Filter::new(),
            case_insensitive: false,
        }
    }

    /// Match patterns case-insensitively.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// The constraints collected so far.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Whether `row` satisfies every constraint.
    pub fn matches(&self, row: &Value) -> bool {
        self.filter
            .predicates()
            .iter()
            .all(|predicate| self.eval(row, predicate))
    }

    fn eval(&self, row: &Value, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Eq { column, value } => {
                field_text(row, column).is_some_and(|text| text == value.to_text())
            }
            Predicate::IsNull { column } => row.get(column).is_none_or(Value::is_null),
            Predicate::In { column, values } => field_text(row, column)
                .is_some_and(|text| values.iter().any(|v| text == v.to_text())),
            Predicate::Like { column, pattern } => field_text(row, column)
                .is_some_and(|text| like_match(pattern, &text, self.case_insensitive)),
            Predicate::AnyLike { column, patterns } => {
                field_text(row, column).is_some_and(|text| {
                    patterns
                        .iter()
                        .any(|pattern| like_match(pattern, &text, self.case_insensitive))
                })
            }
            Predicate::Exists {
                relation,
                conditions,
            } => related(row, relation.segments())
                .into_iter()
                .any(|child| conditions.iter().all(|c| self.eval(child, c))),
            Predicate::NotExists { relation } => related(row, relation.segments()).is_empty(),
        }
    }

    fn map_filter(mut self, f: impl FnOnce(Filter) -> Filter) -> Self {
        self.filter = f(self.filter);
        self
    }
}

impl ConditionSink for MemoryQuery {
    fn where_eq(self, column: &str, value: Scalar) -> Self {
        self.map_filter(|f| f.where_eq(column, value))
    }

    fn where_null(self, column: &str) -> Self {
        self.map_filter(|f| f.where_null(column))
    }

    fn where_in(self, column: &str, values: Vec<Scalar>) -> Self {
        self.map_filter(|f| f.where_in(column, values))
    }

    fn where_like(self, column: &str, pattern: String) -> Self {
        self.map_filter(|f| f.where_like(column, pattern))
    }

    fn where_any_like(self, column: &str, patterns: Vec<String>) -> Self {
        self.map_filter(|f| f.where_any_like(column, patterns))
    }
}

impl QueryContext for MemoryQuery {
    type Scope = Filter;

    fn where_exists<F>(self, relation: &RelationPath, scope: F) -> Self
    where
        F: FnOnce(Self::Scope) -> Self::Scope,
    {
        self.map_filter(|f| f.where_exists(relation, scope))
    }

    fn where_not_exists(self, relation: &RelationPath) -> Self {
        self.map_filter(|f| f.where_not_exists(relation))
    }
}

#[async_trait]
impl Materialize for MemoryQuery {
    type Output = Vec<Value>;

    async fn fetch_all(self) -> FilterResult<Self::Output> {
        Ok(self
            .rows
            .iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect())
    }
}

/// Text form of a scalar field, `None` for null, missing, or structured values.
fn field_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Rows reached from `row` by following `path`.
fn related<'r>(row: &'r Value, path: &[String]) -> Vec<&'r Value> {
    let Some((head, rest)) = path.split_first() else {
        return vec![row];
    };

    let children: Vec<&Value> = match row.get(head) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(child @ Value::Object(_)) => vec![child],
        _ => Vec::new(),
    };

    children
        .into_iter()
        .flat_map(|child| related(child, rest))
        .collect()
}

enum Token {
    Many,
    One,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            '%' => Token::Many,
            '_' => Token::One,
            c => Token::Literal(c),
        });
    }
    tokens
}

/// SQL `LIKE` matching.
pub fn like_match(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let (pattern, text) = if case_insensitive {
        (pattern.to_lowercase(), text.to_lowercase())
    } else {
        (pattern.to_string(), text.to_string())
    };

    let tokens = tokenize(&pattern);
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Last `%` seen and the text position it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::One) => {
                p += 1;
                t += 1;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            Some(Token::Many) => {
                backtrack = Some((p, t));
                p += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    p = star + 1;
                    t = absorbed + 1;
                    backtrack = Some((star, absorbed + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|token| matches!(token, Token::Many))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({
                "id": 1, "name": "Cats", "status": "draft",
                "comments": [{"body": "hi", "author": {"name": "Joan"}}]
            }),
            json!({
                "id": 2, "name": "Dogs", "status": "live",
                "comments": [{"body": "yo", "author": {"name": "Mark"}}]
            }),
            json!({"id": 3, "name": null, "status": "live", "comments": []}),
        ]
    }

    fn ids(rows: &[Value]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[test]
    fn test_like_match() {
        assert!(like_match("%at%", "Cats", false));
        assert!(like_match("C_ts", "Cats", false));
        assert!(like_match("c%", "Cats", true));
        assert!(!like_match("c%", "Cats", false));
        assert!(like_match("%s", "Cats", false));
        assert!(!like_match("%x%", "Cats", false));
        assert!(like_match("100\\%", "100%", false));
        assert!(!like_match("100\\%", "1000", false));
        assert!(like_match("%%", "", false));
        assert!(like_match("a%b%c", "aXbYbc", false));
    }

    #[tokio::test]
    async fn test_fetch_with_column_predicates() {
        let result = MemoryQuery::new(rows())
            .where_in("status", vec![Scalar::from("live")])
            .where_like("name", "%og%".to_string())
            .fetch_all()
            .await
            .unwrap();
        assert_eq!(ids(&result), [2]);
    }

    #[tokio::test]
    async fn test_null_semantics() {
        let result = MemoryQuery::new(rows())
            .where_null("name")
            .fetch_all()
            .await
            .unwrap();
        assert_eq!(ids(&result), [3]);

        let result = MemoryQuery::new(rows())
            .where_like("name", "%%".to_string())
            .fetch_all()
            .await
            .unwrap();
        assert_eq!(ids(&result), [1, 2]);
    }

    #[tokio::test]
    async fn test_exists_scopes_to_relation() {
        let path = RelationPath::new(["comments", "author"]);
        let result = MemoryQuery::new(rows())
            .where_exists(&path, |q| q.where_like("name", "%jo%".to_string()))
            .case_insensitive(true)
            .fetch_all()
            .await
            .unwrap();
        assert_eq!(ids(&result), [1]);

        let result = MemoryQuery::new(rows())
            .where_not_exists(&RelationPath::new(["comments"]))
            .fetch_all()
            .await
            .unwrap();
        assert_eq!(ids(&result), [3]);
    }

    #[tokio::test]
    async fn test_empty_in_matches_nothing() {
        let result = MemoryQuery::new(rows())
            .where_in("status", Vec::new())
            .fetch_all()
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
