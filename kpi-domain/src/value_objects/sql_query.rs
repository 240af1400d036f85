// SQL query value object
//
// Only single read-only SELECT statements are representable.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;

pub const MAX_QUERY_LENGTH: usize = 4000;
pub const HIGH_COMPLEXITY_SCORE: u32 = 10;

static SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SELECT\b").expect("select pattern"));

static DANGEROUS_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(DROP|DELETE|INSERT|UPDATE|ALTER|CREATE|TRUNCATE|EXEC|EXECUTE)\b")
        .expect("dangerous keyword pattern")
});

static DANGEROUS_PROCEDURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(SP|XP)_\w+").expect("procedure pattern"));

static TABLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:FROM|JOIN)\s+([A-Za-z_\[\]"][\w.\[\]"]*)"#).expect("table pattern")
});

static JOIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bJOIN\b").expect("join pattern"));

static SUBQUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*SELECT\b").expect("subquery pattern"));

static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(WHERE|GROUP\s+BY|ORDER\s+BY|HAVING)\b").expect("clause pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlQuery(String);

impl SqlQuery {
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let query = raw.trim();
        if !SELECT_RE.is_match(query) {
            return Err(invalid("only SELECT statements are allowed"));
        }
        if let Some(found) = DANGEROUS_KEYWORD_RE.find(query) {
            return Err(invalid(format!(
                "forbidden keyword '{}'",
                found.as_str().to_uppercase()
            )));
        }
        if let Some(found) = DANGEROUS_PROCEDURE_RE.find(query) {
            return Err(invalid(format!("forbidden procedure call '{}'", found.as_str())));
        }
        if query.chars().count() > MAX_QUERY_LENGTH {
            return Err(invalid(format!(
                "query exceeds {} characters",
                MAX_QUERY_LENGTH
            )));
        }
        if query.contains("--") || query.contains("/*") || query.contains("*/") {
            return Err(invalid("comments are not allowed"));
        }
        let terminators = query.matches(';').count();
        if terminators > 1 || (terminators == 1 && !query.ends_with(';')) {
            return Err(invalid("multiple statements are not allowed"));
        }
        Ok(Self(query.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Distinct upper-cased `FROM`/`JOIN` targets in order of appearance.
    pub fn table_references(&self) -> Vec<String> {
        let mut tables: Vec<String> = Vec::new();
        for captures in TABLE_REF_RE.captures_iter(&self.0) {
            let Some(name) = captures.get(1) else {
                continue;
            };
            let name = name
                .as_str()
                .trim_matches(|ch| matches!(ch, '[' | ']' | '"'))
                .to_uppercase();
            if !name.is_empty() && !tables.contains(&name) {
                tables.push(name);
            }
        }
        tables
    }

    pub fn complexity_score(&self) -> u32 {
        let joins = JOIN_RE.find_iter(&self.0).count() as u32;
        let subqueries = SUBQUERY_RE.find_iter(&self.0).count() as u32;
        let clauses = CLAUSE_RE.find_iter(&self.0).count() as u32;
        1 + joins * 2 + subqueries + clauses
    }

    pub fn is_high_complexity(&self) -> bool {
        self.complexity_score() > HIGH_COMPLEXITY_SCORE
    }
}

impl TryFrom<String> for SqlQuery {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SqlQuery> for String {
    fn from(query: SqlQuery) -> Self {
        query.0
    }
}

impl std::fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn invalid(reason: impl Into<String>) -> ValueObjectError {
    ValueObjectError::InvalidSqlQuery(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_select() {
        let query = SqlQuery::new("SELECT * FROM T").unwrap();
        assert_eq!(query.table_references(), vec!["T".to_string()]);
        assert_eq!(query.complexity_score(), 1);
        assert!(SqlQuery::new("select count(*) from orders;").is_ok());
    }

    #[test]
    fn rejects_stacked_statements() {
        let err = SqlQuery::new("SELECT * FROM T; DROP TABLE T;").expect_err("stacked");
        assert_eq!(err, ValueObjectError::InvalidSqlQuery("forbidden keyword 'DROP'".to_string()));
        assert!(SqlQuery::new("SELECT 1; SELECT 2").is_err());
        assert!(SqlQuery::new("SELECT 1;;").is_err());
    }

    #[test]
    fn rejects_non_select_and_comments() {
        assert!(SqlQuery::new("UPDATE t SET a = 1").is_err());
        assert!(SqlQuery::new("WITH x AS (SELECT 1) SELECT * FROM x").is_err());
        assert!(SqlQuery::new("SELECT * FROM t -- trailing").is_err());
        assert!(SqlQuery::new("SELECT /* hint */ * FROM t").is_err());
        assert!(SqlQuery::new("SELECT * FROM t WHERE name = xp_cmdshell").is_err());
        let long = format!("SELECT {} FROM t", "a,".repeat(MAX_QUERY_LENGTH));
        assert!(SqlQuery::new(&long).is_err());
    }

    #[test]
    fn keyword_check_matches_whole_words_only() {
        let query = SqlQuery::new("SELECT updated_at, created_by FROM audit_log").unwrap();
        assert_eq!(query.table_references(), vec!["AUDIT_LOG".to_string()]);
    }

    #[test]
    fn scores_complexity() {
        let query = SqlQuery::new(
            "SELECT o.region, SUM(o.total) FROM orders o \
             JOIN customers c ON c.id = o.customer_id \
             LEFT JOIN regions r ON r.id = c.region_id \
             WHERE o.id IN (SELECT order_id FROM refunds) \
             GROUP BY o.region HAVING SUM(o.total) > 0 ORDER BY o.region",
        )
        .unwrap();
        // 1 + 2 joins * 2 + 1 subquery + where, group by, having, order by
        assert_eq!(query.complexity_score(), 10);
        assert!(!query.is_high_complexity());
        assert_eq!(
            query.table_references(),
            vec!["ORDERS", "CUSTOMERS", "REGIONS", "REFUNDS"]
        );
    }
}
