//! Read/write classification of raw query text.
//!
//! This is a keyword heuristic, not a parser: the whole text (newlines included) is
//! scanned for whole-word, case-insensitive write keywords. A read query that mentions
//! a write keyword inside a string literal or a comment is classified as a write.

use once_cell::sync::Lazy;
use regex::Regex;

static CYPHER_WRITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\b(CREATE|MERGE|SET|DELETE|REMOVE|DROP|LOAD CSV|CALL.*apoc\..*create)\b")
        .expect("cypher write pattern is valid")
});

// DROP, ALTER and TRUNCATE are not in the vocabulary and classify as reads.
static SQL_WRITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\b(INSERT|UPDATE|DELETE|CREATE)\b").expect("sql write pattern is valid")
});

/// Query language of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Cypher,
    Sql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Read,
    Write,
}

impl Dialect {
    pub fn classify(self, text: &str) -> QueryKind {
        let pattern = match self {
            Dialect::Cypher => &*CYPHER_WRITE,
            Dialect::Sql => &*SQL_WRITE,
        };
        if pattern.is_match(text) {
            QueryKind::Write
        } else {
            QueryKind::Read
        }
    }
}

pub fn classify(dialect: Dialect, text: &str) -> QueryKind {
    dialect.classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_read_in_any_case() {
        for q in ["select * from t", "SELECT * FROM t", "SeLeCt * FROM t"] {
            assert_eq!(classify(Dialect::Sql, q), QueryKind::Read, "{q}");
        }
    }

    #[test]
    fn test_sql_write_keywords() {
        for q in [
            "INSERT INTO t VALUES (1)",
            "update t set a = 1",
            "DELETE FROM t",
            "create table t (id int)",
            "WITH x AS (SELECT 1)\nINSERT INTO t SELECT * FROM x",
        ] {
            assert_eq!(classify(Dialect::Sql, q), QueryKind::Write, "{q}");
        }
    }

    #[test]
    fn test_sql_whole_word_only() {
        assert_eq!(
            classify(Dialect::Sql, "SELECT created_at, updated_by FROM inserts"),
            QueryKind::Read
        );
    }

    #[test]
    fn test_sql_vocabulary_is_fixed() {
        assert_eq!(classify(Dialect::Sql, "DROP TABLE t"), QueryKind::Read);
    }

    #[test]
    fn test_literal_mentions_are_false_positives() {
        assert_eq!(
            classify(Dialect::Sql, "SELECT 'please delete me' AS note"),
            QueryKind::Write
        );
    }

    #[test]
    fn test_cypher_reads() {
        for q in [
            "MATCH (n) RETURN n LIMIT 10",
            "match (n:Person) where n.created > 1 return n.offset",
            "CALL db.labels()",
        ] {
            assert_eq!(classify(Dialect::Cypher, q), QueryKind::Read, "{q}");
        }
    }

    #[test]
    fn test_cypher_writes() {
        for q in [
            "CREATE (n:Person {name: 'a'})",
            "MATCH (n) DETACH DELETE n",
            "MATCH (n) set n.x = 1",
            "MERGE (a:A)",
            "MATCH (n) REMOVE n.x",
            "DROP INDEX idx",
            "LOAD CSV FROM 'file:///x.csv' AS row RETURN row",
            "CALL apoc.create.node(['Person'], {})",
            "MATCH (n)\nCALL\napoc.nodes.create(n)",
        ] {
            assert_eq!(classify(Dialect::Cypher, q), QueryKind::Write, "{q}");
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let q = "MATCH (n) RETURN n";
        assert_eq!(classify(Dialect::Cypher, q), classify(Dialect::Cypher, q));
    }
}
