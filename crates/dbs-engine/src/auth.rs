use crate::classifier::{Dialect, QueryKind};
use crate::config::AccessMode;
use crate::error::DbsError;

/// The two caller-facing query operations, gated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Read,
    Write,
}

/// Access policy gate. Every check runs before any I/O is issued.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    mode: AccessMode,
}

impl AccessPolicy {
    pub fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Whether the query tool for `entry` is listed in the tool catalog.
    pub fn is_visible(&self, entry: EntryPoint) -> bool {
        match entry {
            EntryPoint::Read => self.mode.read_enabled,
            EntryPoint::Write => self.mode.write_enabled,
        }
    }

    /// Classifies `text` and decides whether `entry` may execute it.
    pub fn authorize(
        &self,
        entry: EntryPoint,
        dialect: Dialect,
        text: &str,
    ) -> Result<QueryKind, DbsError> {
        match entry {
            EntryPoint::Read => {
                if !self.mode.read_enabled {
                    return Err(DbsError::read_disabled());
                }
                let kind = dialect.classify(text);
                if kind == QueryKind::Write {
                    return Err(DbsError::write_on_read_entry_point());
                }
                Ok(kind)
            }
            EntryPoint::Write => {
                if !self.mode.write_enabled {
                    return Err(DbsError::write_disabled());
                }
                // The write entry point may run reads, but only when reads are enabled.
                let kind = dialect.classify(text);
                if kind == QueryKind::Read && !self.mode.read_enabled {
                    return Err(DbsError::read_disabled());
                }
                Ok(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Verdict {
        Accept,
        Config,
        Policy,
    }

    fn verdict(result: Result<QueryKind, DbsError>) -> Verdict {
        match result {
            Ok(_) => Verdict::Accept,
            Err(DbsError::Configuration(_)) => Verdict::Config,
            Err(DbsError::PolicyViolation(_)) => Verdict::Policy,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_gate_decision_table() {
        use Verdict::*;
        let read_q = "SELECT 1";
        let write_q = "DELETE FROM t";
        // (read, write, entry, query, expected)
        let table = [
            (true, true, EntryPoint::Read, read_q, Accept),
            (true, true, EntryPoint::Read, write_q, Policy),
            (true, true, EntryPoint::Write, read_q, Accept),
            (true, true, EntryPoint::Write, write_q, Accept),
            (true, false, EntryPoint::Read, read_q, Accept),
            (true, false, EntryPoint::Read, write_q, Policy),
            (true, false, EntryPoint::Write, read_q, Config),
            (true, false, EntryPoint::Write, write_q, Config),
            (false, true, EntryPoint::Read, read_q, Config),
            (false, true, EntryPoint::Read, write_q, Config),
            (false, true, EntryPoint::Write, read_q, Config),
            (false, true, EntryPoint::Write, write_q, Accept),
            (false, false, EntryPoint::Read, read_q, Config),
            (false, false, EntryPoint::Read, write_q, Config),
            (false, false, EntryPoint::Write, read_q, Config),
            (false, false, EntryPoint::Write, write_q, Config),
        ];

        for (read, write, entry, query, expected) in table {
            let policy = AccessPolicy::new(AccessMode::new(read, write));
            let got = verdict(policy.authorize(entry, Dialect::Sql, query));
            assert_eq!(
                got, expected,
                "read={read} write={write} entry={entry:?} query={query}"
            );
        }
    }

    #[test]
    fn test_read_entry_ignores_write_flag() {
        let policy = AccessPolicy::new(AccessMode::new(true, true));
        let err = policy
            .authorize(EntryPoint::Read, Dialect::Cypher, "CREATE (n)")
            .unwrap_err();
        assert!(err.to_string().contains("only supports read queries"));
    }

    #[test]
    fn test_visibility_mirrors_flags() {
        let policy = AccessPolicy::new(AccessMode::new(false, true));
        assert!(!policy.is_visible(EntryPoint::Read));
        assert!(policy.is_visible(EntryPoint::Write));
        let policy = AccessPolicy::default();
        assert!(policy.is_visible(EntryPoint::Read));
        assert!(!policy.is_visible(EntryPoint::Write));
    }
}
