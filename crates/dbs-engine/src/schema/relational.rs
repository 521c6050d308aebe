use super::{Column, Constraint, ForeignKey, RelationalSchema, Table};
use std::collections::{BTreeMap, HashSet};

pub const FOREIGN_KEY: &str = "FOREIGN KEY";

/// One row of the catalog join: a column, optionally paired with a constraint it takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawColumnRow {
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub constraint_type: Option<String>,
    pub constraint_name: Option<String>,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
}

/// Groups catalog rows by table name (verbatim, case-sensitive) and folds each group.
///
/// Tables come out sorted by name.
pub fn normalize(rows: Vec<RawColumnRow>) -> RelationalSchema {
    let mut grouped: BTreeMap<String, Vec<RawColumnRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.table.clone()).or_default().push(row);
    }

    let tables = grouped
        .into_iter()
        .map(|(name, rows)| fold_table(name, rows))
        .collect();

    RelationalSchema { tables }
}

fn fold_table(name: String, rows: Vec<RawColumnRow>) -> Table {
    let mut columns: Vec<Column> = Vec::new();
    let mut seen_columns = HashSet::new();
    let mut foreign_keys = Vec::new();
    let mut constraints = Vec::new();
    let mut seen_constraints = HashSet::new();

    for row in rows {
        // First occurrence wins for column metadata.
        if seen_columns.insert(row.column.clone()) {
            columns.push(Column {
                name: row.column.clone(),
                data_type: row.data_type,
                nullable: row.nullable,
                default_value: row.default_value,
            });
        }

        let Some(constraint_type) = row.constraint_type else {
            continue;
        };

        if constraint_type == FOREIGN_KEY {
            foreign_keys.push(ForeignKey {
                column_name: row.column,
                referenced_table: row.foreign_table,
                referenced_column: row.foreign_column,
            });
        } else {
            let key = (
                row.column.clone(),
                constraint_type.clone(),
                row.constraint_name.clone(),
            );
            if seen_constraints.insert(key) {
                constraints.push(Constraint {
                    column_name: row.column,
                    constraint_type,
                    expression: row.constraint_name,
                });
            }
        }
    }

    Table {
        name,
        columns,
        foreign_keys,
        constraints,
    }
}
