use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Row, SqlType};

/// Column metadata: label, declared type and nullability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl Column {
    /// Creates a non-nullable column with the given label and type
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self { name: name.into(), sql_type, nullable: false }
    }

    /// Returns a copy with the nullability replaced
    pub fn with_nullable(&self, nullable: bool) -> Self {
        Self { nullable, ..self.clone() }
    }
}

/// An ordered list of rows under a fixed column schema
///
/// Every row holds exactly one cell per column. A cycling list lets a
/// cursor wrap from the last row back to the first instead of falling
/// off the end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowList {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub cycling: bool,
}

impl RowList {
    /// Creates an empty list over the given columns
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new(), cycling: false }
    }

    /// Creates an empty list from (label, type) pairs
    pub fn with_columns(columns: &[(&str, SqlType)]) -> Self {
        Self::new(
            columns
                .iter()
                .map(|(name, sql_type)| Column::new(*name, *sql_type))
                .collect(),
        )
    }

    /// Appends a row, enforcing the cell count invariant
    pub fn append(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Usage(format!(
                "Expected {} cells, got {}",
                self.columns.len(),
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a row, returning the updated list
    pub fn with_row(mut self, row: Row) -> Result<Self> {
        self.append(row)?;
        Ok(self)
    }

    /// Returns a copy with the column label at `index` (1-based) replaced
    pub fn with_label(&self, index: usize, name: impl Into<String>) -> Result<Self> {
        let mut copy = self.clone();
        let column = copy.column_mut(index)?;
        column.name = name.into();
        Ok(copy)
    }

    /// Returns a copy with the nullability of column `index` (1-based)
    /// replaced
    pub fn with_nullable(&self, index: usize, nullable: bool) -> Result<Self> {
        let mut copy = self.clone();
        let column = copy.column_mut(index)?;
        column.nullable = nullable;
        Ok(copy)
    }

    /// Returns a copy with the cycling flag replaced
    pub fn with_cycling(&self, cycling: bool) -> Self {
        Self { cycling, ..self.clone() }
    }

    /// Returns a copy truncated to at most `max_rows` rows
    ///
    /// A non-positive limit keeps every row.
    pub fn sub_list(&self, max_rows: i64) -> Self {
        if max_rows <= 0 || self.rows.len() as i64 <= max_rows {
            return self.clone();
        }
        Self {
            columns: self.columns.clone(),
            rows: self.rows[..max_rows as usize].to_vec(),
            cycling: self.cycling,
        }
    }

    /// Restricts the list to the named columns, preserving order,
    /// labels and nullability
    pub fn projection(&self, labels: &[&str]) -> Result<Self> {
        let indexes = labels
            .iter()
            .map(|label| self.find_column(label))
            .collect::<Result<Vec<_>>>()?;
        self.projection_by_index(&indexes)
    }

    /// Restricts the list to the given 1-based column indexes
    pub fn projection_by_index(&self, indexes: &[usize]) -> Result<Self> {
        let mut columns = Vec::with_capacity(indexes.len());
        for &index in indexes {
            if index == 0 || index > self.columns.len() {
                return Err(Error::Usage(format!("Invalid column index: {}", index)));
            }
            columns.push(self.columns[index - 1].clone());
        }
        let rows = self
            .rows
            .iter()
            .map(|row| indexes.iter().map(|&i| row[i - 1].clone()).collect())
            .collect();
        Ok(Self { columns, rows, cycling: self.cycling })
    }

    /// Resolves a column label to its 1-based index
    pub fn find_column(&self, label: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(label))
            .map(|i| i + 1)
            .ok_or_else(|| Error::Usage(format!("Invalid column label {}", label)))
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the list holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_mut(&mut self, index: usize) -> Result<&mut Column> {
        let len = self.columns.len();
        if index == 0 || index > len {
            return Err(Error::Usage(format!("Invalid column index: {}", index)));
        }
        Ok(&mut self.columns[index - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn sample() -> Result<RowList> {
        RowList::with_columns(&[("id", SqlType::Integer), ("name", SqlType::VarChar)])
            .with_row(vec![Value::Integer(1), Value::String("one".into())])?
            .with_row(vec![Value::Integer(2), Value::String("two".into())])?
            .with_row(vec![Value::Integer(3), Value::String("three".into())])
    }

    #[test]
    fn append_checks_arity() -> Result<()> {
        let mut list = RowList::with_columns(&[("id", SqlType::Integer)]);
        list.append(vec![Value::Integer(1)])?;
        let err = list
            .append(vec![Value::Integer(2), Value::Null])
            .unwrap_err();
        assert_eq!(err.to_string(), "Expected 1 cells, got 2");
        Ok(())
    }

    #[test]
    fn label_and_nullability_builders() -> Result<()> {
        let list = sample()?
            .with_label(2, "title")?
            .with_nullable(2, true)?;
        assert_eq!(list.columns[1].name, "title");
        assert!(list.columns[1].nullable);
        assert!(!list.columns[0].nullable);
        assert_eq!(
            sample()?.with_label(3, "x").unwrap_err().to_string(),
            "Invalid column index: 3"
        );
        Ok(())
    }

    #[test]
    fn find_column_is_case_insensitive() -> Result<()> {
        let list = sample()?;
        assert_eq!(list.find_column("NAME")?, 2);
        assert_eq!(
            list.find_column("missing").unwrap_err().to_string(),
            "Invalid column label missing"
        );
        Ok(())
    }

    #[test]
    fn sub_list_truncates() -> Result<()> {
        let list = sample()?;
        assert_eq!(list.sub_list(2).len(), 2);
        assert_eq!(list.sub_list(0).len(), 3);
        assert_eq!(list.sub_list(-1).len(), 3);
        assert_eq!(list.sub_list(10).len(), 3);
        Ok(())
    }

    #[test]
    fn projection_preserves_metadata() -> Result<()> {
        let list = sample()?.with_nullable(2, true)?;
        let projected = list.projection(&["name"])?;
        assert_eq!(projected.columns.len(), 1);
        assert_eq!(projected.columns[0].name, "name");
        assert!(projected.columns[0].nullable);
        assert_eq!(projected.rows[0], vec![Value::String("one".into())]);
        assert_eq!(
            list.projection(&["nope"]).unwrap_err().to_string(),
            "Invalid column label nope"
        );
        Ok(())
    }
}
