use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::handler::Warning;
use crate::rows::{Column, RowList};
use crate::statement::StatementId;
use crate::types::Value;

/// Requested row fetch direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchDirection {
    #[default]
    Forward,
    Reverse,
    Unknown,
}

/// Addresses a column by 1-based index or by label
pub trait ColumnRef {
    fn resolve(&self, rows: &RowList) -> Result<usize>;
}

impl ColumnRef for usize {
    fn resolve(&self, rows: &RowList) -> Result<usize> {
        if *self == 0 || *self > rows.columns.len() {
            return Err(Error::Usage(format!("Invalid column index: {}", self)));
        }
        Ok(*self)
    }
}

impl ColumnRef for &str {
    fn resolve(&self, rows: &RowList) -> Result<usize> {
        rows.find_column(self)
    }
}

/// A navigable view over a row list
///
/// Position 0 is before the first row and `n + 1` is after the last.
/// The fetch size is the effective row count: shrinking it hides the
/// tail of the list from navigation.
/// A scrollable cursor moves in both directions; a forward-only cursor
/// rejects every backward move. When the underlying list is cycling,
/// running off the end wraps back to row 1 instead.
#[derive(Debug, Clone)]
pub struct Cursor {
    rows: RowList,
    row: usize,
    fetch_size: usize,
    direction: FetchDirection,
    scrollable: bool,
    closed: bool,
    warning: Option<Warning>,
    statement: Option<StatementId>,
    last_null: bool,
}

impl Cursor {
    /// A scrollable cursor positioned before the first row
    pub fn new(rows: RowList) -> Self {
        let fetch_size = rows.len();
        Self {
            rows,
            row: 0,
            fetch_size,
            direction: FetchDirection::Forward,
            scrollable: true,
            closed: false,
            warning: None,
            statement: None,
            last_null: false,
        }
    }

    /// A forward-only cursor positioned before the first row
    pub fn forward_only(rows: RowList) -> Self {
        Self { scrollable: false, ..Self::new(rows) }
    }

    /// Attaches the id of the statement that produced this cursor
    pub fn with_statement(mut self, id: StatementId) -> Self {
        self.statement = Some(id);
        self
    }

    /// Attaches a warning to report through `warning()`
    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warning = Some(warning);
        self
    }

    /// Starts the cursor on row 1 when the list is non-empty
    pub fn on_first_row(mut self) -> Self {
        if !self.rows.is_empty() {
            self.row = 1;
        }
        self
    }

    /// Restricts the cursor to the named columns, keeping position and
    /// navigation mode
    pub fn with_projection(&self, labels: &[&str]) -> Result<Self> {
        Ok(Self { rows: self.rows.projection(labels)?, ..self.clone() })
    }

    pub fn columns(&self) -> &[Column] {
        &self.rows.columns
    }

    pub fn column_count(&self) -> usize {
        self.rows.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn statement_id(&self) -> Option<StatementId> {
        self.statement
    }

    pub fn warning(&self) -> Option<&Warning> {
        self.warning.as_ref()
    }

    pub fn clear_warning(&mut self) {
        self.warning = None;
    }

    pub fn is_scrollable(&self) -> bool {
        self.scrollable
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Releases the cursor; closing twice is a no-op
    pub fn close(&mut self) {
        self.closed = true;
    }

    // ---- navigation ----

    /// Moves to the next row; wraps to row 1 when cycling
    pub fn next(&mut self) -> Result<bool> {
        self.check_open()?;
        if self.rows.is_empty() {
            return Ok(false);
        }
        if self.row < self.limit() {
            self.row += 1;
            Ok(true)
        } else if self.rows.cycling {
            self.row = 1;
            Ok(true)
        } else {
            self.row = self.limit() + 1;
            Ok(false)
        }
    }

    /// Moves to the previous row, stopping before the first
    pub fn previous(&mut self) -> Result<bool> {
        self.check_open()?;
        if !self.scrollable {
            return Err(Error::State("Backward move".into()));
        }
        if self.rows.is_empty() {
            return Ok(false);
        }
        if self.row > 1 {
            self.row -= 1;
            Ok(true)
        } else {
            self.row = 0;
            Ok(false)
        }
    }

    /// Moves to the given row; negative numbers count from the end
    pub fn absolute(&mut self, n: i64) -> Result<bool> {
        self.check_open()?;
        let len = self.limit() as i64;
        let target = if n < 0 { len + 1 + n } else { n };
        if !self.scrollable && target < self.row as i64 {
            return Err(Error::State("Backward move on forward-only cursor".into()));
        }
        if target <= 0 {
            self.row = 0;
            // only the explicit absolute(0) reports success here
            return Ok(n == 0);
        }
        if target > len {
            if self.rows.cycling && len > 0 {
                self.row = 1;
                return Ok(true);
            }
            self.row = len as usize + 1;
            return Ok(false);
        }
        self.row = target as usize;
        Ok(true)
    }

    /// Moves relative to the current position
    pub fn relative(&mut self, n: i64) -> Result<bool> {
        self.check_open()?;
        if n == 0 {
            return Ok(true);
        }
        if n < 0 && !self.scrollable {
            return Err(Error::State("Backward move".into()));
        }
        self.absolute(self.row as i64 + n)
    }

    /// Moves to the first row
    pub fn first(&mut self) -> Result<bool> {
        self.absolute(1)
    }

    /// Moves to the last row
    pub fn last(&mut self) -> Result<bool> {
        self.absolute(-1)
    }

    /// Positions before the first row
    pub fn before_first(&mut self) -> Result<()> {
        self.check_open()?;
        self.check_scrollable()?;
        self.row = 0;
        Ok(())
    }

    /// Positions after the last row
    pub fn after_last(&mut self) -> Result<()> {
        self.check_open()?;
        self.check_scrollable()?;
        self.row = self.limit() + 1;
        Ok(())
    }

    pub fn is_before_first(&self) -> bool {
        self.row == 0 && !self.rows.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.row == 1
    }

    pub fn is_last(&self) -> bool {
        !self.rows.is_empty() && self.row == self.limit()
    }

    pub fn is_after_last(&self) -> bool {
        !self.rows.is_empty() && self.row == self.limit() + 1
    }

    /// Current row number, 0 when not positioned on a row
    pub fn get_row(&self) -> usize {
        if self.row >= 1 && self.row <= self.limit() {
            self.row
        } else {
            0
        }
    }

    pub fn fetch_direction(&self) -> FetchDirection {
        self.direction
    }

    /// Forward is always accepted; anything else needs a scrollable
    /// cursor
    pub fn set_fetch_direction(&mut self, direction: FetchDirection) -> Result<()> {
        self.check_open()?;
        if direction != FetchDirection::Forward {
            self.check_scrollable()?;
        }
        self.direction = direction;
        Ok(())
    }

    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Zero means the full row count; a size beyond the row count is
    /// ignored
    pub fn set_fetch_size(&mut self, size: usize) -> Result<()> {
        self.check_open()?;
        if size == 0 {
            self.fetch_size = self.rows.len();
        } else if size <= self.rows.len() {
            self.fetch_size = size;
        }
        Ok(())
    }

    // ---- typed accessors ----

    /// The raw cell value at the given column
    pub fn get_value(&mut self, col: impl ColumnRef) -> Result<Value> {
        let value = self.cell(col)?.clone();
        self.last_null = value.is_null();
        Ok(value)
    }

    /// Any non-null value rendered as text
    pub fn get_string(&mut self, col: impl ColumnRef) -> Result<Option<String>> {
        Ok(match self.get_value(col)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    /// Null is false; non-boolean values are true unless they render
    /// starting with '0'
    pub fn get_bool(&mut self, col: impl ColumnRef) -> Result<bool> {
        Ok(match self.get_value(col)? {
            Value::Null => false,
            Value::Boolean(b) => b,
            other => !other.to_string().starts_with('0'),
        })
    }

    /// Numeric cell narrowed to i8; null and non-numeric read as 0
    pub fn get_i8(&mut self, col: impl ColumnRef) -> Result<i8> {
        Ok(self.get_value(col)?.as_i64().unwrap_or(0) as i8)
    }

    /// Numeric cell narrowed to i16; null and non-numeric read as 0
    pub fn get_i16(&mut self, col: impl ColumnRef) -> Result<i16> {
        Ok(self.get_value(col)?.as_i64().unwrap_or(0) as i16)
    }

    /// Numeric cell narrowed to i32; null and non-numeric read as 0
    pub fn get_i32(&mut self, col: impl ColumnRef) -> Result<i32> {
        Ok(self.get_value(col)?.as_i64().unwrap_or(0) as i32)
    }

    /// Numeric cell widened to i64; null and non-numeric read as 0
    pub fn get_i64(&mut self, col: impl ColumnRef) -> Result<i64> {
        Ok(self.get_value(col)?.as_i64().unwrap_or(0))
    }

    /// Numeric cell as f32; null and non-numeric read as 0.0
    pub fn get_f32(&mut self, col: impl ColumnRef) -> Result<f32> {
        Ok(self.get_value(col)?.as_f64().unwrap_or(0.0) as f32)
    }

    /// Numeric cell as f64; null and non-numeric read as 0.0
    pub fn get_f64(&mut self, col: impl ColumnRef) -> Result<f64> {
        Ok(self.get_value(col)?.as_f64().unwrap_or(0.0))
    }

    /// Exact decimal; other numeric families convert, anything else is
    /// a usage error
    pub fn get_decimal(&mut self, col: impl ColumnRef) -> Result<Option<Decimal>> {
        use rust_decimal::prelude::FromPrimitive;
        match self.get_value(col)? {
            Value::Null => Ok(None),
            Value::Decimal(d) => Ok(Some(d)),
            Value::TinyInt(v) => Ok(Some(Decimal::from(v))),
            Value::SmallInt(v) => Ok(Some(Decimal::from(v))),
            Value::Integer(v) => Ok(Some(Decimal::from(v))),
            Value::BigInt(v) => Ok(Some(Decimal::from(v))),
            Value::Float(v) => Ok(Decimal::from_f32(v)),
            Value::Double(v) => Ok(Decimal::from_f64(v)),
            other => Err(Error::Usage(format!("Not a Decimal: {}", other))),
        }
    }

    /// Raw bytes of a binary cell
    pub fn get_bytes(&mut self, col: impl ColumnRef) -> Result<Option<Vec<u8>>> {
        match self.get_value(col)? {
            Value::Null => Ok(None),
            Value::Bytes(b) => Ok(Some(b)),
            other => Err(Error::Usage(format!("Not a Binary: {}", other))),
        }
    }

    /// Date cell; a timestamp contributes its date part
    pub fn get_date(&mut self, col: impl ColumnRef) -> Result<Option<NaiveDate>> {
        match self.get_value(col)? {
            Value::Null => Ok(None),
            Value::Date(d) => Ok(Some(d)),
            Value::Timestamp(ts) => Ok(Some(ts.date())),
            other => Err(Error::Usage(format!("Not a Date: {}", other))),
        }
    }

    /// Time cell; a timestamp contributes its time part
    pub fn get_time(&mut self, col: impl ColumnRef) -> Result<Option<NaiveTime>> {
        match self.get_value(col)? {
            Value::Null => Ok(None),
            Value::Time(t) => Ok(Some(t)),
            Value::Timestamp(ts) => Ok(Some(ts.time())),
            other => Err(Error::Usage(format!("Not a Time: {}", other))),
        }
    }

    /// Timestamp cell; a date promotes to midnight
    pub fn get_timestamp(&mut self, col: impl ColumnRef) -> Result<Option<NaiveDateTime>> {
        match self.get_value(col)? {
            Value::Null => Ok(None),
            Value::Timestamp(ts) => Ok(Some(ts)),
            Value::Date(d) => Ok(Some(d.and_time(NaiveTime::MIN))),
            other => Err(Error::Usage(format!("Not a Timestamp: {}", other))),
        }
    }

    /// Array cell
    pub fn get_array(&mut self, col: impl ColumnRef) -> Result<Option<Vec<Value>>> {
        match self.get_value(col)? {
            Value::Null => Ok(None),
            Value::Array(items) => Ok(Some(items)),
            other => Err(Error::Usage(format!("Not an Array: {}", other))),
        }
    }

    /// Whether the last cell read was SQL null
    pub fn was_null(&self) -> bool {
        self.last_null
    }

    // ---- mutation surface (read-only simulation) ----

    pub fn update_value(&mut self, _col: usize, _value: Value) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn insert_row(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn update_row(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn delete_row(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn refresh_row(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn cancel_row_updates(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn move_to_insert_row(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    pub fn move_to_current_row(&mut self) -> Result<()> {
        Err(Error::Unsupported("read-only result set"))
    }

    // ---- internals ----

    // fetch_size never exceeds the row count, so it is the effective
    // row count for navigation
    fn limit(&self) -> usize {
        self.fetch_size
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::State("Result set is closed".into()));
        }
        Ok(())
    }

    fn check_scrollable(&self) -> Result<()> {
        if !self.scrollable {
            return Err(Error::State("Type of result set is forward only".into()));
        }
        Ok(())
    }

    fn cell(&self, col: impl ColumnRef) -> Result<&Value> {
        self.check_open()?;
        if self.row == 0 || self.row > self.rows.len() {
            return Err(Error::State("No rows fetched yet".into()));
        }
        let index = col.resolve(&self.rows)?;
        Ok(&self.rows.rows[self.row - 1][index - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn three_rows() -> Result<RowList> {
        RowList::with_columns(&[("id", SqlType::Integer), ("name", SqlType::VarChar)])
            .with_row(vec![Value::Integer(1), Value::String("one".into())])?
            .with_row(vec![Value::Integer(2), Value::String("two".into())])?
            .with_row(vec![Value::Integer(3), Value::Null])
    }

    #[test]
    fn forward_iteration_ends_after_last() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        assert!(cursor.is_before_first());
        assert!(cursor.next()?);
        assert!(cursor.is_first());
        assert!(cursor.next()?);
        assert!(cursor.next()?);
        assert!(cursor.is_last());
        assert!(!cursor.next()?);
        assert!(cursor.is_after_last());
        assert_eq!(cursor.get_row(), 0);
        Ok(())
    }

    #[test]
    fn empty_cursor_never_positions() -> Result<()> {
        let mut cursor = Cursor::new(RowList::with_columns(&[("id", SqlType::Integer)]));
        assert!(!cursor.next()?);
        assert!(!cursor.previous()?);
        assert!(!cursor.is_before_first());
        assert!(!cursor.is_after_last());
        assert!(cursor.relative(0)?);
        Ok(())
    }

    #[test]
    fn cycling_wraps_to_first_row() -> Result<()> {
        let rows = three_rows()?.with_cycling(true);
        let mut cursor = Cursor::new(rows);
        for _ in 0..3 {
            assert!(cursor.next()?);
        }
        assert!(cursor.next()?);
        assert_eq!(cursor.get_row(), 1);
        assert!(cursor.absolute(5)?);
        assert_eq!(cursor.get_row(), 1);
        Ok(())
    }

    #[test]
    fn absolute_counts_from_both_ends() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        assert!(cursor.absolute(2)?);
        assert_eq!(cursor.get_row(), 2);
        assert!(cursor.absolute(-1)?);
        assert_eq!(cursor.get_row(), 3);
        assert!(cursor.absolute(-3)?);
        assert_eq!(cursor.get_row(), 1);
        assert!(!cursor.absolute(-4)?);
        assert!(cursor.is_before_first());
        assert!(cursor.absolute(0)?);
        assert!(cursor.is_before_first());
        assert!(!cursor.absolute(9)?);
        assert!(cursor.is_after_last());
        Ok(())
    }

    #[test]
    fn relative_moves_and_zero_is_true() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        assert!(cursor.relative(2)?);
        assert_eq!(cursor.get_row(), 2);
        assert!(cursor.relative(0)?);
        assert_eq!(cursor.get_row(), 2);
        assert!(cursor.relative(-1)?);
        assert_eq!(cursor.get_row(), 1);
        assert!(!cursor.relative(7)?);
        assert!(cursor.is_after_last());
        Ok(())
    }

    #[test]
    fn forward_only_rejects_backward_moves() -> Result<()> {
        let mut cursor = Cursor::forward_only(three_rows()?);
        assert!(cursor.next()?);
        assert!(cursor.next()?);
        assert_eq!(cursor.previous().unwrap_err().to_string(), "Backward move");
        assert_eq!(
            cursor.relative(-1).unwrap_err().to_string(),
            "Backward move"
        );
        assert_eq!(
            cursor.absolute(1).unwrap_err().to_string(),
            "Backward move on forward-only cursor"
        );
        assert_eq!(
            cursor.absolute(0).unwrap_err().to_string(),
            "Backward move on forward-only cursor"
        );
        assert_eq!(
            cursor.first().unwrap_err().to_string(),
            "Backward move on forward-only cursor"
        );
        assert_eq!(
            cursor.before_first().unwrap_err().to_string(),
            "Type of result set is forward only"
        );
        assert_eq!(
            cursor.set_fetch_direction(FetchDirection::Reverse).unwrap_err().to_string(),
            "Type of result set is forward only"
        );
        cursor.set_fetch_direction(FetchDirection::Forward)?;
        assert!(cursor.absolute(3)?);
        Ok(())
    }

    #[test]
    fn forward_only_allows_same_position_and_forward_moves() -> Result<()> {
        let mut cursor = Cursor::forward_only(three_rows()?);
        assert!(cursor.absolute(0)?);
        assert!(cursor.first()?);
        assert!(cursor.absolute(1)?);
        assert_eq!(cursor.get_row(), 1);
        assert!(cursor.absolute(3)?);
        Ok(())
    }

    #[test]
    fn closed_cursor_rejects_everything_but_close() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        cursor.close();
        cursor.close();
        assert_eq!(cursor.next().unwrap_err().to_string(), "Result set is closed");
        assert_eq!(
            cursor.set_fetch_size(1).unwrap_err().to_string(),
            "Result set is closed"
        );
        assert_eq!(
            cursor.get_value(1usize).unwrap_err().to_string(),
            "Result set is closed"
        );
        Ok(())
    }

    #[test]
    fn fetch_size_bounds_navigation() -> Result<()> {
        let mut rows = RowList::with_columns(&[("id", SqlType::Integer)]);
        for i in 1..=11 {
            rows.append(vec![Value::Integer(i)])?;
        }
        let mut cursor = Cursor::new(rows);
        cursor.set_fetch_size(4)?;

        let mut seen = 0;
        while cursor.next()? {
            seen += 1;
        }
        assert_eq!(seen, 4);
        assert!(cursor.is_after_last());

        assert!(cursor.absolute(4)?);
        assert!(cursor.is_last());
        assert!(!cursor.absolute(5)?);
        assert_eq!(cursor.get_row(), 0);
        assert!(cursor.last()?);
        assert_eq!(cursor.get_row(), 4);
        assert_eq!(cursor.get_i32(1usize)?, 4);

        cursor.set_fetch_size(0)?;
        assert!(cursor.absolute(11)?);
        assert!(cursor.is_last());
        Ok(())
    }

    #[test]
    fn fetch_size_ignores_oversized_values() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        assert_eq!(cursor.fetch_size(), 3);
        cursor.set_fetch_size(2)?;
        assert_eq!(cursor.fetch_size(), 2);
        cursor.set_fetch_size(10)?;
        assert_eq!(cursor.fetch_size(), 2);
        cursor.set_fetch_size(0)?;
        assert_eq!(cursor.fetch_size(), 3);
        Ok(())
    }

    #[test]
    fn accessors_need_a_positioned_row() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        assert_eq!(
            cursor.get_value(1usize).unwrap_err().to_string(),
            "No rows fetched yet"
        );
        cursor.next()?;
        assert_eq!(cursor.get_value(1usize)?, Value::Integer(1));
        assert_eq!(
            cursor.get_value(3usize).unwrap_err().to_string(),
            "Invalid column index: 3"
        );
        assert_eq!(
            cursor.get_value("nope").unwrap_err().to_string(),
            "Invalid column label nope"
        );
        Ok(())
    }

    #[test]
    fn accessors_resolve_labels() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        cursor.next()?;
        assert_eq!(cursor.get_string("name")?, Some("one".into()));
        assert_eq!(cursor.get_i32("id")?, 1);
        Ok(())
    }

    #[test]
    fn null_reads_and_was_null() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        cursor.absolute(3)?;
        assert_eq!(cursor.get_string(2usize)?, None);
        assert!(cursor.was_null());
        assert_eq!(cursor.get_i32(2usize)?, 0);
        assert!(!cursor.get_bool(2usize)?);
        assert_eq!(cursor.get_i32(1usize)?, 3);
        assert!(!cursor.was_null());
        Ok(())
    }

    #[test]
    fn numeric_coercion_across_widths() -> Result<()> {
        let rows = RowList::with_columns(&[
            ("b", SqlType::BigInt),
            ("d", SqlType::Double),
            ("s", SqlType::VarChar),
        ])
        .with_row(vec![
            Value::BigInt(300),
            Value::Double(1.9),
            Value::String("abc".into()),
        ])?;
        let mut cursor = Cursor::new(rows);
        cursor.next()?;
        assert_eq!(cursor.get_i64(1usize)?, 300);
        assert_eq!(cursor.get_i8(1usize)?, 300i64 as i8);
        assert_eq!(cursor.get_i32(2usize)?, 1);
        assert_eq!(cursor.get_f64(2usize)?, 1.9);
        assert_eq!(cursor.get_i64(3usize)?, 0);
        assert_eq!(cursor.get_f32(3usize)?, 0.0);
        Ok(())
    }

    #[test]
    fn boolean_coercion_checks_first_char() -> Result<()> {
        let rows = RowList::with_columns(&[
            ("flag", SqlType::Boolean),
            ("n", SqlType::Integer),
            ("z", SqlType::Integer),
        ])
        .with_row(vec![Value::Boolean(true), Value::Integer(1), Value::Integer(0)])?;
        let mut cursor = Cursor::new(rows);
        cursor.next()?;
        assert!(cursor.get_bool(1usize)?);
        assert!(cursor.get_bool(2usize)?);
        assert!(!cursor.get_bool(3usize)?);
        Ok(())
    }

    #[test]
    fn temporal_accessors_convert_between_kinds() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let ts = date.and_hms_opt(10, 30, 0).unwrap();
        let rows = RowList::with_columns(&[
            ("d", SqlType::Date),
            ("ts", SqlType::Timestamp),
            ("s", SqlType::VarChar),
        ])
        .with_row(vec![
            Value::Date(date),
            Value::Timestamp(ts),
            Value::String("x".into()),
        ])?;
        let mut cursor = Cursor::new(rows);
        cursor.next()?;
        assert_eq!(cursor.get_date(1usize)?, Some(date));
        assert_eq!(cursor.get_timestamp(1usize)?, Some(date.and_time(NaiveTime::MIN)));
        assert_eq!(cursor.get_date(2usize)?, Some(date));
        assert_eq!(cursor.get_time(2usize)?, Some(ts.time()));
        assert_eq!(cursor.get_timestamp(2usize)?, Some(ts));
        assert_eq!(
            cursor.get_date(3usize).unwrap_err().to_string(),
            "Not a Date: x"
        );
        assert_eq!(
            cursor.get_time(3usize).unwrap_err().to_string(),
            "Not a Time: x"
        );
        Ok(())
    }

    #[test]
    fn decimal_bytes_and_array_accessors() -> Result<()> {
        use std::str::FromStr;
        let rows = RowList::with_columns(&[
            ("dec", SqlType::Decimal),
            ("n", SqlType::Integer),
            ("bin", SqlType::Binary),
            ("arr", SqlType::Array),
            ("s", SqlType::VarChar),
        ])
        .with_row(vec![
            Value::Decimal(Decimal::from_str("1.50").unwrap()),
            Value::Integer(7),
            Value::Bytes(vec![1, 2, 3]),
            Value::Array(vec![Value::Integer(1), Value::Integer(2)]),
            Value::String("x".into()),
        ])?;
        let mut cursor = Cursor::new(rows);
        cursor.next()?;
        assert_eq!(cursor.get_decimal(1usize)?, Some(Decimal::from_str("1.50").unwrap()));
        assert_eq!(cursor.get_decimal(2usize)?, Some(Decimal::from(7)));
        assert_eq!(
            cursor.get_decimal(5usize).unwrap_err().to_string(),
            "Not a Decimal: x"
        );
        assert_eq!(cursor.get_bytes(3usize)?, Some(vec![1, 2, 3]));
        assert_eq!(
            cursor.get_bytes(5usize).unwrap_err().to_string(),
            "Not a Binary: x"
        );
        assert_eq!(
            cursor.get_array(4usize)?,
            Some(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(
            cursor.get_array(5usize).unwrap_err().to_string(),
            "Not an Array: x"
        );
        Ok(())
    }

    #[test]
    fn mutation_surface_is_read_only() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        cursor.next()?;
        let expected = "Feature is not supported: read-only result set";
        assert_eq!(cursor.update_value(1, Value::Null).unwrap_err().to_string(), expected);
        assert_eq!(cursor.insert_row().unwrap_err().to_string(), expected);
        assert_eq!(cursor.update_row().unwrap_err().to_string(), expected);
        assert_eq!(cursor.delete_row().unwrap_err().to_string(), expected);
        assert_eq!(cursor.refresh_row().unwrap_err().to_string(), expected);
        assert_eq!(cursor.cancel_row_updates().unwrap_err().to_string(), expected);
        assert_eq!(cursor.move_to_insert_row().unwrap_err().to_string(), expected);
        assert_eq!(cursor.move_to_current_row().unwrap_err().to_string(), expected);
        Ok(())
    }

    #[test]
    fn projection_keeps_position() -> Result<()> {
        let mut cursor = Cursor::new(three_rows()?);
        cursor.absolute(2)?;
        let mut projected = cursor.with_projection(&["name"])?;
        assert_eq!(projected.get_row(), 2);
        assert_eq!(projected.column_count(), 1);
        assert_eq!(projected.get_string(1usize)?, Some("two".into()));
        Ok(())
    }
}
