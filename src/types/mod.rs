use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported SQL column/parameter types
///
/// The vocabulary is fixed: boolean, four integer widths, two floating
/// widths, exact decimal, string, bytes, three temporal kinds and array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    VarChar,
    Binary,
    Date,
    Time,
    Timestamp,
    Array,
}

/// All type tags, in canonical order
pub const SQL_TYPES: [SqlType; 14] = [
    SqlType::Boolean,
    SqlType::TinyInt,
    SqlType::SmallInt,
    SqlType::Integer,
    SqlType::BigInt,
    SqlType::Float,
    SqlType::Double,
    SqlType::Decimal,
    SqlType::VarChar,
    SqlType::Binary,
    SqlType::Date,
    SqlType::Time,
    SqlType::Timestamp,
    SqlType::Array,
];

impl SqlType {
    /// Canonical SQL type name
    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Decimal => "DECIMAL",
            SqlType::VarChar => "VARCHAR",
            SqlType::Binary => "BINARY",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Array => "ARRAY",
        }
    }

    /// Canonical vendor type number (JDBC numbering)
    pub fn number(&self) -> i32 {
        match self {
            SqlType::Boolean => 16,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Float => 6,
            SqlType::Double => 8,
            SqlType::Decimal => 3,
            SqlType::VarChar => 12,
            SqlType::Binary => -2,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Array => 2003,
        }
    }

    /// Bit precision for numeric types, 1 for boolean, 0 elsewhere
    pub fn precision(&self) -> i32 {
        match self {
            SqlType::Boolean => 1,
            SqlType::TinyInt => 8,
            SqlType::SmallInt => 16,
            SqlType::Integer => 32,
            SqlType::BigInt => 64,
            SqlType::Float => 32,
            SqlType::Double => 64,
            _ => 0,
        }
    }

    /// Default decimal scale when none is inferred from a value
    pub fn default_scale(&self) -> i32 {
        match self {
            SqlType::Float | SqlType::Double | SqlType::Decimal => 2,
            _ => 0,
        }
    }

    /// Whether the type is a signed number
    pub fn signed(&self) -> bool {
        matches!(
            self,
            SqlType::TinyInt
                | SqlType::SmallInt
                | SqlType::Integer
                | SqlType::BigInt
                | SqlType::Float
                | SqlType::Double
                | SqlType::Decimal
        )
    }

    /// Whether the type belongs to the numeric family
    pub fn numeric(&self) -> bool {
        self.signed()
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Runtime cell/parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Array(Vec<Value>),
}

impl Value {
    /// Returns the SQL type of the value, or None if it's Null
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(SqlType::Boolean),
            Value::TinyInt(_) => Some(SqlType::TinyInt),
            Value::SmallInt(_) => Some(SqlType::SmallInt),
            Value::Integer(_) => Some(SqlType::Integer),
            Value::BigInt(_) => Some(SqlType::BigInt),
            Value::Float(_) => Some(SqlType::Float),
            Value::Double(_) => Some(SqlType::Double),
            Value::Decimal(_) => Some(SqlType::Decimal),
            Value::String(_) => Some(SqlType::VarChar),
            Value::Bytes(_) => Some(SqlType::Binary),
            Value::Date(_) => Some(SqlType::Date),
            Value::Time(_) => Some(SqlType::Time),
            Value::Timestamp(_) => Some(SqlType::Timestamp),
            Value::Array(_) => Some(SqlType::Array),
        }
    }

    /// Whether the value is SQL null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widens any numeric value to f64, or None for other families
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::TinyInt(v) => Some(*v as f64),
            Value::SmallInt(v) => Some(*v as f64),
            Value::Integer(v) => Some(*v as f64),
            Value::BigInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(v) => {
                use rust_decimal::prelude::ToPrimitive;
                v.to_f64()
            }
            _ => None,
        }
    }

    /// Narrows any numeric value to i64 (truncating), or None for other
    /// families
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(*v as i64),
            Value::SmallInt(v) => Some(*v as i64),
            Value::Integer(v) => Some(*v as i64),
            Value::BigInt(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Double(v) => Some(*v as i64),
            Value::Decimal(v) => {
                use rust_decimal::prelude::ToPrimitive;
                v.to_i64()
            }
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) if *b => write!(f, "true"),
            Value::Boolean(_) => write!(f, "false"),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "{:02x?}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::Array(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A row is a vector of values
pub type Row = Vec<Value>;

/// Decimal scale of an f32, from its shortest round-trip rendering
///
/// `1.2` infers 1, `1.23` infers 2, `1.234567` infers 6. Whole floats
/// infer 0.
pub fn f32_scale(value: f32) -> i32 {
    fraction_digits(&format!("{}", value))
}

/// Decimal scale of an f64, capped at 6 fractional digits
///
/// The value is rendered with 6 fixed places and trailing zeros are
/// stripped, so `1.5` infers 1 and `1.23456789` infers 6.
pub fn f64_scale(value: f64) -> i32 {
    let rendered = format!("{:.6}", value);
    let trimmed = rendered.trim_end_matches('0');
    fraction_digits(trimmed)
}

/// Scale carried by an exact decimal value
pub fn decimal_scale(value: &Decimal) -> i32 {
    value.scale() as i32
}

fn fraction_digits(rendered: &str) -> i32 {
    // Exponent renderings (very small/large magnitudes) carry no useful
    // fraction count; treat them as scale 0.
    if rendered.contains(['e', 'E']) {
        return 0;
    }
    match rendered.find('.') {
        Some(dot) => (rendered.len() - dot - 1) as i32,
        None => 0,
    }
}
