use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::types::{self, SqlType, Value};

/// Declared shape of a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDef {
    pub sql_type: SqlType,
    pub precision: i32,
    pub scale: i32,
    pub nullable: Option<bool>,
    pub signed: bool,
}

impl ParameterDef {
    /// A def filled from the canonical type table
    pub fn of(sql_type: SqlType) -> Self {
        Self {
            sql_type,
            precision: sql_type.precision(),
            scale: sql_type.default_scale(),
            nullable: None,
            signed: sql_type.signed(),
        }
    }

    /// A def with the table scale overridden
    pub fn scaled(sql_type: SqlType, scale: i32) -> Self {
        Self { scale, ..Self::of(sql_type) }
    }

    /// Float def with the scale inferred from the value
    pub fn of_f32(value: f32) -> Self {
        Self::scaled(SqlType::Float, types::f32_scale(value))
    }

    /// Double def with the scale inferred from the value
    pub fn of_f64(value: f64) -> Self {
        Self::scaled(SqlType::Double, types::f64_scale(value))
    }

    /// Decimal def carrying the value's own scale
    pub fn of_decimal(value: &Decimal) -> Self {
        Self::scaled(SqlType::Decimal, types::decimal_scale(value))
    }

    /// Canonical name of the declared type
    pub fn type_name(&self) -> &'static str {
        self.sql_type.name()
    }

    /// Canonical vendor number of the declared type
    pub fn type_number(&self) -> i32 {
        self.sql_type.number()
    }
}

/// A bound parameter: declared shape plus the value
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub def: ParameterDef,
    pub value: Value,
}

impl Parameter {
    pub fn new(def: ParameterDef, value: Value) -> Self {
        Self { def, value }
    }
}

/// Sparse 1-based parameter slots for a prepared statement
///
/// Positions may be set in any order and overwritten freely; gaps are
/// only rejected when the full ordered sequence is requested at
/// execution time.
#[derive(Debug, Clone, Default)]
pub struct ParameterBinder {
    slots: BTreeMap<usize, Parameter>,
    allow_untyped_null: bool,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, binding a bare null is accepted as a string-typed null
    pub fn with_untyped_null(mut self, allow: bool) -> Self {
        self.allow_untyped_null = allow;
        self
    }

    /// Binds `value` with an explicit def at 1-based `pos`
    pub fn set(&mut self, pos: usize, def: ParameterDef, value: Value) -> Result<()> {
        if pos == 0 {
            return Err(Error::Usage("Invalid parameter index: 0".into()));
        }
        self.slots.insert(pos, Parameter::new(def, value));
        Ok(())
    }

    /// Binds `value` at 1-based `pos`, inferring the def from the value
    pub fn bind(&mut self, pos: usize, value: Value) -> Result<()> {
        let def = self.infer(&value)?;
        self.set(pos, def, value)
    }

    /// Binds a null declared as `sql_type` at 1-based `pos`
    pub fn bind_null(&mut self, pos: usize, sql_type: SqlType) -> Result<()> {
        self.set(pos, ParameterDef::of(sql_type), Value::Null)
    }

    /// Drops every slot
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// High-water mark: the largest bound position, 0 when empty
    pub fn count(&self) -> usize {
        self.slots.keys().next_back().copied().unwrap_or(0)
    }

    /// The def at 1-based `pos`
    pub fn def(&self, pos: usize) -> Result<ParameterDef> {
        if pos == 0 || pos > self.count() {
            return Err(Error::Usage(format!("Parameter out of bounds: {}", pos)));
        }
        match self.slots.get(&pos) {
            Some(parameter) => Ok(parameter.def),
            None => Err(Error::Usage(format!("Parameter is not set: {}", pos))),
        }
    }

    /// The bound parameters in position order, 1 up to the high-water
    /// mark; the first gap is an error
    pub fn ordered(&self) -> Result<Vec<Parameter>> {
        let mut out = Vec::with_capacity(self.count());
        for pos in 1..=self.count() {
            match self.slots.get(&pos) {
                Some(parameter) => out.push(parameter.clone()),
                None => {
                    return Err(Error::Usage(format!("Missing parameter value: {}", pos)));
                }
            }
        }
        Ok(out)
    }

    fn infer(&self, value: &Value) -> Result<ParameterDef> {
        match value {
            Value::Null if self.allow_untyped_null => Ok(ParameterDef::of(SqlType::VarChar)),
            Value::Null => Err(Error::Usage("Cannot bind untyped null parameter".into())),
            Value::Float(v) => Ok(ParameterDef::of_f32(*v)),
            Value::Double(v) => Ok(ParameterDef::of_f64(*v)),
            Value::Decimal(v) => Ok(ParameterDef::of_decimal(v)),
            other => match other.sql_type() {
                Some(sql_type) => Ok(ParameterDef::of(sql_type)),
                None => Err(Error::Usage("Cannot bind untyped null parameter".into())),
            },
        }
    }
}
