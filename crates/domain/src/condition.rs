//! Filter predicates applied to association rows.
//!
//! Conditions chain left to right. `and` binds tighter than `or`, the same
//! way SQL evaluates `a AND b OR c`.

use std::cmp::Ordering;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::inflection::snake_case;

/// Extra columns stored on an association row.
pub type PivotColumns = serde_json::Map<String, Value>;

/// Method-name prefixes recognized as condition appenders.
pub const CONDITIONAL_METHOD_PREFIXES: [&str; 2] = ["where", "orWhere"];

/// How a condition joins the conditions before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
    /// Both sides must hold.
    #[default]
    And,
    /// Either side may hold.
    Or,
}

/// Comparison operator of a column predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `LIKE` with `%` and `_` wildcards.
    Like,
}

impl ComparisonOperator {
    /// Parses an operator symbol.
    pub fn parse(symbol: &str) -> AppResult<Self> {
        match symbol.trim().to_ascii_lowercase().as_str() {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "like" => Ok(Self::Like),
            other => Err(AppError::InvalidArgument(format!(
                "unsupported comparison operator '{other}'"
            ))),
        }
    }

    /// Returns the SQL spelling.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// Column test of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Compares a column with a value.
    Compare {
        /// Column name.
        column: String,
        /// Operator.
        operator: ComparisonOperator,
        /// Right-hand value.
        value: Value,
    },
    /// Column value is one of the values.
    In {
        /// Column name.
        column: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Column value is none of the values.
    NotIn {
        /// Column name.
        column: String,
        /// Rejected values.
        values: Vec<Value>,
    },
    /// Column is null or absent.
    Null {
        /// Column name.
        column: String,
    },
    /// Column holds a value.
    NotNull {
        /// Column name.
        column: String,
    },
}

impl Predicate {
    /// Returns the tested column.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Compare { column, .. }
            | Self::In { column, .. }
            | Self::NotIn { column, .. }
            | Self::Null { column }
            | Self::NotNull { column } => column.as_str(),
        }
    }

    /// Evaluates the predicate against a row.
    #[must_use]
    pub fn matches(&self, row: &PivotColumns) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Self::Compare {
                operator, value, ..
            } => compare(cell, *operator, value),
            Self::In { values, .. } => {
                !cell.is_null() && values.iter().any(|value| json_eq(cell, value))
            }
            Self::NotIn { values, .. } => {
                !cell.is_null() && !values.iter().any(|value| json_eq(cell, value))
            }
            Self::Null { .. } => cell.is_null(),
            Self::NotNull { .. } => !cell.is_null(),
        }
    }
}

/// One predicate plus how it joins the previous ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Join with the preceding condition.
    #[serde(default)]
    pub connective: Connective,
    /// Column test.
    #[serde(flatten)]
    pub predicate: Predicate,
}

impl Condition {
    /// `column = value`; a null value becomes `column IS NULL`.
    #[must_use]
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, ComparisonOperator::Eq, value)
    }

    /// `column <operator> value`.
    #[must_use]
    pub fn compare(
        column: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<Value>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        let predicate = match (operator, value.is_null()) {
            (ComparisonOperator::Eq, true) => Predicate::Null { column },
            (ComparisonOperator::NotEq, true) => Predicate::NotNull { column },
            _ => Predicate::Compare {
                column,
                operator,
                value,
            },
        };

        Self::and(predicate)
    }

    /// `column IN (values)`.
    #[must_use]
    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::and(Predicate::In {
            column: column.into(),
            values,
        })
    }

    /// `column IS NULL`.
    #[must_use]
    pub fn null(column: impl Into<String>) -> Self {
        Self::and(Predicate::Null {
            column: column.into(),
        })
    }

    /// `column IS NOT NULL`.
    #[must_use]
    pub fn not_null(column: impl Into<String>) -> Self {
        Self::and(Predicate::NotNull {
            column: column.into(),
        })
    }

    /// Joins the condition with `or` instead of `and`.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.connective = Connective::Or;
        self
    }

    /// Parses a chained builder call such as `wherePivot("status", "active")`.
    ///
    /// Returns `None` when the method does not start with a recognized
    /// prefix. Dynamic `where<Column>(value)` calls compare the snake-cased
    /// column for equality.
    #[must_use]
    pub fn from_call(method: &str, arguments: &[Value]) -> Option<AppResult<Self>> {
        let (connective, rest) = if let Some(rest) = method.strip_prefix("orWhere") {
            (Connective::Or, rest)
        } else if let Some(rest) = method.strip_prefix("where") {
            (Connective::And, rest)
        } else {
            return None;
        };
        let rest = rest.strip_prefix("Pivot").unwrap_or(rest);

        let parsed = match rest {
            "" => parse_comparison(method, arguments),
            "In" => column_and_list(method, arguments).map(|(column, values)| {
                Self::and(Predicate::In { column, values })
            }),
            "NotIn" => column_and_list(method, arguments).map(|(column, values)| {
                Self::and(Predicate::NotIn { column, values })
            }),
            "Null" => column_argument(method, arguments, 1).map(Self::null),
            "NotNull" => column_argument(method, arguments, 1).map(Self::not_null),
            dynamic => match arguments {
                [value] => Ok(Self::equals(snake_case(dynamic), value.clone())),
                _ => Err(arity_error(method, 1, arguments.len())),
            },
        };

        Some(parsed.map(|mut condition| {
            condition.connective = connective;
            condition
        }))
    }

    fn and(predicate: Predicate) -> Self {
        Self {
            connective: Connective::And,
            predicate,
        }
    }
}

/// Ordered list of conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions {
    items: Vec<Condition>,
}

impl Conditions {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a condition.
    pub fn push(&mut self, condition: Condition) {
        self.items.push(condition);
    }

    /// Appends every condition of another list.
    pub fn extend(&mut self, other: &Self) {
        self.items.extend(other.items.iter().cloned());
    }

    /// Iterates over conditions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.items.iter()
    }

    /// Returns whether no condition was appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Evaluates the conditions against a row; empty lists always match.
    #[must_use]
    pub fn matches(&self, row: &PivotColumns) -> bool {
        if self.items.is_empty() {
            return true;
        }

        let mut any_group = false;
        let mut group = true;
        for (index, condition) in self.items.iter().enumerate() {
            if index > 0 && condition.connective == Connective::Or {
                any_group |= group;
                group = true;
            }
            group &= condition.predicate.matches(row);
        }

        any_group || group
    }
}

impl FromIterator<Condition> for Conditions {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

fn parse_comparison(method: &str, arguments: &[Value]) -> AppResult<Condition> {
    match arguments {
        [column, value] => Ok(Condition::equals(column_name(method, column)?, value.clone())),
        [column, operator, value] => {
            let symbol = operator.as_str().ok_or_else(|| {
                AppError::InvalidArgument(format!("{method}() expects a string operator"))
            })?;
            Ok(Condition::compare(
                column_name(method, column)?,
                ComparisonOperator::parse(symbol)?,
                value.clone(),
            ))
        }
        _ => Err(arity_error(method, 2, arguments.len())),
    }
}

fn column_and_list(method: &str, arguments: &[Value]) -> AppResult<(String, Vec<Value>)> {
    match arguments {
        [column, Value::Array(values)] => Ok((column_name(method, column)?, values.clone())),
        [_, _] => Err(AppError::InvalidArgument(format!(
            "{method}() expects a list of values"
        ))),
        _ => Err(arity_error(method, 2, arguments.len())),
    }
}

fn column_argument(method: &str, arguments: &[Value], expected: usize) -> AppResult<String> {
    match arguments {
        [column] => column_name(method, column),
        _ => Err(arity_error(method, expected, arguments.len())),
    }
}

fn column_name(method: &str, value: &Value) -> AppResult<String> {
    value
        .as_str()
        .filter(|column| !column.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::InvalidArgument(format!("{method}() expects a column name")))
}

fn arity_error(method: &str, expected: usize, actual: usize) -> AppError {
    AppError::InvalidArgument(format!(
        "{method}() expects {expected} argument(s), {actual} given"
    ))
}

/// Numeric view of a cell compared against a number; numeric text coerces.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn json_eq(left: &Value, right: &Value) -> bool {
    if !left.is_number() && !right.is_number() {
        return left == right;
    }

    match (as_number(left), as_number(right)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn json_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => left.as_f64()?.partial_cmp(&right.as_f64()?),
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        _ => None,
    }
}

fn compare(cell: &Value, operator: ComparisonOperator, value: &Value) -> bool {
    if cell.is_null() || value.is_null() {
        return false;
    }

    match operator {
        ComparisonOperator::Eq => json_eq(cell, value),
        ComparisonOperator::NotEq => !json_eq(cell, value),
        ComparisonOperator::Lt => json_cmp(cell, value) == Some(Ordering::Less),
        ComparisonOperator::Lte => matches!(
            json_cmp(cell, value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ComparisonOperator::Gt => json_cmp(cell, value) == Some(Ordering::Greater),
        ComparisonOperator::Gte => matches!(
            json_cmp(cell, value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ComparisonOperator::Like => match (cell.as_str(), value.as_str()) {
            (Some(text), Some(pattern)) => like(text, pattern),
            _ => false,
        },
    }
}

/// SQL `LIKE` over characters: `%` matches any run, `_` exactly one.
///
/// Backtracks only to the most recent `%`, so matching stays linear in the
/// number of wildcards.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut at, mut next) = (0, 0);
    let mut wildcard: Option<(usize, usize)> = None;

    while at < text.len() {
        match pattern.get(next) {
            Some('%') => {
                next += 1;
                wildcard = Some((next, at));
            }
            Some('_') => {
                at += 1;
                next += 1;
            }
            Some(expected) if *expected == text[at] => {
                at += 1;
                next += 1;
            }
            _ => match wildcard {
                Some((resume, consumed)) => {
                    next = resume;
                    at = consumed + 1;
                    wildcard = Some((resume, at));
                }
                None => return false,
            },
        }
    }

    pattern[next..].iter().all(|symbol| *symbol == '%')
}
