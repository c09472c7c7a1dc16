//! Expression model - the values a report column or filter can compute.
//!
//! Every expression variant answers three questions without touching the
//! database: a human-readable name, an inferred value type (or `None` when
//! ambiguous), and a default SQL column alias. The enum is closed so the
//! compiler enforces that every variant is handled everywhere.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::table::Table;

/// Functions allowed to appear in report totals and subtotals.
static SUMMARIZABLE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["age_range", "count", "count_distinct", "sum"]
        .into_iter()
        .collect()
});

/// Replace characters that are legal in logical identifiers but not in SQL
/// aliases (`.` and `-` become `_`).
pub fn sanitize_identifier(raw: &str) -> String {
    raw.replace('.', "_").replace('-', "_")
}

// =============================================================================
// Value types
// =============================================================================

/// The value type a column or expression produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    Timestamp,
}

// =============================================================================
// Expression variants
// =============================================================================

/// A column read from a specific table instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct FieldReference {
    pub table: Table,
    pub field: String,
    pub value_type: Option<ValueType>,
    pub display_name: Option<String>,
    /// Name of the metadata object this field lives on, when it is not a
    /// plain column of the table.
    pub metadata_object: Option<String>,
    pub summarizable: bool,
    pub date_format: Option<String>,
}

impl FieldReference {
    pub fn new(table: Table, field: &str) -> Self {
        Self {
            table,
            field: field.into(),
            value_type: None,
            display_name: None,
            metadata_object: None,
            summarizable: false,
            date_format: None,
        }
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_metadata_object(mut self, object: &str) -> Self {
        self.metadata_object = Some(object.into());
        self
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn summarizable(mut self) -> Self {
        self.summarizable = true;
        self
    }
}

/// A literal value.
///
/// `raw` distinguishes SQL fragments spliced into the output verbatim from
/// ordinary literals that get quoted and escaped. Never construct a raw
/// constant from user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub value: Value,
    pub raw: bool,
}

impl Constant {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            raw: false,
        }
    }

    pub fn raw(fragment: &str) -> Self {
        Self {
            value: Value::String(fragment.into()),
            raw: true,
        }
    }

    /// The literal's text form, used as its display name.
    pub fn text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => "null".into(),
            other => other.to_string(),
        }
    }
}

/// A function call with an ordered argument list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct FunctionCall {
    pub name: String,
    pub args: ExpressionList,
    pub return_type: Option<ValueType>,
}

impl FunctionCall {
    pub fn new(name: &str, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args: ExpressionList::new(args),
            return_type: None,
        }
    }

    pub fn with_return_type(mut self, value_type: ValueType) -> Self {
        self.return_type = Some(value_type);
        self
    }

    /// Inferred return type.
    ///
    /// A declared return type wins. Otherwise `round` is a float unless
    /// called with no arguments (then an integer), `age_range` inherits the
    /// type of its second argument, `first_value`/`last_value` inherit the
    /// type of their first argument, and everything else inherits the common
    /// type of its argument list.
    pub fn value_type(&self) -> Option<ValueType> {
        if let Some(declared) = self.return_type {
            return Some(declared);
        }
        match self.name.as_str() {
            "round" => Some(if self.args.items.is_empty() {
                ValueType::Integer
            } else {
                ValueType::Float
            }),
            "age_range" => self.args.items.get(1).and_then(Expression::value_type),
            "first_value" | "last_value" => {
                self.args.items.first().and_then(Expression::value_type)
            }
            _ => self.args.value_type(),
        }
    }
}

/// An ordered, immutable sequence of sub-expressions.
///
/// Used both as function-argument lists and as ad hoc arithmetic (unary
/// negation is the two-element list `[raw "-", expr]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionList {
    pub items: Vec<Expression>,
}

impl ExpressionList {
    pub fn new(items: Vec<Expression>) -> Self {
        Self { items }
    }

    /// Space-joined concatenation of each sub-expression's name, trimmed.
    pub fn name(&self) -> String {
        self.items
            .iter()
            .map(Expression::name)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// The common type of all sub-expressions, or `None` on conflict.
    ///
    /// Short-circuits the moment two differing non-null types are seen; no
    /// majority voting, no first-wins.
    pub fn value_type(&self) -> Option<ValueType> {
        let mut common = None;
        for item in &self.items {
            match (common, item.value_type()) {
                (_, None) => {}
                (None, Some(t)) => common = Some(t),
                (Some(c), Some(t)) if c == t => {}
                (Some(_), Some(_)) => return None,
            }
        }
        common
    }
}

// =============================================================================
// Filter conditions
// =============================================================================

/// The right-hand side of a filter condition.
///
/// The variants matter for leaf counting: an `in` condition carries a
/// [`FilterValue::List`] and still counts as one leaf, while an `and`/`or`
/// condition carries [`FilterValue::Conditions`] and counts its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Scalar(Value),
    List(Vec<Value>),
    Conditions(Vec<FilterCondition>),
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<Vec<Value>> for FilterValue {
    fn from(values: Vec<Value>) -> Self {
        FilterValue::List(values)
    }
}

/// One filter condition: an optional expression, an operator, and a value.
///
/// When the operator is `and`/`or` and the value is a condition list, the
/// condition is a boolean tree whose leaves are themselves conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub expression: Option<Expression>,
    pub operator: String,
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn leaf(expression: Expression, operator: &str, value: impl Into<FilterValue>) -> Self {
        Self {
            expression: Some(expression),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// An `and` tree over the given conditions.
    pub fn all(conditions: Vec<FilterCondition>) -> Self {
        Self {
            expression: None,
            operator: "and".into(),
            value: FilterValue::Conditions(conditions),
        }
    }

    /// An `or` tree over the given conditions.
    pub fn any(conditions: Vec<FilterCondition>) -> Self {
        Self {
            expression: None,
            operator: "or".into(),
            value: FilterValue::Conditions(conditions),
        }
    }

    /// Number of leaf conditions under this node.
    ///
    /// Recursion is operator-driven, not shape-driven: only `and`/`or` over a
    /// condition list descends. An `in` condition with a list value is one
    /// leaf, not N.
    pub fn leaf_count(&self) -> usize {
        match (&self.operator[..], &self.value) {
            ("and" | "or", FilterValue::Conditions(children)) => {
                children.iter().map(FilterCondition::leaf_count).sum()
            }
            _ => 1,
        }
    }
}

// =============================================================================
// Expression
// =============================================================================

/// A report expression.
///
/// Every variant must be handled in `name()`, `value_type()` and
/// `select_alias()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Field(FieldReference),
    Constant(Constant),
    Function(FunctionCall),
    List(ExpressionList),
    Condition(Box<FilterCondition>),
}

impl Expression {
    /// Human-readable label for the expression.
    pub fn name(&self) -> String {
        match self {
            Expression::Field(f) => f.display_name.clone().unwrap_or_default(),
            Expression::Constant(c) => c.text(),
            Expression::Function(f) => f.name.clone(),
            Expression::List(l) => l.name(),
            Expression::Condition(c) => {
                c.expression.as_ref().map(Expression::name).unwrap_or_default()
            }
        }
    }

    /// Inferred value type, or `None` when ambiguous or unknowable.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Expression::Field(f) => f.value_type,
            Expression::Constant(_) => None,
            Expression::Function(f) => f.value_type(),
            Expression::List(l) => l.value_type(),
            Expression::Condition(_) => None,
        }
    }

    /// Default SQL column alias when no explicit alias is given.
    pub fn select_alias(&self) -> String {
        match self {
            Expression::Field(f) => sanitize_identifier(&f.field),
            Expression::Constant(_) => "formula".into(),
            Expression::Function(_) => "function".into(),
            Expression::List(_) => "formula".into(),
            Expression::Condition(_) => "formula".into(),
        }
    }

    /// Whether the expression may appear in a totals/subtotals row.
    pub fn summarizable(&self) -> bool {
        match self {
            Expression::Field(f) => f.summarizable,
            Expression::Function(f) => SUMMARIZABLE_FUNCTIONS.contains(f.name.as_str()),
            Expression::Constant(_) | Expression::List(_) | Expression::Condition(_) => false,
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// A plain field reference.
pub fn field(table: &Table, name: &str) -> Expression {
    Expression::Field(FieldReference::new(table.clone(), name))
}

/// A field reference with a declared value type.
pub fn typed_field(table: &Table, name: &str, value_type: ValueType) -> Expression {
    Expression::Field(FieldReference::new(table.clone(), name).with_type(value_type))
}

/// A quoted/escaped literal.
pub fn constant(value: impl Into<Value>) -> Expression {
    Expression::Constant(Constant::new(value))
}

/// A raw SQL fragment. Never pass user input here.
pub fn raw(fragment: &str) -> Expression {
    Expression::Constant(Constant::raw(fragment))
}

/// A function call.
pub fn func(name: &str, args: Vec<Expression>) -> Expression {
    Expression::Function(FunctionCall::new(name, args))
}

/// Unary negation, encoded as the list `[raw "-", expr]`.
pub fn negate(expr: Expression) -> Expression {
    Expression::List(ExpressionList::new(vec![raw("-"), expr]))
}
