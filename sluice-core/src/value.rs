use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Dynamically typed value used for query parameters and row fields.
///
/// The variant is chosen when the value is constructed and is never reconsidered from the
/// content: a `Varchar` holding `"550e8400-e29b-41d4-a716-446655440000"` is a string.
/// Every typed variant wraps an `Option` so that a null still carries its type.
#[derive(Default, Debug, Clone)]
pub enum Value {
    /// Null without any type information.
    #[default]
    Null,
    Boolean(Option<bool>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Numeric(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Timestamp(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    Array(Option<Vec<Value>>, /* type: */ Box<Value>),
    Struct(Option<Record>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Numeric(l), Self::Numeric(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Array(l, ..), Self::Array(r, ..)) => l == r && self.same_type(other),
            (Self::Struct(l), Self::Struct(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Numeric(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Array(v, ..) => v.is_none(),
            Value::Struct(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(.., l), Self::Array(.., r)) => l.same_type(r),
            (Self::Struct(Some(l)), Self::Struct(Some(r))) => {
                l.len() == r.len()
                    && l.iter()
                        .zip(r.iter())
                        .all(|((ln, lv), (rn, rv))| ln == rn && lv.same_type(rv))
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "Boolean",
            Value::Int64(..) => "Int64",
            Value::Float32(..) => "Float32",
            Value::Float64(..) => "Float64",
            Value::Numeric(..) => "Numeric",
            Value::Varchar(..) => "Varchar",
            Value::Blob(..) => "Blob",
            Value::Date(..) => "Date",
            Value::Timestamp(..) => "Timestamp",
            Value::Uuid(..) => "Uuid",
            Value::Array(..) => "Array",
            Value::Struct(..) => "Struct",
        }
    }
}

/// Ordered named fields of a structured value.
///
/// Field order is the declaration order and is preserved all the way to the wire.
/// ```rust
/// use sluice_core::{Record, Value};
/// let record = Record::new().field("a", 1).field("b", "x");
/// assert_eq!(record.names().collect::<Vec<_>>(), ["a", "b"]);
/// assert_eq!(record.get("a"), Some(&Value::Int64(Some(1))));
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }
    /// Append a field, builder style.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(n, v)| if n == name { Some(v) } else { None })
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
