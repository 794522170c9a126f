use crate::{Value, separated_by};
use std::fmt::{self, Display, Formatter, Write};

/// Type tag transmitted with every bound parameter.
///
/// The execution service interprets the [`crate::Encoded`] form of a parameter exclusively
/// through this tag, a missing or wrong tag is a query failure on the server side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    Bool,
    Int64,
    Float32,
    Float64,
    Numeric,
    String,
    Bytes,
    Date,
    Timestamp,
    Uuid,
    Array(Box<WireType>),
    Struct(Vec<StructField>),
}

/// Named member of a [`WireType::Struct`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    pub name: String,
    pub ty: WireType,
}

impl StructField {
    pub fn new(name: impl Into<String>, ty: WireType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl WireType {
    pub fn array(element: WireType) -> Self {
        WireType::Array(Box::new(element))
    }

    /// Struct type from `(name, type)` pairs, in declaration order.
    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, WireType)>) -> Self {
        WireType::Struct(
            fields
                .into_iter()
                .map(|(name, ty)| StructField::new(name, ty))
                .collect(),
        )
    }

    /// Type code as the service names it.
    pub fn code(&self) -> &'static str {
        match self {
            WireType::Bool => "BOOL",
            WireType::Int64 => "INT64",
            WireType::Float32 => "FLOAT32",
            WireType::Float64 => "FLOAT64",
            WireType::Numeric => "NUMERIC",
            WireType::String => "STRING",
            WireType::Bytes => "BYTES",
            WireType::Date => "DATE",
            WireType::Timestamp => "TIMESTAMP",
            WireType::Uuid => "UUID",
            WireType::Array(..) => "ARRAY",
            WireType::Struct(..) => "STRUCT",
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, WireType::Array(..) | WireType::Struct(..))
    }

    pub fn field(&self, name: &str) -> Option<&StructField> {
        match self {
            WireType::Struct(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Typed null matching this wire type.
    pub fn empty_value(&self) -> Value {
        match self {
            WireType::Bool => Value::Boolean(None),
            WireType::Int64 => Value::Int64(None),
            WireType::Float32 => Value::Float32(None),
            WireType::Float64 => Value::Float64(None),
            WireType::Numeric => Value::Numeric(None),
            WireType::String => Value::Varchar(None),
            WireType::Bytes => Value::Blob(None),
            WireType::Date => Value::Date(None),
            WireType::Timestamp => Value::Timestamp(None),
            WireType::Uuid => Value::Uuid(None),
            WireType::Array(element) => Value::Array(None, Box::new(element.empty_value())),
            WireType::Struct(..) => Value::Struct(None),
        }
    }
}

impl Display for WireType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Array(element) => write!(f, "ARRAY<{element}>"),
            WireType::Struct(fields) => {
                let mut out = String::from("STRUCT<");
                separated_by(
                    &mut out,
                    fields,
                    |out, field| {
                        let _ = write!(out, "{} {}", field.name, field.ty);
                    },
                    ", ",
                );
                out.push('>');
                f.write_str(&out)
            }
            _ => f.write_str(self.code()),
        }
    }
}
