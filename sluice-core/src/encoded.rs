use crate::{Result, SluiceError, Value, WireType};
use base64::{Engine, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Serialized form of a parameter or of a field, as carried on the wire.
///
/// The representation is deliberately poor (it mirrors a JSON-like protocol value): the
/// [`WireType`] sent alongside is the only thing telling the service how to read it.
///
/// | type | encoding |
/// |---|---|
/// | `INT64`, `NUMERIC` | decimal string |
/// | `FLOAT32`, `FLOAT64` | number, or `"NaN"`, `"Infinity"`, `"-Infinity"` |
/// | `BYTES` | standard base64 string |
/// | `DATE` | `YYYY-MM-DD` |
/// | `TIMESTAMP` | RFC 3339 in UTC |
/// | `UUID` | hyphenated lowercase string |
/// | `ARRAY`, `STRUCT` | list (struct fields in declaration order) |
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Encoded>),
}

impl Encoded {
    pub fn kind(&self) -> &'static str {
        match self {
            Encoded::Null => "null",
            Encoded::Bool(..) => "bool",
            Encoded::Number(..) => "number",
            Encoded::String(..) => "string",
            Encoded::List(..) => "list",
        }
    }

    /// Encode a value according to its own variant.
    pub fn encode(value: &Value) -> Result<Encoded> {
        Ok(match value {
            v if v.is_null() => Encoded::Null,
            Value::Boolean(Some(v)) => Encoded::Bool(*v),
            Value::Int64(Some(v)) => Encoded::String(v.to_string()),
            Value::Float32(Some(v)) => encode_float(*v as f64),
            Value::Float64(Some(v)) => encode_float(*v),
            Value::Numeric(Some(v)) => Encoded::String(v.to_string()),
            Value::Varchar(Some(v)) => Encoded::String(v.clone()),
            Value::Blob(Some(v)) => Encoded::String(STANDARD.encode(v)),
            Value::Date(Some(v)) => Encoded::String(v.format(DATE_FORMAT)?),
            Value::Timestamp(Some(v)) => {
                Encoded::String(v.to_offset(UtcOffset::UTC).format(&Rfc3339)?)
            }
            Value::Uuid(Some(v)) => Encoded::String(v.hyphenated().to_string()),
            Value::Array(Some(values), ..) => Encoded::List(
                values
                    .iter()
                    .map(Encoded::encode)
                    .collect::<Result<_>>()?,
            ),
            Value::Struct(Some(record)) => Encoded::List(
                record
                    .iter()
                    .map(|(_, v)| Encoded::encode(v))
                    .collect::<Result<_>>()?,
            ),
            _ => Encoded::Null,
        })
    }

    /// Read the encoded form back as the value described by `ty`.
    ///
    /// Fails with [`SluiceError::TypeMismatch`] when the form cannot be a `ty`.
    pub fn decode(&self, ty: &WireType) -> Result<Value> {
        self.decode_at("", ty)
    }

    pub fn decode_at(&self, path: &str, ty: &WireType) -> Result<Value> {
        let mismatch = || SluiceError::mismatch(path, ty, self.kind());
        let invalid = |text: &str| SluiceError::mismatch(path, ty, format!("string `{text}`"));
        Ok(match (self, ty) {
            (Encoded::Null, ty) => ty.empty_value(),
            (Encoded::Bool(v), WireType::Bool) => Value::Boolean(Some(*v)),
            (Encoded::String(v), WireType::Int64) => {
                Value::Int64(Some(v.parse().map_err(|_| invalid(v))?))
            }
            (Encoded::Number(v), WireType::Float64) => Value::Float64(Some(*v)),
            (Encoded::Number(v), WireType::Float32) => Value::Float32(Some(*v as f32)),
            (Encoded::String(v), WireType::Float64) => {
                Value::Float64(Some(decode_float(v).ok_or_else(|| invalid(v))?))
            }
            (Encoded::String(v), WireType::Float32) => {
                Value::Float32(Some(decode_float(v).ok_or_else(|| invalid(v))? as f32))
            }
            (Encoded::String(v), WireType::Numeric) => {
                Value::Numeric(Some(Decimal::from_str(v).map_err(|_| invalid(v))?))
            }
            (Encoded::String(v), WireType::String) => Value::Varchar(Some(v.clone())),
            (Encoded::String(v), WireType::Bytes) => Value::Blob(Some(
                STANDARD
                    .decode(v)
                    .map_err(|_| invalid(v))?
                    .into_boxed_slice(),
            )),
            (Encoded::String(v), WireType::Date) => {
                Value::Date(Some(Date::parse(v, DATE_FORMAT).map_err(|_| invalid(v))?))
            }
            (Encoded::String(v), WireType::Timestamp) => Value::Timestamp(Some(
                OffsetDateTime::parse(v, &Rfc3339).map_err(|_| invalid(v))?,
            )),
            (Encoded::String(v), WireType::Uuid) => {
                Value::Uuid(Some(Uuid::try_parse(v).map_err(|_| invalid(v))?))
            }
            (Encoded::List(values), WireType::Array(element)) => Value::Array(
                Some(
                    values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| v.decode_at(&format!("{path}[{i}]"), element))
                        .collect::<Result<_>>()?,
                ),
                Box::new(element.empty_value()),
            ),
            (Encoded::List(values), WireType::Struct(fields)) => {
                if values.len() != fields.len() {
                    return Err(SluiceError::mismatch(
                        path,
                        ty,
                        format!("list of {} values", values.len()),
                    )
                    .into());
                }
                Value::Struct(Some(
                    fields
                        .iter()
                        .zip(values)
                        .map(|(field, v)| {
                            let path = format!("{path}.{}", field.name);
                            Ok((field.name.clone(), v.decode_at(&path, &field.ty)?))
                        })
                        .collect::<Result<Vec<(String, Value)>>>()?
                        .into_iter()
                        .collect(),
                ))
            }
            _ => return Err(mismatch().into()),
        })
    }
}

fn encode_float(value: f64) -> Encoded {
    if value.is_nan() {
        Encoded::String("NaN".into())
    } else if value.is_infinite() {
        Encoded::String(if value > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else {
        Encoded::Number(value)
    }
}

fn decode_float(value: &str) -> Option<f64> {
    match value {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}
