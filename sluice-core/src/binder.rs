use crate::{Encoded, Error, Record, Result, SluiceError, StructField, Value, WireType};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::{collections::HashMap, iter, str::FromStr};
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

/// How the binder derives a [`WireType`] when the caller did not supply one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InferencePolicy {
    /// The type comes from the value variant only.
    #[default]
    Declared,
    /// Like `Declared`, but a `Varchar` whose content parses as a UUID is promoted to
    /// `UUID`. The promoted type is transmitted explicitly like any other.
    Lexical,
}

/// A parameter ready for submission: value, wire type and serialized form, in agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    value: Value,
    ty: WireType,
    encoded: Encoded,
}

impl Binding {
    /// Assemble a binding from its parts as given, without any check.
    ///
    /// Drivers use this to replay bindings received from elsewhere; [`Binder`] is the way to
    /// build consistent ones.
    pub fn new(value: Value, ty: WireType, encoded: Encoded) -> Self {
        Self { value, ty, encoded }
    }
    pub fn value(&self) -> &Value {
        &self.value
    }
    pub fn ty(&self) -> &WireType {
        &self.ty
    }
    pub fn encoded(&self) -> &Encoded {
        &self.encoded
    }
}

/// Named parameters of one query, in binding order. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingSet {
    bindings: Vec<(String, Binding)>,
}

impl BindingSet {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find_map(|(n, b)| if n == name { Some(b) } else { None })
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(n, b)| (n.as_str(), b))
    }
    /// Parameter names with their wire types.
    pub fn types(&self) -> impl Iterator<Item = (&str, &WireType)> {
        self.bindings.iter().map(|(n, b)| (n.as_str(), &b.ty))
    }
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(String, Binding)> for BindingSet {
    fn from_iter<T: IntoIterator<Item = (String, Binding)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Builds [`BindingSet`]s from named values.
///
/// Types supplied by the caller always win. Without one, the type follows from the kind
/// the value was constructed with, never from what a string happens to look like (unless
/// [`InferencePolicy::Lexical`] is requested).
///
/// ```rust
/// use sluice_core::{Binder, Record, WireType};
/// let bindings = Binder::new()
///     .bind([("value", Record::new().field("v", "550e8400-e29b-41d4-a716-446655440000"))])
///     .unwrap();
/// assert_eq!(
///     bindings.get("value").unwrap().ty(),
///     &WireType::structure([("v", WireType::String)]),
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Binder {
    policy: InferencePolicy,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: InferencePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InferencePolicy {
        self.policy
    }

    pub fn bind<I, K, V>(&self, values: I) -> Result<BindingSet>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.bind_with(values, iter::empty::<(String, WireType)>())
    }

    /// Bind `values`, taking the wire type of the parameters named in `overrides` from there.
    ///
    /// A struct override only needs to name the fields it changes, the others are inferred.
    pub fn bind_with<I, K, V, O, N>(&self, values: I, overrides: O) -> Result<BindingSet>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
        O: IntoIterator<Item = (N, WireType)>,
        N: Into<String>,
    {
        let mut overrides: HashMap<String, WireType> = overrides
            .into_iter()
            .map(|(name, ty)| (name.into(), ty))
            .collect();
        let mut bindings: Vec<(String, Binding)> = Vec::new();
        for (name, value) in values {
            let name = name.into();
            let value = value.into();
            if bindings.iter().any(|(n, _)| *n == name) {
                return Err(Error::msg(format!("Parameter `{name}` is bound more than once")));
            }
            let ty = match overrides.remove(&name) {
                Some(ty) => self.merge(&name, &value, ty)?,
                None => self.infer(&name, &value)?,
            };
            let value = convert(&name, value, &ty)?;
            let encoded = Encoded::encode(&value)?;
            bindings.push((name, Binding { value, ty, encoded }));
        }
        if let Some(name) = overrides.keys().next() {
            return Err(Error::msg(format!(
                "A type was supplied for `{name}` but no such parameter is bound"
            )));
        }
        Ok(BindingSet { bindings })
    }

    /// Wire type of `value` from its variant alone.
    pub fn infer(&self, path: &str, value: &Value) -> Result<WireType> {
        Ok(match value {
            Value::Null => {
                return Err(SluiceError::unresolvable(path, "untyped null").into());
            }
            Value::Boolean(..) => WireType::Bool,
            Value::Int64(..) => WireType::Int64,
            Value::Float32(..) => WireType::Float32,
            Value::Float64(..) => WireType::Float64,
            Value::Numeric(..) => WireType::Numeric,
            Value::Varchar(v) => {
                if self.policy == InferencePolicy::Lexical
                    && let Some(v) = v
                    && Uuid::try_parse(v).is_ok()
                {
                    log::warn!("Parameter `{path}` promoted from STRING to UUID by its content");
                    WireType::Uuid
                } else {
                    WireType::String
                }
            }
            Value::Blob(..) => WireType::Bytes,
            Value::Date(..) => WireType::Date,
            Value::Timestamp(..) => WireType::Timestamp,
            Value::Uuid(..) => WireType::Uuid,
            Value::Array(values, prototype) => {
                let values = values.as_deref().unwrap_or_default();
                // A typed prototype is authoritative, the elements only have to agree with it.
                if let Ok(element) = self.infer(&format!("{path}[]"), prototype) {
                    if let Some((i, v)) = values
                        .iter()
                        .enumerate()
                        .find(|(_, v)| !matches!(v, Value::Null) && !v.same_type(prototype))
                    {
                        return Err(SluiceError::unresolvable(
                            format!("{path}[{i}]"),
                            format!("element of kind {} in an array of {element}", v.kind()),
                        )
                        .into());
                    }
                    return Ok(WireType::array(element));
                }
                let element = match self.element_type(path, values) {
                    // Promotion applies to the whole array or to none of it.
                    Err(e) if self.policy == InferencePolicy::Lexical => {
                        Binder::new().element_type(path, values).map_err(|_| e)?
                    }
                    element => element?,
                };
                WireType::array(element)
            }
            Value::Struct(None) => {
                return Err(SluiceError::unresolvable(path, "null struct without a type").into());
            }
            Value::Struct(Some(record)) => WireType::Struct(
                record
                    .iter()
                    .map(|(name, v)| {
                        let ty = self.infer(&format!("{path}.{name}"), v)?;
                        Ok(StructField::new(name, ty))
                    })
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Common type of the non null elements of an array without a typed prototype.
    fn element_type(&self, path: &str, values: &[Value]) -> Result<WireType> {
        let mut element = None;
        for (i, v) in values.iter().enumerate() {
            let path = format!("{path}[{i}]");
            let ty = match self.infer(&path, v) {
                Ok(ty) => ty,
                Err(..) if v.is_null() => continue,
                Err(e) => return Err(e),
            };
            match &element {
                None => element = Some(ty),
                Some(expected) if *expected == ty => {}
                Some(expected) => {
                    return Err(SluiceError::unresolvable(
                        path,
                        format!("element of type {ty} in an array of {expected}"),
                    )
                    .into());
                }
            }
        }
        element.ok_or_else(|| {
            SluiceError::unresolvable(path, "the array element type is unknown").into()
        })
    }

    /// Combine a caller supplied type with what can be inferred from `value`.
    fn merge(&self, path: &str, value: &Value, ty: WireType) -> Result<WireType> {
        match (value, &ty) {
            (Value::Struct(Some(record)), WireType::Struct(overrides)) => {
                if let Some(unknown) = overrides.iter().find(|f| record.get(&f.name).is_none()) {
                    return Err(SluiceError::mismatch(
                        format!("{path}.{}", unknown.name),
                        &unknown.ty,
                        "no such field",
                    )
                    .into());
                }
                Ok(WireType::Struct(
                    record
                        .iter()
                        .map(|(name, v)| {
                            let path = format!("{path}.{name}");
                            let ty = match overrides.iter().find(|f| f.name == name) {
                                Some(field) => self.merge(&path, v, field.ty.clone())?,
                                None => self.infer(&path, v)?,
                            };
                            Ok(StructField::new(name, ty))
                        })
                        .collect::<Result<_>>()?,
                ))
            }
            (Value::Array(Some(values), ..), WireType::Array(element)) => {
                let mut merged: Option<WireType> = None;
                for (i, v) in values.iter().enumerate() {
                    if v.is_null() {
                        continue;
                    }
                    let path = format!("{path}[{i}]");
                    let ty = self.merge(&path, v, (**element).clone())?;
                    match &merged {
                        None => merged = Some(ty),
                        Some(expected) if *expected == ty => {}
                        Some(expected) => {
                            return Err(SluiceError::unresolvable(
                                path,
                                format!("element of type {ty} in an array of {expected}"),
                            )
                            .into());
                        }
                    }
                }
                Ok(merged.map(WireType::array).unwrap_or(ty))
            }
            _ => Ok(ty),
        }
    }
}

/// Reshape `value` so that its variant is the one `ty` describes.
fn convert(path: &str, value: Value, ty: &WireType) -> Result<Value> {
    if value.is_null() {
        return Ok(ty.empty_value());
    }
    let mismatch =
        |value: &Value| -> Error { SluiceError::mismatch(path, ty, value.kind()).into() };
    Ok(match (value, ty) {
        (v @ Value::Boolean(..), WireType::Bool)
        | (v @ Value::Int64(..), WireType::Int64)
        | (v @ Value::Float32(..), WireType::Float32)
        | (v @ Value::Float64(..), WireType::Float64)
        | (v @ Value::Numeric(..), WireType::Numeric)
        | (v @ Value::Varchar(..), WireType::String)
        | (v @ Value::Blob(..), WireType::Bytes)
        | (v @ Value::Date(..), WireType::Date)
        | (v @ Value::Timestamp(..), WireType::Timestamp)
        | (v @ Value::Uuid(..), WireType::Uuid) => v,
        (Value::Varchar(Some(v)), ty) if ty.is_scalar() => parse_text(path, &v, ty)?,
        (v, WireType::String) => Value::Varchar(Some(text(&v).ok_or_else(|| mismatch(&v))?)),
        (Value::Int64(Some(v)), WireType::Float64) => Value::Float64(Some(v as f64)),
        (Value::Int64(Some(v)), WireType::Float32) => Value::Float32(Some(v as f32)),
        (Value::Int64(Some(v)), WireType::Numeric) => Value::Numeric(Some(v.into())),
        (Value::Float32(Some(v)), WireType::Float64) => Value::Float64(Some(v as f64)),
        (v @ Value::Float64(Some(f)), WireType::Numeric) => {
            Value::Numeric(Some(Decimal::try_from(f).map_err(|_| mismatch(&v))?))
        }
        (v @ Value::Numeric(Some(d)), WireType::Float64) => {
            Value::Float64(Some(d.to_f64().ok_or_else(|| mismatch(&v))?))
        }
        (Value::Array(Some(values), ..), WireType::Array(element)) => Value::Array(
            Some(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| convert(&format!("{path}[{i}]"), v, element))
                    .collect::<Result<_>>()?,
            ),
            Box::new(element.empty_value()),
        ),
        (Value::Struct(Some(record)), WireType::Struct(fields)) => {
            if record.len() != fields.len()
                || !record.names().eq(fields.iter().map(|f| f.name.as_str()))
            {
                let names = record.names().collect::<Vec<_>>().join(", ");
                return Err(SluiceError::mismatch(
                    path,
                    ty,
                    format!("struct with fields ({names})"),
                )
                .into());
            }
            Value::Struct(Some(
                record
                    .into_iter()
                    .zip(fields)
                    .map(|((name, v), field)| {
                        let v = convert(&format!("{path}.{name}"), v, &field.ty)?;
                        Ok((name, v))
                    })
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .collect::<Record>(),
            ))
        }
        (v, _) => return Err(mismatch(&v)),
    })
}

fn parse_text(path: &str, text: &str, ty: &WireType) -> Result<Value> {
    let invalid = || -> Error {
        SluiceError::mismatch(path, ty, format!("string `{text}`")).into()
    };
    Ok(match ty {
        WireType::Bool => Value::Boolean(Some(match text {
            "true" | "TRUE" => true,
            "false" | "FALSE" => false,
            _ => return Err(invalid()),
        })),
        WireType::Int64 => Value::Int64(Some(text.parse().map_err(|_| invalid())?)),
        WireType::Float32 => Value::Float32(Some(text.parse().map_err(|_| invalid())?)),
        WireType::Float64 => Value::Float64(Some(text.parse().map_err(|_| invalid())?)),
        WireType::Numeric => Value::Numeric(Some(Decimal::from_str(text).map_err(|_| invalid())?)),
        WireType::String => Value::Varchar(Some(text.into())),
        WireType::Date => Value::Date(Some(
            Date::parse(text, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())?,
        )),
        WireType::Timestamp => Value::Timestamp(Some(
            OffsetDateTime::parse(text, &Rfc3339).map_err(|_| invalid())?,
        )),
        WireType::Uuid => Value::Uuid(Some(Uuid::try_parse(text).map_err(|_| invalid())?)),
        _ => return Err(invalid()),
    })
}

fn text(value: &Value) -> Option<String> {
    Some(match value {
        Value::Boolean(Some(v)) => v.to_string(),
        Value::Int64(Some(v)) => v.to_string(),
        Value::Float32(Some(v)) => v.to_string(),
        Value::Float64(Some(v)) => v.to_string(),
        Value::Numeric(Some(v)) => v.to_string(),
        Value::Varchar(Some(v)) => v.clone(),
        Value::Date(Some(_)) | Value::Timestamp(Some(_)) => match Encoded::encode(value).ok()? {
            Encoded::String(v) => v,
            _ => return None,
        },
        Value::Uuid(Some(v)) => v.hyphenated().to_string(),
        _ => return None,
    })
}
