#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sluice::{
        Binder, Encoded, InferencePolicy, Record, SluiceError, StructField, Value, WireType,
    };
    use std::str::FromStr;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    const UUID_LIKE: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn kind(error: &sluice::Error) -> &SluiceError {
        error
            .downcast_ref::<SluiceError>()
            .expect("Expected a typed sluice error")
    }

    #[test]
    fn scalars() {
        let bindings = Binder::new()
            .bind([
                ("flag", Value::from(true)),
                ("count", Value::from(7)),
                ("ratio", Value::from(0.25_f64)),
                ("small", Value::from(1.5_f32)),
                ("price", Value::from(Decimal::from_str("9.99").unwrap())),
                ("name", Value::from("bob")),
                ("raw", Value::Blob(Some(Box::new([0xff])))),
                ("day", Value::from(date!(2020 - 01 - 31))),
                ("at", Value::from(datetime!(2020-01-31 23:59:59 UTC))),
                ("id", Value::from(Uuid::from_str(UUID_LIKE).unwrap())),
            ])
            .unwrap();
        assert_eq!(bindings.len(), 10);
        assert_eq!(
            bindings
                .types()
                .map(|(n, t)| (n.to_string(), t.clone()))
                .collect::<Vec<_>>(),
            [
                ("flag".to_string(), WireType::Bool),
                ("count".to_string(), WireType::Int64),
                ("ratio".to_string(), WireType::Float64),
                ("small".to_string(), WireType::Float32),
                ("price".to_string(), WireType::Numeric),
                ("name".to_string(), WireType::String),
                ("raw".to_string(), WireType::Bytes),
                ("day".to_string(), WireType::Date),
                ("at".to_string(), WireType::Timestamp),
                ("id".to_string(), WireType::Uuid),
            ]
        );
        let count = bindings.get("count").unwrap();
        assert_eq!(count.value(), &Value::Int64(Some(7)));
        assert_eq!(count.encoded(), &Encoded::String("7".into()));
        assert_eq!(
            bindings.get("raw").unwrap().encoded(),
            &Encoded::String("/w==".into())
        );
        assert_eq!(
            bindings.get("at").unwrap().encoded(),
            &Encoded::String("2020-01-31T23:59:59Z".into())
        );
        assert!(bindings.get("missing").is_none());
    }

    #[test]
    fn strings_are_never_sniffed() {
        for text in [
            UUID_LIKE,
            "550E8400-E29B-41D4-A716-446655440000",
            "550e8400e29b41d4a716446655440000",
            "2024-01-01T00:00:00Z",
            "2024-01-01",
            "12345",
            "-1.5e10",
            "true",
            "",
        ] {
            let bindings = Binder::new().bind([("v", text)]).unwrap();
            let binding = bindings.get("v").unwrap();
            assert_eq!(binding.ty(), &WireType::String, "`{text}` was promoted");
            assert_eq!(binding.value(), &Value::Varchar(Some(text.into())));
            assert_eq!(binding.encoded(), &Encoded::String(text.into()));
        }
    }

    #[test]
    fn struct_with_uuid_like_string() {
        let bindings = Binder::new()
            .bind([("value", Record::new().field("v", UUID_LIKE))])
            .unwrap();
        let binding = bindings.get("value").unwrap();
        assert_eq!(
            binding.ty(),
            &WireType::Struct(vec![StructField::new("v", WireType::String)])
        );
        assert_eq!(
            binding.encoded(),
            &Encoded::List(vec![Encoded::String(UUID_LIKE.into())])
        );
        assert_eq!(binding.encoded().decode(binding.ty()).unwrap(), *binding.value());
    }

    #[test]
    fn struct_shape() {
        let bindings = Binder::new()
            .bind([("s", Record::new().field("a", 1).field("b", "x"))])
            .unwrap();
        let WireType::Struct(fields) = bindings.get("s").unwrap().ty() else {
            panic!("Expected a struct type");
        };
        assert_eq!(
            fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );
        assert_eq!(
            fields.iter().map(|f| f.ty.clone()).collect::<Vec<_>>(),
            [WireType::Int64, WireType::String]
        );

        let nested = Record::new()
            .field("z", Record::new().field("inner", 2.5_f64))
            .field("a", vec!["p", "q"].into_iter().map(String::from).collect::<Vec<_>>());
        let bindings = Binder::new().bind([("n", nested)]).unwrap();
        assert_eq!(
            bindings.get("n").unwrap().ty().to_string(),
            "STRUCT<z STRUCT<inner FLOAT64>, a ARRAY<STRING>>"
        );
    }

    #[test]
    fn override_wins() {
        let uuid = Uuid::from_str(UUID_LIKE).unwrap();
        let cases = [
            (Value::from("42"), WireType::Int64, Value::Int64(Some(42))),
            (Value::from(UUID_LIKE), WireType::Uuid, Value::Uuid(Some(uuid))),
            (Value::from(42), WireType::String, Value::Varchar(Some("42".into()))),
            (Value::from(42), WireType::Float64, Value::Float64(Some(42.0))),
            (Value::from(42), WireType::Numeric, Value::Numeric(Some(Decimal::from(42)))),
            (Value::from(2.5_f32), WireType::Float64, Value::Float64(Some(2.5))),
            (Value::from("2021-06-01"), WireType::Date, Value::Date(Some(date!(2021 - 06 - 01)))),
            (Value::Int64(None), WireType::String, Value::Varchar(None)),
            (Value::Null, WireType::Timestamp, Value::Timestamp(None)),
            (Value::from(uuid), WireType::String, Value::Varchar(Some(UUID_LIKE.into()))),
        ];
        for (value, ty, expected) in cases {
            let bindings = Binder::new()
                .bind_with([("p", value.clone())], [("p", ty.clone())])
                .unwrap();
            let binding = bindings.get("p").unwrap();
            assert_eq!(binding.ty(), &ty, "{value:?} as {ty}");
            assert_eq!(binding.value(), &expected, "{value:?} as {ty}");
            assert_eq!(binding.encoded().decode(&ty).unwrap(), expected);
        }
    }

    #[test]
    fn override_impossible_conversion() {
        for (value, ty) in [
            (Value::from("not a number"), WireType::Int64),
            (Value::from("abc"), WireType::Uuid),
            (Value::from(true), WireType::Date),
            (Value::Blob(Some(Box::new([1]))), WireType::String),
            (Value::from(vec![1_i64]), WireType::Int64),
            (Value::from(1), WireType::structure([("a", WireType::Int64)])),
        ] {
            let error = Binder::new()
                .bind_with([("p", value.clone())], [("p", ty.clone())])
                .expect_err(&format!("{value:?} must not convert to {ty}"));
            assert!(kind(&error).is_mismatch(), "{error}");
        }
    }

    #[test]
    fn struct_field_override() {
        let record = Record::new().field("id", UUID_LIKE).field("n", 1);
        let bindings = Binder::new()
            .bind_with(
                [("value", record.clone())],
                [("value", WireType::structure([("id", WireType::Uuid)]))],
            )
            .unwrap();
        let binding = bindings.get("value").unwrap();
        assert_eq!(
            binding.ty(),
            &WireType::structure([("id", WireType::Uuid), ("n", WireType::Int64)])
        );
        assert_eq!(
            binding.value(),
            &Value::Struct(Some(
                Record::new()
                    .field("id", Uuid::from_str(UUID_LIKE).unwrap())
                    .field("n", 1)
            ))
        );

        // The explicit workaround of the original report keeps the field a string.
        let bindings = Binder::with_policy(InferencePolicy::Lexical)
            .bind_with(
                [("value", record.clone())],
                [("value", WireType::structure([("id", WireType::String)]))],
            )
            .unwrap();
        assert_eq!(
            bindings.get("value").unwrap().ty(),
            &WireType::structure([("id", WireType::String), ("n", WireType::Int64)])
        );

        let error = Binder::new()
            .bind_with(
                [("value", record)],
                [("value", WireType::structure([("missing", WireType::Bool)]))],
            )
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Type mismatch for `value.missing`: expected BOOL, found no such field"
        );
    }

    #[test]
    fn array_of_struct_field_override() {
        const OTHER: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        let records = vec![
            Record::new().field("id", UUID_LIKE).field("n", 1),
            Record::new().field("id", OTHER).field("n", 2),
        ];
        let bindings = Binder::new()
            .bind_with(
                [("rows", Value::from(records.clone()))],
                [(
                    "rows",
                    WireType::array(WireType::structure([("id", WireType::Uuid)])),
                )],
            )
            .unwrap();
        let binding = bindings.get("rows").unwrap();
        assert_eq!(binding.ty().to_string(), "ARRAY<STRUCT<id UUID, n INT64>>");
        let Value::Array(Some(values), ..) = binding.value() else {
            panic!("Expected an array value");
        };
        assert_eq!(
            *values,
            [UUID_LIKE, OTHER].map(|id| Value::Struct(Some(
                Record::new()
                    .field("id", Uuid::from_str(id).unwrap())
                    .field("n", if id == UUID_LIKE { 1 } else { 2 })
            )))
        );
        assert_eq!(binding.encoded().decode(binding.ty()).unwrap(), *binding.value());

        let error = Binder::new()
            .bind_with(
                [("rows", Value::from(records))],
                [(
                    "rows",
                    WireType::array(WireType::structure([("missing", WireType::Bool)])),
                )],
            )
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Type mismatch for `rows[0].missing`: expected BOOL, found no such field"
        );
    }

    #[test]
    fn null_struct_needs_a_type() {
        let error = Binder::new()
            .bind([("s", Value::Struct(None))])
            .unwrap_err();
        assert!(kind(&error).is_unresolvable());
        let ty = WireType::structure([("a", WireType::Int64)]);
        let bindings = Binder::new()
            .bind_with([("s", Value::Struct(None))], [("s", ty.clone())])
            .unwrap();
        let binding = bindings.get("s").unwrap();
        assert_eq!(binding.ty(), &ty);
        assert_eq!(binding.value(), &Value::Struct(None));
        assert_eq!(binding.encoded(), &Encoded::Null);
    }

    #[test]
    fn unresolvable() {
        let error = Binder::new().bind([("x", Value::Null)]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot resolve the type of `x`: untyped null"
        );
        let error = Binder::new()
            .bind([("s", Record::new().field("a", 1).field("b", Value::Null))])
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot resolve the type of `s.b`: untyped null"
        );
        let error = Binder::new()
            .bind([("a", Value::Array(Some(vec![]), Box::new(Value::Null)))])
            .unwrap_err();
        assert!(kind(&error).is_unresolvable());
        let error = Binder::new()
            .bind([(
                "a",
                Value::Array(
                    Some(vec![Value::from(1), Value::from("two")]),
                    Box::new(Value::Null),
                ),
            )])
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot resolve the type of `a[1]`: element of type STRING in an array of INT64"
        );
        let error = Binder::new()
            .bind([(
                "a",
                Value::Array(Some(vec![Value::from("x")]), Box::new(Value::Int64(None))),
            )])
            .unwrap_err();
        assert!(kind(&error).is_unresolvable());
    }

    #[test]
    fn arrays() {
        let bindings = Binder::new()
            .bind([
                ("typed", Value::from(Vec::<i64>::new())),
                (
                    "untyped",
                    Value::Array(
                        Some(vec![Value::Null, Value::from(true)]),
                        Box::new(Value::Null),
                    ),
                ),
                (
                    "records",
                    Value::from(vec![
                        Record::new().field("k", "a"),
                        Record::new().field("k", "b"),
                    ]),
                ),
            ])
            .unwrap();
        assert_eq!(
            bindings.get("typed").unwrap().ty(),
            &WireType::array(WireType::Int64)
        );
        assert_eq!(
            bindings.get("untyped").unwrap().ty(),
            &WireType::array(WireType::Bool)
        );
        assert_eq!(
            bindings.get("untyped").unwrap().encoded(),
            &Encoded::List(vec![Encoded::Null, Encoded::Bool(true)])
        );
        assert_eq!(
            bindings.get("records").unwrap().ty(),
            &WireType::array(WireType::structure([("k", WireType::String)]))
        );
    }

    #[test]
    fn lexical_policy_is_opt_in() {
        assert_eq!(Binder::new().policy(), InferencePolicy::Declared);
        let bindings = Binder::with_policy(InferencePolicy::Lexical)
            .bind([
                ("id", Value::from(UUID_LIKE)),
                ("name", Value::from("bob")),
                ("s", Value::from(Record::new().field("v", UUID_LIKE))),
            ])
            .unwrap();
        let id = bindings.get("id").unwrap();
        assert_eq!(id.ty(), &WireType::Uuid);
        assert_eq!(id.value(), &Value::Uuid(Some(Uuid::from_str(UUID_LIKE).unwrap())));
        assert_eq!(id.encoded(), &Encoded::String(UUID_LIKE.into()));
        assert_eq!(bindings.get("name").unwrap().ty(), &WireType::String);
        assert_eq!(
            bindings.get("s").unwrap().ty(),
            &WireType::structure([("v", WireType::Uuid)])
        );
    }

    #[test]
    fn lexical_arrays_promote_all_or_nothing() {
        let binder = Binder::with_policy(InferencePolicy::Lexical);
        let untyped = |items: &[&str]| {
            Value::Array(
                Some(items.iter().map(|v| Value::from(*v)).collect()),
                Box::new(Value::Null),
            )
        };
        let bindings = binder
            .bind([
                ("mixed", untyped(&[UUID_LIKE, "plain"])),
                ("ids", untyped(&[UUID_LIKE, UUID_LIKE])),
                ("leading", untyped(&["plain", UUID_LIKE])),
            ])
            .unwrap();
        let mixed = bindings.get("mixed").unwrap();
        assert_eq!(mixed.ty(), &WireType::array(WireType::String));
        assert_eq!(
            mixed.encoded(),
            &Encoded::List(vec![
                Encoded::String(UUID_LIKE.into()),
                Encoded::String("plain".into()),
            ])
        );
        assert_eq!(
            bindings.get("leading").unwrap().ty(),
            &WireType::array(WireType::String)
        );
        let ids = bindings.get("ids").unwrap();
        assert_eq!(ids.ty(), &WireType::array(WireType::Uuid));
        let Value::Array(Some(values), ..) = ids.value() else {
            panic!("Expected an array value");
        };
        assert!(values.iter().all(|v| matches!(v, Value::Uuid(Some(..)))));

        // Disagreeing elements are still rejected when promotion is not involved
        let error = binder
            .bind([(
                "a",
                Value::Array(
                    Some(vec![Value::from(UUID_LIKE), Value::from(1)]),
                    Box::new(Value::Null),
                ),
            )])
            .unwrap_err();
        assert!(kind(&error).is_unresolvable());
    }

    #[test]
    fn binding_errors() {
        let error = Binder::new()
            .bind([("a", 1), ("a", 2)])
            .unwrap_err();
        assert_eq!(error.to_string(), "Parameter `a` is bound more than once");
        let error = Binder::new()
            .bind_with([("a", 1)], [("b", WireType::Int64)])
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "A type was supplied for `b` but no such parameter is bound"
        );
        assert!(Binder::new().bind(Vec::<(String, Value)>::new()).unwrap().is_empty());
    }
}
