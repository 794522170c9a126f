use rust_decimal::Decimal;
use sluice::{Binder, BindingSet, Executor, Query, Value, WireType};
use std::str::FromStr;
use time::macros::{date, datetime};
use uuid::Uuid;

const UUID_LIKE: &str = "550e8400-e29b-41d4-a716-446655440000";

async fn select<E: Executor>(executor: &mut E, sql: &str, bindings: BindingSet) -> Value {
    let rows = executor
        .run(Query::with_bindings(sql, bindings))
        .await
        .expect("Failed to select the parameter");
    assert_eq!(rows.len(), 1, "Expected exactly one row from `{sql}`");
    let row = rows
        .into_iter()
        .next()
        .flatten()
        .expect("Unexpected absence marker");
    assert_eq!(row.values().len(), 1);
    row.values()[0].clone()
}

pub async fn parameters<E: Executor>(executor: &mut E) {
    let binder = Binder::new();

    // A string stays a string whatever it looks like
    for text in [UUID_LIKE, "2024-01-01T00:00:00Z", "12345", "true"] {
        let bindings = binder.bind([("p", text)]).expect("Failed to bind a string");
        assert_eq!(
            select(executor, "SELECT @p AS p", bindings).await,
            Value::Varchar(Some(text.into()))
        );
    }

    let bindings = binder
        .bind([
            ("n", Value::from(-42)),
            ("d", Value::from(Decimal::from_str("12.50").unwrap())),
            ("day", Value::from(date!(1999 - 12 - 31))),
            ("at", Value::from(datetime!(2024-05-01 12:00:00.5 UTC))),
            ("id", Value::from(Uuid::new_v4())),
            ("f", Value::from(f64::INFINITY)),
        ])
        .expect("Failed to bind the scalars");
    for (name, binding) in bindings.iter() {
        assert_eq!(
            select(executor, &format!("SELECT @{name} AS {name}"), bindings.clone()).await,
            *binding.value(),
            "Parameter `{name}` did not survive the round trip"
        );
    }

    // Overrides
    let bindings = binder
        .bind_with([("id", UUID_LIKE)], [("id", WireType::Uuid)])
        .expect("Failed to bind with a UUID override");
    assert_eq!(
        select(executor, "SELECT @id AS id", bindings).await,
        Value::Uuid(Some(Uuid::from_str(UUID_LIKE).unwrap()))
    );
    let bindings = binder
        .bind_with([("t", Value::Null)], [("t", WireType::Timestamp)])
        .expect("Failed to bind a typed null");
    assert_eq!(
        select(executor, "SELECT @t AS t", bindings).await,
        Value::Timestamp(None)
    );
    let bindings = binder
        .bind([("a", vec![1_i64, 2, 3])])
        .expect("Failed to bind an array");
    assert_eq!(
        select(executor, "SELECT @a AS a", bindings).await,
        Value::from(vec![1_i64, 2, 3])
    );

    // Unbound parameter
    let result;
    crate::silent_logs! {
        result = executor.run("SELECT @missing AS m".into()).await;
    }
    assert!(result.is_err(), "Selecting an unbound parameter must fail");
}

#[cfg(not(feature = "disable-struct-parameters"))]
pub async fn struct_parameters<E: Executor>(executor: &mut E) {
    use sluice::Record;

    let binder = Binder::new();

    // A UUID looking field of a struct is still a string
    let bindings = binder
        .bind([("value", Record::new().field("v", UUID_LIKE))])
        .expect("Failed to bind the struct");
    assert_eq!(
        bindings.get("value").unwrap().ty(),
        &WireType::structure([("v", WireType::String)])
    );
    assert_eq!(
        select(executor, "SELECT @value.v AS v", bindings).await,
        Value::Varchar(Some(UUID_LIKE.into()))
    );

    let record = Record::new()
        .field("id", UUID_LIKE)
        .field("count", 3)
        .field("tags", vec!["a".to_string(), "b".to_string()]);
    let bindings = binder
        .bind_with(
            [("value", record)],
            [("value", WireType::structure([("id", WireType::Uuid)]))],
        )
        .expect("Failed to bind the struct with a field override");
    assert_eq!(
        select(executor, "SELECT @value.id AS id", bindings.clone()).await,
        Value::Uuid(Some(Uuid::from_str(UUID_LIKE).unwrap()))
    );
    assert_eq!(
        select(executor, "SELECT @value.count AS count", bindings.clone()).await,
        Value::Int64(Some(3))
    );
    assert_eq!(
        select(executor, "SELECT @value.tags AS tags", bindings).await,
        Value::from(vec!["a".to_string(), "b".to_string()])
    );

    // Null struct with a type
    let bindings = binder
        .bind_with(
            [("value", Value::Struct(None))],
            [("value", WireType::structure([("v", WireType::String)]))],
        )
        .expect("Failed to bind a typed null struct");
    assert_eq!(
        select(executor, "SELECT @value.v AS v", bindings).await,
        Value::Varchar(None)
    );
}
