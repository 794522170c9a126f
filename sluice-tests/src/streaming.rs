use sluice::{
    Executor, Pull, Query, RowSource, RowSourceExt, Value,
    stream::{StreamExt, TryStreamExt},
};
use std::pin::pin;

const HUNDRED: &str = "SELECT x FROM UNNEST(GENERATE_ARRAY(0, 99)) AS x";

fn number(item: Option<sluice::RowLabeled>) -> i64 {
    let row = item.expect("Unexpected absence marker");
    assert_eq!(row.names(), ["x"]);
    match row.values() {
        [Value::Int64(Some(v))] => *v,
        values => panic!("Unexpected row {values:?}"),
    }
}

pub async fn streaming<E: Executor>(executor: &mut E) {
    // Async iteration, one item at a time
    {
        let mut stream = pin!(executor.run_stream(HUNDRED.into()));
        let mut count = 0;
        while let Some(item) = stream.next().await {
            let item = item.expect("Failed to stream the generated rows");
            assert_eq!(number(item), count);
            count += 1;
        }
        assert_eq!(count, 100);
    }

    // Collected
    let rows = executor
        .run(Query::new(HUNDRED))
        .await
        .expect("Failed to run the generated rows query");
    assert_eq!(rows.len(), 100);
    assert_eq!(
        rows.into_iter().map(number).collect::<Vec<_>>(),
        (0..100).collect::<Vec<_>>()
    );

    // Edge sizes
    let rows = executor
        .run("SELECT x FROM UNNEST(GENERATE_ARRAY(5, 5)) AS x".into())
        .await
        .expect("Failed to run the single row query");
    assert_eq!(rows.into_iter().map(number).collect::<Vec<_>>(), [5]);
    let rows = executor
        .run("SELECT x FROM UNNEST(GENERATE_ARRAY(1, 0)) AS x".into())
        .await
        .expect("Failed to run the empty query");
    assert!(rows.is_empty());
}

pub async fn nested_relays<E: Executor>(executor: &mut E) {
    for depth in 0..4 {
        let source = executor
            .execute(HUNDRED.into())
            .await
            .expect("Failed to execute the generated rows query");
        let items = match depth {
            0 => source.into_stream().try_collect::<Vec<_>>().await,
            1 => source.relay().into_stream().try_collect().await,
            2 => source.relay().relay().into_stream().try_collect().await,
            _ => source.relay().relay().relay().into_stream().try_collect().await,
        }
        .expect("Failed to stream through the relays");
        assert_eq!(items.len(), 100, "Rows lost at depth {depth}");
        assert_eq!(
            items.into_iter().map(number).collect::<Vec<_>>(),
            (0..100).collect::<Vec<_>>()
        );
    }

    // Pulling by hand
    let mut source = executor
        .execute(HUNDRED.into())
        .await
        .expect("Failed to execute the generated rows query")
        .relay()
        .relay();
    let mut count = 0;
    loop {
        match source.pull().await.expect("Failed to pull") {
            Pull::Row(..) => count += 1,
            Pull::Absent => panic!("Unexpected absence marker"),
            Pull::End => break,
        }
    }
    assert_eq!(count, 100);
    assert_eq!(source.pull().await.expect("Failed to pull after the end"), Pull::End);
    source.close().expect("Failed to close an exhausted source");
}

pub async fn early_stop<E: Executor>(executor: &mut E) {
    {
        let stream = executor.run_stream(HUNDRED.into());
        let taken = stream
            .take(3)
            .try_collect::<Vec<_>>()
            .await
            .expect("Failed to read the first rows");
        assert_eq!(taken.into_iter().map(number).collect::<Vec<_>>(), [0, 1, 2]);
    }
    let mut source = executor
        .execute(HUNDRED.into())
        .await
        .expect("Failed to execute the generated rows query")
        .relay();
    assert!(matches!(source.pull().await, Ok(Pull::Row(..))));
    source.close().expect("Failed to close the source early");
    source.close().expect("Closing twice must succeed");
    assert_eq!(source.pull().await.expect("Failed to pull after close"), Pull::End);
}
