//! One engine shared by many threads

use pretty_assertions::assert_eq;
use remapper_engine::{ContextBuilder, FastRandSource, RemapperEngine, UserInfo};
use serde_json::{Value, json};
use std::sync::Arc;
use std::thread;

fn create_row(id: usize) -> Value {
    json!({
        "id": id,
        "title": format!("row {id}"),
        "tags": ["b", "a", "b"],
        "price": id % 7
    })
}

fn row_remapper() -> Value {
    json!({ "object.from": {
        "id": { "prop": "id" },
        "title": [{ "prop": "title" }, { "string.case": "upper" }],
        "tags": [{ "prop": "tags" }, { "array.unique": null }],
        "total": [{ "prop": "price" }, { "number.multiply": 3 }],
        "owner": { "user": "id" }
    } })
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(RemapperEngine::standard());
    let remapper = Arc::new(row_remapper());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let remapper = Arc::clone(&remapper);
            thread::spawn(move || {
                let builder = ContextBuilder::new().with_user(UserInfo::new(format!("w{worker}")));
                (0..200)
                    .map(|i| {
                        let id = worker * 1000 + i;
                        engine.evaluate(&remapper, &create_row(id), &builder).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let results = handle.join().unwrap();
        assert_eq!(results.len(), 200);
        for (i, result) in results.iter().enumerate() {
            let id = worker * 1000 + i;
            assert_eq!(
                result,
                &json!({
                    "id": id,
                    "title": format!("ROW {id}"),
                    "tags": ["b", "a"],
                    "total": (id % 7) * 3,
                    "owner": format!("w{worker}")
                })
            );
        }
    }
}

#[test]
fn test_shared_context_builder_and_random_source() {
    let engine = RemapperEngine::standard();
    let builder = ContextBuilder::new().with_random(FastRandSource::with_seed(9));
    let remapper = json!({ "random.integer": [-5, 5] });

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..1000 {
                    let n = engine
                        .evaluate(&remapper, &Value::Null, &builder)
                        .unwrap()
                        .as_i64()
                        .unwrap();
                    assert!((-5..=5).contains(&n));
                }
            });
        }
    });
}

#[test]
fn test_per_row_failures_are_isolated() {
    let engine = RemapperEngine::standard();
    let remapper = json!({ "array.map": { "slice": { "prop": "bounds" } } });
    let rows = vec![json!([]), json!(["abc"]), json!(null)];

    let (engine, remapper) = (&engine, &remapper);
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = rows
            .iter()
            .map(|row| scope.spawn(move || engine.remap(remapper, row)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results[0], Ok(json!([])));
    assert!(results[1].is_err());
    assert_eq!(results[2], Ok(json!([])));
}
