use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use product_recommender::{Command, EngineConfig, Error, Product, Result, User, Worker, WorkerEvent};

const TIMEOUT: Duration = Duration::from_secs(5);

fn catalog() -> Vec<Product> {
    vec![
        Product::new("Runner", 100.0, "shoes", "red"),
        Product::new("Trail", 120.0, "shoes", "red"),
        Product::new("Tee", 20.0, "shirts", "white"),
    ]
}

fn static_catalog() -> Result<Vec<Product>> {
    Ok(catalog())
}

fn next_event(events: &std::sync::mpsc::Receiver<WorkerEvent>) -> WorkerEvent {
    events.recv_timeout(TIMEOUT).unwrap()
}

fn wait_for_completion(events: &std::sync::mpsc::Receiver<WorkerEvent>) -> u64 {
    loop {
        match next_event(events) {
            WorkerEvent::TrainingComplete { version } => return version,
            WorkerEvent::Error { message } => panic!("training failed: {message}"),
            _ => {}
        }
    }
}

#[test]
fn test_train_then_recommend_over_json() {
    let worker = Worker::spawn(static_catalog, EngineConfig::default());

    worker
        .post_message(
            r#"{"action": "trainModel", "users": [
                {"name": "Ana", "age": 22, "purchases": [{"name": "Runner"}]},
                {"name": "Bo", "age": 48, "purchases": [{"name": "Tee"}]}
            ]}"#,
        )
        .unwrap();
    assert_eq!(
        next_event(worker.events()),
        WorkerEvent::ProgressUpdate { progress: 50 }
    );
    assert_eq!(wait_for_completion(worker.events()), 1);
    assert_eq!(worker.store().version(), 1);

    worker
        .post_message(
            r#"{"action": "recommend", "user": {"age": 25, "purchases": [{"name": "Runner"}]}}"#,
        )
        .unwrap();
    match next_event(worker.events()) {
        WorkerEvent::Recommend {
            recommendations, ..
        } => {
            assert_eq!(recommendations.len(), 2);
            assert_eq!(recommendations[0].product.name, "Trail");
        }
        other => panic!("unexpected event {other:?}"),
    }

    worker.shutdown().unwrap();
}

#[test]
fn test_catalog_fetched_per_training_run() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);
    let provider = move || -> Result<Vec<Product>> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(catalog())
    };
    let worker = Worker::spawn(provider, EngineConfig::default());

    for expected_version in 1..=2 {
        worker
            .send(Command::TrainModel {
                users: vec![User::new(30.0, &["Tee"])],
            })
            .unwrap();
        assert_eq!(wait_for_completion(worker.events()), expected_version);
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_failed_catalog_fetch_keeps_last_good_context() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);
    let provider = move || -> Result<Vec<Product>> {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(catalog())
        } else {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "products.json",
            )))
        }
    };
    let worker = Worker::spawn(provider, EngineConfig::default());
    let users = vec![User::new(30.0, &["Tee"])];

    worker
        .send(Command::TrainModel {
            users: users.clone(),
        })
        .unwrap();
    assert_eq!(wait_for_completion(worker.events()), 1);

    worker.send(Command::TrainModel { users }).unwrap();
    loop {
        match next_event(worker.events()) {
            WorkerEvent::Error { message } => {
                assert!(message.contains("products.json"));
                break;
            }
            WorkerEvent::TrainingComplete { .. } => panic!("failed run must not publish"),
            _ => {}
        }
    }

    let current = worker.store().current().unwrap();
    assert_eq!(current.version, 1);
    assert_eq!(current.context.product_vectors().len(), 3);
}

#[test]
fn test_unknown_actions_are_ignored() {
    let worker = Worker::spawn(static_catalog, EngineConfig::default());
    worker.post_message(r#"{"action": "dance"}"#).unwrap();
    worker
        .send(Command::Recommend {
            user: User::new(30.0, &[]),
        })
        .unwrap();

    // First event answers the recommend command
    assert!(matches!(
        next_event(worker.events()),
        WorkerEvent::Error { .. }
    ));
}
