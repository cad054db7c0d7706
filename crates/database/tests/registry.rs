mod common;

use common::Sandbox;
use core_types::PathKind;
use database::{RulePath, TransferPath, TransferRule};
use std::path::Path;

#[tokio::test]
async fn created_path_is_fetchable_by_id_and_by_path() {
    let sandbox = Sandbox::new().await;

    for kind in [PathKind::Source, PathKind::Sink] {
        let name = format!("{}-dir", kind);
        let path = sandbox.path(&name);

        let mut uow = sandbox.store.begin(true).await.unwrap();
        let created = TransferPath::create(&mut uow, &name, &path, kind)
            .await
            .unwrap()
            .expect("path should be created");
        uow.finish().await.unwrap();

        assert!(Path::new(&path).is_dir(), "directory must be provisioned");

        let mut uow = sandbox.store.begin(false).await.unwrap();
        let by_id = TransferPath::get(&mut uow, created.id).await.unwrap().unwrap();
        let by_path = TransferPath::get_by_path(&mut uow, &path)
            .await
            .unwrap()
            .unwrap();
        uow.finish().await.unwrap();

        assert_eq!(by_id.id, created.id);
        assert_eq!(by_path.id, created.id);
        assert_eq!(by_id.kind, kind);
    }
}

#[tokio::test]
async fn creating_a_path_over_an_existing_directory_is_refused() {
    let sandbox = Sandbox::new().await;
    let path = sandbox.path("occupied");
    std::fs::create_dir(&path).unwrap();

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let created = TransferPath::create(&mut uow, "occupied", &path, PathKind::Source)
        .await
        .unwrap();
    assert!(created.is_none());

    let records = TransferPath::list(&mut uow).await.unwrap();
    assert!(records.is_empty(), "no registry record may be left behind");
    uow.finish().await.unwrap();
}

#[tokio::test]
async fn repeated_create_returns_the_sentinel_and_keeps_one_record() {
    let sandbox = Sandbox::new().await;
    let path = sandbox.path("alpha");

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let first = TransferPath::create(&mut uow, "alpha", &path, PathKind::Source)
        .await
        .unwrap();
    assert!(first.is_some(), "first create must succeed");
    assert!(Path::new(&path).is_dir());
    uow.finish().await.unwrap();

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let second = TransferPath::create(&mut uow, "alpha", &path, PathKind::Source)
        .await
        .unwrap();
    assert!(second.is_none(), "second create must hit the sentinel");

    let records = TransferPath::list(&mut uow).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path, path);
    uow.finish().await.unwrap();
}

#[tokio::test]
async fn a_registered_path_is_refused_even_without_its_directory() {
    let sandbox = Sandbox::new().await;
    let path = sandbox.path("ghost");

    let mut uow = sandbox.store.begin(true).await.unwrap();
    TransferPath::create(&mut uow, "ghost", &path, PathKind::Sink)
        .await
        .unwrap()
        .expect("path should be created");
    uow.finish().await.unwrap();

    // The record outlives its directory; the registry check still catches it.
    std::fs::remove_dir(&path).unwrap();

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let duplicate = TransferPath::create(&mut uow, "ghost", &path, PathKind::Sink)
        .await
        .unwrap();
    assert!(duplicate.is_none());
    uow.finish().await.unwrap();
}

#[tokio::test]
async fn delete_removes_the_record_but_not_the_directory() {
    let sandbox = Sandbox::new().await;
    let path = sandbox.path("deletable");

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let created = TransferPath::create(&mut uow, "deletable", &path, PathKind::Source)
        .await
        .unwrap()
        .unwrap();
    uow.finish().await.unwrap();

    let mut uow = sandbox.store.begin(true).await.unwrap();
    assert!(TransferPath::delete(&mut uow, created.id).await.unwrap());
    uow.finish().await.unwrap();

    let mut uow = sandbox.store.begin(false).await.unwrap();
    assert!(TransferPath::get(&mut uow, created.id).await.unwrap().is_none());
    uow.finish().await.unwrap();

    // Deletion is registry-only.
    assert!(Path::new(&path).is_dir());
}

#[tokio::test]
async fn deleting_a_nonexistent_id_returns_false() {
    let sandbox = Sandbox::new().await;

    let mut uow = sandbox.store.begin(true).await.unwrap();
    assert!(!TransferPath::delete(&mut uow, 4242).await.unwrap());
    uow.finish().await.unwrap();
}

#[tokio::test]
async fn association_round_trips_with_its_endpoint_paths() {
    let sandbox = Sandbox::new().await;
    let source_path = sandbox.path("inbox");
    let sink_path = sandbox.path("archive");

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let source = TransferPath::create(&mut uow, "inbox", &source_path, PathKind::Source)
        .await
        .unwrap()
        .unwrap();
    let sink = TransferPath::create(&mut uow, "archive", &sink_path, PathKind::Sink)
        .await
        .unwrap()
        .unwrap();
    let association = RulePath::create(&mut uow, &source, &sink)
        .await
        .unwrap()
        .expect("association should be created");
    // The assigned id is available before the transaction finalizes.
    assert!(association.id > 0);
    uow.finish().await.unwrap();

    let mut uow = sandbox.store.begin(false).await.unwrap();
    let detail = RulePath::get(&mut uow, association.id)
        .await
        .unwrap()
        .unwrap();
    uow.finish().await.unwrap();

    assert_eq!(detail.source_path, source_path);
    assert_eq!(detail.sink_path, sink_path);
}

#[tokio::test]
async fn duplicate_association_returns_the_sentinel() {
    let sandbox = Sandbox::new().await;

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let source = TransferPath::create(
        &mut uow,
        "spool",
        &sandbox.path("spool"),
        PathKind::Source,
    )
    .await
    .unwrap()
    .unwrap();
    let sink = TransferPath::create(&mut uow, "vault", &sandbox.path("vault"), PathKind::Sink)
        .await
        .unwrap()
        .unwrap();

    let first = RulePath::create(&mut uow, &source, &sink).await.unwrap();
    assert!(first.is_some());
    let duplicate = RulePath::create(&mut uow, &source, &sink).await.unwrap();
    assert!(duplicate.is_none());
    uow.finish().await.unwrap();

    // The first call's association remains the only one in the store.
    let mut uow = sandbox.store.begin(false).await.unwrap();
    let detail = RulePath::get(&mut uow, first.unwrap().id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.source_path, source.path);
    uow.finish().await.unwrap();
}

#[tokio::test]
async fn rule_survives_across_transaction_scopes() {
    let sandbox = Sandbox::new().await;

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let rule = TransferRule::create(&mut uow, "nightly-sync").await.unwrap();
    uow.finish().await.unwrap();

    let mut uow = sandbox.store.begin(false).await.unwrap();
    let fetched = TransferRule::get(&mut uow, rule.id).await.unwrap().unwrap();
    uow.finish().await.unwrap();

    assert_eq!(fetched.name, "nightly-sync");
}

#[tokio::test]
async fn rule_owns_the_associations_added_to_it() {
    let sandbox = Sandbox::new().await;

    let mut uow = sandbox.store.begin(true).await.unwrap();
    let rule = TransferRule::create(&mut uow, "mirror").await.unwrap();
    let source = TransferPath::create(&mut uow, "src", &sandbox.path("src"), PathKind::Source)
        .await
        .unwrap()
        .unwrap();
    let sink = TransferPath::create(&mut uow, "dst", &sandbox.path("dst"), PathKind::Sink)
        .await
        .unwrap()
        .unwrap();

    let association = rule
        .add_association(&mut uow, &source, &sink)
        .await
        .unwrap()
        .expect("pair should be associated");
    assert_eq!(association.rule_id, Some(rule.id));

    let owned = rule.associations(&mut uow).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].source_path, source.path);
    assert_eq!(owned[0].sink_path, sink.path);

    // The same pair cannot be associated twice, even under its own rule.
    let duplicate = rule.add_association(&mut uow, &source, &sink).await.unwrap();
    assert!(duplicate.is_none());
    uow.finish().await.unwrap();
}
