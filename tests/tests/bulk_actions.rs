use common::{assert_no_bump, ids, next_version, notifier, post, seed, subscribe, MemStore};
use viewsync_connector_local_process::LocalRelay;
use viewsync_core::{MutationKind, StatusFilter, ViewQuery};
use viewsync_proto::{GroupId, RowId, Status};

#[tokio::test]
async fn bulk_create_arrives_as_one_atomic_transition() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    let view = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    seed(&view, vec![], 0);
    let mut version = subscriber.session.watch();

    let ids_to_make: Vec<RowId> = vec!["a".into(), "b".into(), "c".into()];
    for id in &ids_to_make {
        store.put(post(id.as_str(), &format!("Post {id}"), "ada", "news"));
    }
    notifier.notify_batch(MutationKind::Create, &ids_to_make, None).await?;

    // One batched event, one version bump, all three rows applied.
    assert_eq!(next_version(&mut version).await, 1);
    let entry = view.entry().unwrap();
    assert_eq!(entry.total, 3);
    assert_eq!(ids(&entry), vec!["c", "b", "a"]);
    assert_no_bump(&mut version).await;

    Ok(())
}

#[tokio::test]
async fn bulk_soft_delete_moves_rows_between_partitions() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    let active = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    let trash = subscriber.session.open_view(ViewQuery::new(StatusFilter::Deleted, 1, 10));

    let rows: Vec<_> = ["a", "b", "c"].iter().map(|id| post(id, &format!("Post {id}"), "ada", "news")).collect();
    for row in &rows {
        store.put(row.clone());
    }
    seed(&active, rows, 3);
    seed(&trash, vec![], 0);
    let mut version = subscriber.session.watch();

    let doomed: Vec<RowId> = vec!["a".into(), "c".into()];
    for id in &doomed {
        store.soft_delete(id);
    }
    notifier.notify_batch(MutationKind::Delete, &doomed, Some(Status::Active)).await?;

    next_version(&mut version).await;
    let active_entry = active.entry().unwrap();
    assert_eq!(ids(&active_entry), vec!["b"]);
    assert_eq!(active_entry.total, 1);
    let trash_entry = trash.entry().unwrap();
    assert_eq!(trash_entry.total, 2);

    Ok(())
}

#[tokio::test]
async fn bulk_hard_delete_mixes_removes_with_skips() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    let view = subscriber.session.open_view(ViewQuery::new(StatusFilter::All, 1, 10));
    let rows: Vec<_> = ["a", "b"].iter().map(|id| post(id, &format!("Post {id}"), "ada", "news")).collect();
    for row in &rows {
        store.put(row.clone());
    }
    seed(&view, rows, 2);
    let mut version = subscriber.session.watch();

    // "ghost" never existed; its remove lands in the batch and every view
    // applies it as a no-op.
    store.hard_delete(&"a".into());
    store.hard_delete(&"b".into());
    notifier.notify_batch(MutationKind::HardDelete, &["a".into(), "b".into(), "ghost".into()], Some(Status::Active)).await?;

    next_version(&mut version).await;
    let entry = view.entry().unwrap();
    assert!(entry.rows.is_empty());
    assert_eq!(entry.total, 0);

    Ok(())
}
