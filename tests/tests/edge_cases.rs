use common::{assert_no_bump, next_version, notifier, post, seed, subscribe, MemStore};
use serde_json::json;
use viewsync_connector_local_process::LocalRelay;
use viewsync_core::{GroupSender, MutationKind, StatusFilter, ViewQuery};
use viewsync_proto::GroupId;

#[tokio::test]
async fn malformed_events_cost_a_log_line_and_nothing_else() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    let view = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    seed(&view, vec![], 0);
    let mut version = subscriber.session.watch();

    // Garbage payload, unknown suffix, and someone else's resource.
    relay.emit(&group, "posts:upsert", json!({"rows": "nope"})).await?;
    relay.emit(&group, "posts:explode", json!({})).await?;
    relay.emit(&group, "orders:upsert", json!({"id": "1", "previousStatus": "active"})).await?;
    assert_no_bump(&mut version).await;

    // The subscriber is still alive and applies the next good event.
    store.put(post("p1", "Survivor", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;
    next_version(&mut version).await;
    assert_eq!(view.entry().unwrap().total, 1);

    Ok(())
}

#[tokio::test]
async fn hard_delete_of_a_never_visible_row_emits_nothing() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    let view = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    seed(&view, vec![], 0);
    let mut version = subscriber.session.watch();

    // The row was created and hard-deleted before any snapshot was built:
    // previous partition is unknown (None) and nothing goes on the wire.
    notifier.notify(MutationKind::HardDelete, &"phantom".into(), None).await?;
    assert_no_bump(&mut version).await;

    Ok(())
}

#[tokio::test]
async fn view_closed_while_an_event_is_in_flight_is_discarded() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    let keeper = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    let closer = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 5));
    seed(&keeper, vec![], 0);
    seed(&closer, vec![], 0);
    let mut version = subscriber.session.watch();

    store.put(post("p1", "Racer", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;
    drop(closer);

    next_version(&mut version).await;
    assert_eq!(keeper.entry().unwrap().total, 1);
    assert_eq!(subscriber.session.registry().len(), 1);

    Ok(())
}

#[tokio::test]
async fn emitting_to_a_group_with_no_members_is_fine() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    store.put(post("p1", "Unheard", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;

    Ok(())
}

#[tokio::test]
async fn unseeded_views_wait_for_their_first_fetch() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let subscriber = subscribe(&relay, &group);
    // Registered but never seeded: there is no page to reconcile against.
    let view = subscriber.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    let mut version = subscriber.session.watch();

    store.put(post("p1", "Early", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;
    assert_no_bump(&mut version).await;
    assert!(view.entry().is_none());

    Ok(())
}
