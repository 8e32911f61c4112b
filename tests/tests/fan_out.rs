use common::{assert_no_bump, ids, next_version, notifier, post, seed, subscribe, MemStore};
use viewsync_connector_local_process::LocalRelay;
use viewsync_core::{MutationKind, StatusFilter, ViewQuery};
use viewsync_proto::GroupId;

#[tokio::test]
async fn every_group_member_reconciles_the_same_event() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let first = subscribe(&relay, &group);
    let second = subscribe(&relay, &group);
    let first_view = first.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    // The second subscriber is paginated differently; it still converges.
    let second_view = second.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 2));
    seed(&first_view, vec![], 0);
    seed(&second_view, vec![post("x", "X", "ada", "news"), post("y", "Y", "ada", "news")], 2);
    let mut first_version = first.session.watch();
    let mut second_version = second.session.watch();

    store.put(post("p1", "Broadcast", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;

    next_version(&mut first_version).await;
    next_version(&mut second_version).await;
    assert_eq!(ids(&first_view.entry().unwrap()), vec!["p1"]);
    assert_eq!(ids(&second_view.entry().unwrap()), vec!["p1", "x"]);
    assert_eq!(second_view.entry().unwrap().total, 3);

    Ok(())
}

#[tokio::test]
async fn other_groups_never_see_the_event() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let editors = GroupId::scoped("editor", &"posts".into());
    let viewers = GroupId::scoped("viewer", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &editors);

    let editor = subscribe(&relay, &editors);
    let viewer = subscribe(&relay, &viewers);
    let editor_view = editor.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    let viewer_view = viewer.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    seed(&editor_view, vec![], 0);
    seed(&viewer_view, vec![], 0);
    let mut editor_version = editor.session.watch();
    let mut viewer_version = viewer.session.watch();

    store.put(post("p1", "Editors only", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;

    next_version(&mut editor_version).await;
    assert_eq!(editor_view.entry().unwrap().total, 1);
    assert_no_bump(&mut viewer_version).await;
    assert!(viewer_view.entry().unwrap().rows.is_empty());

    Ok(())
}

#[tokio::test]
async fn departed_members_are_skipped() -> anyhow::Result<()> {
    let relay = LocalRelay::new();
    let group = GroupId::scoped("editor", &"posts".into());
    let store = MemStore::new();
    let notifier = notifier(&store, &relay, &group);

    let stayer = subscribe(&relay, &group);
    let leaver = subscribe(&relay, &group);
    let view = stayer.session.open_view(ViewQuery::new(StatusFilter::Active, 1, 10));
    seed(&view, vec![], 0);
    let mut version = stayer.session.watch();

    drop(leaver);

    store.put(post("p1", "Still delivered", "ada", "news"));
    notifier.notify(MutationKind::Create, &"p1".into(), None).await?;

    next_version(&mut version).await;
    assert_eq!(view.entry().unwrap().total, 1);

    Ok(())
}
