use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use tracing::debug;
use viewsync_core::transport::{GroupSender, SendError};
use viewsync_proto::GroupId;

/// One delivered transport event: wire name plus JSON payload.
type WireEvent = (String, serde_json::Value);

/// In-process multicast relay: joins handlers to named groups and fans
/// every emitted event out to the members, through a channel and a
/// receiver task per member. The same shape a network connector has,
/// minus the network. Backs the integration tests and serves as the
/// reference for connector authors.
#[derive(Clone, Default)]
pub struct LocalRelay(Arc<Inner>);

#[derive(Default)]
struct Inner {
    groups: DashMap<GroupId, Vec<Member>>,
    next_member: AtomicU64,
}

struct Member {
    id: u64,
    sender: mpsc::Sender<WireEvent>,
}

impl LocalRelay {
    pub fn new() -> Self { Self::default() }

    /// Join `group`, routing every event emitted to it into `handler` on
    /// a dedicated receiver task. Dropping the returned membership leaves
    /// the group and stops the task.
    pub fn join<F>(&self, group: GroupId, handler: F) -> Membership
    where F: Fn(String, serde_json::Value) + Send + Sync + 'static {
        let (sender, mut receiver) = mpsc::channel::<WireEvent>(100);
        let task = tokio::spawn(async move {
            while let Some((name, payload)) = receiver.recv().await {
                handler(name, payload);
            }
        });

        let member_id = self.0.next_member.fetch_add(1, Ordering::Relaxed);
        self.0.groups.entry(group.clone()).or_default().push(Member { id: member_id, sender });
        debug!(%group, member_id, "joined group");

        Membership { relay: self.0.clone(), group, member_id, task }
    }

    fn leave(&self, group: &GroupId, member_id: u64) {
        if let Some(mut members) = self.0.groups.get_mut(group) {
            members.retain(|member| member.id != member_id);
        }
        debug!(%group, member_id, "left group");
    }
}

#[async_trait]
impl GroupSender for LocalRelay {
    async fn emit(&self, group: &GroupId, event_name: &str, payload: serde_json::Value) -> Result<(), SendError> {
        // Snapshot the member list before awaiting; a group nobody has
        // joined simply swallows the event.
        let members: Vec<(u64, mpsc::Sender<WireEvent>)> = match self.0.groups.get(group) {
            Some(members) => members.iter().map(|member| (member.id, member.sender.clone())).collect(),
            None => return Ok(()),
        };

        let mut gone = Vec::new();
        for (member_id, sender) in members {
            if sender.send((event_name.to_string(), payload.clone())).await.is_err() {
                // Member left between snapshot and send; forget it.
                gone.push(member_id);
            }
        }
        if !gone.is_empty() {
            if let Some(mut members) = self.0.groups.get_mut(group) {
                members.retain(|member| !gone.contains(&member.id));
            }
        }
        Ok(())
    }

    fn cloned(&self) -> Box<dyn GroupSender> { Box::new(self.clone()) }
}

/// Handle for one joined group member; leaves the group on drop.
pub struct Membership {
    relay: Arc<Inner>,
    group: GroupId,
    member_id: u64,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for Membership {
    fn drop(&mut self) {
        LocalRelay(self.relay.clone()).leave(&self.group, self.member_id);
        self.task.abort();
    }
}
