// CaseSleuth - app/coordinator.rs
//
// Shared glue for composite views: the lifecycle capability set every view
// implements, and the subscription set that ties a view's open/close hooks
// to event channel registration.

use crate::core::channel::{EventChannel, Subscriber, SubscriberId};
use crate::core::model::UiEvent;
use std::rc::Rc;

/// Lifecycle hooks a host window calls on a composite view.
pub trait Lifecycle {
    /// The view became visible. Must be idempotent.
    fn on_open(&mut self);

    /// The view is being closed. Must be idempotent.
    fn on_close(&mut self);

    /// The view gained focus (already open). Default: nothing.
    fn on_activate(&mut self) {}

    fn is_open(&self) -> bool;
}

/// Fixed list of subscribers that a view registers on open and removes on
/// close.
pub struct SubscriptionSet {
    channel: Rc<EventChannel<UiEvent>>,
    members: Vec<Rc<dyn Subscriber<UiEvent>>>,
}

impl SubscriptionSet {
    pub fn new(
        channel: Rc<EventChannel<UiEvent>>,
        members: Vec<Rc<dyn Subscriber<UiEvent>>>,
    ) -> Self {
        Self { channel, members }
    }

    pub fn channel(&self) -> &Rc<EventChannel<UiEvent>> {
        &self.channel
    }

    pub fn member_ids(&self) -> Vec<SubscriberId> {
        self.members.iter().map(|m| m.subscriber_id()).collect()
    }

    /// Register every member not already registered. Returns how many new
    /// registrations were made.
    pub fn register_all(&self) -> usize {
        let mut added = 0;
        for member in &self.members {
            if self.channel.register(Rc::clone(member)) {
                added += 1;
            }
        }
        tracing::debug!(channel = self.channel.name(), added, "Subscription set registered");
        added
    }

    /// Unregister every member still registered. Members already removed by
    /// another teardown path are skipped. Returns how many were removed.
    pub fn unregister_all(&self) -> usize {
        let mut removed = 0;
        for member in &self.members {
            if self.channel.unregister(member.subscriber_id()) {
                removed += 1;
            }
        }
        tracing::debug!(channel = self.channel.name(), removed, "Subscription set unregistered");
        removed
    }

    /// True when every member is currently registered.
    pub fn is_fully_registered(&self) -> bool {
        self.members
            .iter()
            .all(|m| self.channel.is_registered(m.subscriber_id()))
    }
}
