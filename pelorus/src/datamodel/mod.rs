// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! The hierarchical data model every other component publishes into and
//! subscribes out of.
//!
//! The model is a rooted tree of named nodes. Interior nodes only carry
//! children; leaves carry a retained typed value and a table of
//! subscribers. The full topic name of a node is the '/'-joined names
//! from root to the node, root omitted. The shape of the tree is static:
//! bridges and the broker build their nodes at startup and never
//! rearrange them.
//!
//! One mutex, the subscription lock, guards the whole tree: values,
//! `has_value` flags and subscriber tables. Publishing to a subscriber is
//! a non-blocking channel send, so holding the lock across the fan-out
//! is safe and keeps retained delivery ordered before any later live
//! publish of the same leaf.

mod leaf;
mod subscriber;
mod value;

pub use leaf::{Leaf, StringLeaf};
pub use subscriber::{LeafPublish, Subscriber};
pub use value::{LeafValue, Value};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, ErrorKind};
use crate::types::{Cookie, SessionId};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// The root of the tree; its name is empty and never appears in topics.
pub const ROOT_NODE: NodeId = NodeId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeError {
    /// '#' not at the end, '+' mixed into a name, an interior empty
    /// level, or an empty filter.
    InvalidFilter,

    /// A leaf's subscriber table is full. The pool sizes are calibrated
    /// so this does not happen; a session reports it as a failed
    /// subscription.
    TooManySubscribers,
}

#[derive(Debug)]
struct Subscription {
    subscriber: Subscriber,
    cookie: Cookie,
}

#[derive(Debug, Default)]
struct LeafState {
    value: Option<Value>,
    /// Byte capacity for string leaves; longer values are truncated.
    capacity: Option<usize>,
    subscriptions: Vec<Subscription>,
}

#[derive(Debug)]
enum NodeKind {
    Branch { children: Vec<NodeId> },
    Leaf(LeafState),
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

/// One level of a parsed topic filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterLevel<'a> {
    /// '#', matches every descendant leaf; only valid as the last level.
    Multi,

    /// '+', matches exactly one level.
    Single,

    Name(&'a str),
}

/// Handle to the shared tree; clones are cheap and refer to the same
/// model.
#[derive(Clone)]
pub struct DataModel {
    inner: Arc<DataModelInner>,
}

struct DataModelInner {
    max_subscribers: usize,
    tree: Mutex<Tree>,
}

impl DataModel {
    #[must_use]
    pub fn new(max_subscribers: usize) -> Self {
        let root = Node {
            name: String::new(),
            parent: None,
            kind: NodeKind::Branch {
                children: Vec::new(),
            },
        };
        Self {
            inner: Arc::new(DataModelInner {
                max_subscribers,
                tree: Mutex::new(Tree { nodes: vec![root] }),
            }),
        }
    }

    /// Add an interior node under `parent`.
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid or already taken among the
    /// parent's children, or if `parent` is a leaf.
    pub fn add_node(&self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        let mut tree = self.lock();
        tree.add_child(
            parent,
            name,
            NodeKind::Branch {
                children: Vec::new(),
            },
        )
    }

    /// Add a leaf of inner type `T` under `parent`.
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid or already taken among the
    /// parent's children, or if `parent` is a leaf.
    pub fn add_leaf<T: LeafValue>(&self, parent: NodeId, name: &str) -> Result<Leaf<T>, Error> {
        let id = {
            let mut tree = self.lock();
            tree.add_child(parent, name, NodeKind::Leaf(LeafState::default()))?
        };
        Ok(Leaf::new(self.clone(), id))
    }

    /// Add a string leaf with a byte capacity; longer values are
    /// truncated on write, at a char boundary.
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid or already taken among the
    /// parent's children, or if `parent` is a leaf.
    pub fn add_string_leaf(
        &self,
        parent: NodeId,
        name: &str,
        capacity: usize,
    ) -> Result<StringLeaf, Error> {
        let id = {
            let mut tree = self.lock();
            let id = tree.add_child(parent, name, NodeKind::Leaf(LeafState::default()))?;
            if let Some(leaf) = tree.leaf_state_mut(id) {
                leaf.capacity = Some(capacity);
            }
            id
        };
        Ok(Leaf::new(self.clone(), id))
    }

    /// Attach `subscriber` to every leaf matching `filter`, sending each
    /// newly attached leaf's retained value (if any) to it alone.
    /// Subscribing a second time updates the stored cookie without
    /// re-sending the retained value. Returns the number of leaves newly
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns error on a malformed filter or a full subscriber table.
    pub fn subscribe(
        &self,
        filter: &str,
        subscriber: &Subscriber,
        cookie: Cookie,
    ) -> Result<usize, SubscribeError> {
        let levels = parse_filter(filter)?;
        let mut tree = self.lock();
        let mut attached = 0;
        tree.subscribe_walk(
            ROOT_NODE,
            &levels,
            subscriber,
            cookie,
            self.inner.max_subscribers,
            &mut attached,
        )?;
        Ok(attached)
    }

    /// Detach the session from every leaf matching `filter`. Detaching
    /// from leaves it was never attached to is not an error, conforming
    /// to MQTT UNSUBSCRIBE semantics. Returns the number of leaves
    /// detached.
    ///
    /// # Errors
    ///
    /// Returns error on a malformed filter.
    pub fn unsubscribe(&self, filter: &str, session_id: SessionId) -> Result<usize, SubscribeError> {
        let levels = parse_filter(filter)?;
        let mut tree = self.lock();
        let mut detached = 0;
        tree.unsubscribe_walk(ROOT_NODE, &levels, session_id, &mut detached);
        Ok(detached)
    }

    /// Detach the session from every leaf in the tree. Sessions call this
    /// once during teardown.
    pub fn unsubscribe_all(&self, session_id: SessionId) {
        let mut tree = self.lock();
        for node in &mut tree.nodes {
            if let NodeKind::Leaf(leaf) = &mut node.kind {
                leaf.subscriptions
                    .retain(|s| s.subscriber.session_id() != session_id);
            }
        }
    }

    /// Write the full tree to the log.
    pub fn dump(&self) {
        let tree = self.lock();
        log::debug!("Data model:");
        for id in 0..tree.nodes.len() {
            if let NodeKind::Leaf(leaf) = &tree.nodes[id].kind {
                let topic = tree.topic_name(NodeId(id));
                match &leaf.value {
                    Some(value) => log::debug!("{topic}: {value}"),
                    None => log::debug!("{topic}: Unset"),
                }
            }
        }
    }

    pub(crate) fn update_value<F>(&self, id: NodeId, f: F, force_publish: bool)
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let mut tree = self.lock();
        let topic = tree.topic_name(id);
        let Some(leaf) = tree.leaf_state_mut(id) else {
            return;
        };

        let mut value = f(leaf.value.as_ref());
        if let (Value::Str(s), Some(capacity)) = (&mut value, leaf.capacity) {
            truncate_to_boundary(s, capacity);
        }

        if !force_publish && leaf.value.as_ref() == Some(&value) {
            return;
        }

        let payload = value.to_string();
        leaf.value = Some(value);
        for subscription in &leaf.subscriptions {
            subscription.subscriber.publish(&topic, &payload, false);
        }
    }

    pub(crate) fn remove_value(&self, id: NodeId) {
        let mut tree = self.lock();
        let topic = tree.topic_name(id);
        let Some(leaf) = tree.leaf_state_mut(id) else {
            return;
        };
        if leaf.value.take().is_some() {
            for subscription in &leaf.subscriptions {
                subscription.subscriber.publish(&topic, "", true);
            }
        }
    }

    pub(crate) fn has_value(&self, id: NodeId) -> bool {
        let tree = self.lock();
        tree.leaf_state(id).is_some_and(|leaf| leaf.value.is_some())
    }

    pub(crate) fn topic_name(&self, id: NodeId) -> String {
        self.lock().topic_name(id)
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        // Poisoning means a writer panicked mid-update, which is a
        // programming error on par with a deadlocked lock.
        self.inner
            .tree
            .lock()
            .expect("datamodel: subscription lock poisoned")
    }
}

impl Tree {
    fn add_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId, Error> {
        if name.is_empty() || name.contains(['/', '+', '#']) {
            return Err(Error::from_string(
                ErrorKind::DataModelError,
                format!("Invalid node name '{name}'"),
            ));
        }
        if self.child_named(parent, name).is_some() {
            return Err(Error::from_string(
                ErrorKind::DataModelError,
                format!(
                    "Duplicate node name '{name}' under '{}'",
                    self.topic_name(parent)
                ),
            ));
        }

        if matches!(self.nodes[parent.0].kind, NodeKind::Leaf(_)) {
            return Err(Error::from_string(
                ErrorKind::DataModelError,
                format!("Leaf '{}' cannot have children", self.topic_name(parent)),
            ));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent),
            kind,
        });
        if let NodeKind::Branch { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        Ok(id)
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes[parent.0].kind {
            NodeKind::Branch { children } => children
                .iter()
                .copied()
                .find(|&c| self.nodes[c.0].name == name),
            NodeKind::Leaf(_) => None,
        }
    }

    fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        match &self.nodes[node.0].kind {
            NodeKind::Branch { children } => children.clone(),
            NodeKind::Leaf(_) => Vec::new(),
        }
    }

    fn leaf_state(&self, id: NodeId) -> Option<&LeafState> {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Branch { .. } => None,
        }
    }

    fn leaf_state_mut(&mut self, id: NodeId) -> Option<&mut LeafState> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Branch { .. } => None,
        }
    }

    /// '/'-joined names from root to `id`, root name omitted.
    fn topic_name(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    fn subscribe_walk(
        &mut self,
        node: NodeId,
        levels: &[FilterLevel],
        subscriber: &Subscriber,
        cookie: Cookie,
        max_subscribers: usize,
        attached: &mut usize,
    ) -> Result<(), SubscribeError> {
        match levels[0] {
            FilterLevel::Multi => {
                self.subscribe_descendants(node, subscriber, cookie, max_subscribers, attached)
            }
            FilterLevel::Single => {
                for child in self.children_of(node) {
                    self.subscribe_step(
                        child,
                        &levels[1..],
                        subscriber,
                        cookie,
                        max_subscribers,
                        attached,
                    )?;
                }
                Ok(())
            }
            FilterLevel::Name(name) => {
                // No match is not an error; the filter may name leaves
                // that do not exist yet.
                if let Some(child) = self.child_named(node, name) {
                    self.subscribe_step(
                        child,
                        &levels[1..],
                        subscriber,
                        cookie,
                        max_subscribers,
                        attached,
                    )?;
                }
                Ok(())
            }
        }
    }

    fn subscribe_step(
        &mut self,
        node: NodeId,
        rest: &[FilterLevel],
        subscriber: &Subscriber,
        cookie: Cookie,
        max_subscribers: usize,
        attached: &mut usize,
    ) -> Result<(), SubscribeError> {
        if rest.is_empty() {
            if self.leaf_state(node).is_some() {
                self.subscribe_leaf(node, subscriber, cookie, max_subscribers, attached)?;
            }
            Ok(())
        } else {
            self.subscribe_walk(node, rest, subscriber, cookie, max_subscribers, attached)
        }
    }

    /// '#' from here down: this node if it is a leaf, else every
    /// descendant leaf.
    fn subscribe_descendants(
        &mut self,
        node: NodeId,
        subscriber: &Subscriber,
        cookie: Cookie,
        max_subscribers: usize,
        attached: &mut usize,
    ) -> Result<(), SubscribeError> {
        if self.leaf_state(node).is_some() {
            return self.subscribe_leaf(node, subscriber, cookie, max_subscribers, attached);
        }
        for child in self.children_of(node) {
            self.subscribe_descendants(child, subscriber, cookie, max_subscribers, attached)?;
        }
        Ok(())
    }

    fn subscribe_leaf(
        &mut self,
        node: NodeId,
        subscriber: &Subscriber,
        cookie: Cookie,
        max_subscribers: usize,
        attached: &mut usize,
    ) -> Result<(), SubscribeError> {
        let topic = self.topic_name(node);
        let Some(leaf) = self.leaf_state_mut(node) else {
            return Ok(());
        };

        if let Some(existing) = leaf
            .subscriptions
            .iter_mut()
            .find(|s| s.subscriber.session_id() == subscriber.session_id())
        {
            // A session refreshing its intent; update the cookie and do
            // not re-send the retained value.
            existing.cookie = cookie;
            return Ok(());
        }

        if leaf.subscriptions.len() >= max_subscribers {
            log::error!("datamodel: subscriber table full on '{topic}'");
            return Err(SubscribeError::TooManySubscribers);
        }

        leaf.subscriptions.push(Subscription {
            subscriber: subscriber.clone(),
            cookie,
        });
        *attached += 1;

        if let Some(value) = &leaf.value {
            subscriber.publish(&topic, &value.to_string(), true);
        }
        Ok(())
    }

    fn unsubscribe_walk(
        &mut self,
        node: NodeId,
        levels: &[FilterLevel],
        session_id: SessionId,
        detached: &mut usize,
    ) {
        match levels[0] {
            FilterLevel::Multi => self.unsubscribe_descendants(node, session_id, detached),
            FilterLevel::Single => {
                for child in self.children_of(node) {
                    self.unsubscribe_step(child, &levels[1..], session_id, detached);
                }
            }
            FilterLevel::Name(name) => {
                if let Some(child) = self.child_named(node, name) {
                    self.unsubscribe_step(child, &levels[1..], session_id, detached);
                }
            }
        }
    }

    fn unsubscribe_step(
        &mut self,
        node: NodeId,
        rest: &[FilterLevel],
        session_id: SessionId,
        detached: &mut usize,
    ) {
        if rest.is_empty() {
            self.unsubscribe_leaf(node, session_id, detached);
        } else {
            self.unsubscribe_walk(node, rest, session_id, detached);
        }
    }

    fn unsubscribe_descendants(
        &mut self,
        node: NodeId,
        session_id: SessionId,
        detached: &mut usize,
    ) {
        self.unsubscribe_leaf(node, session_id, detached);
        for child in self.children_of(node) {
            self.unsubscribe_descendants(child, session_id, detached);
        }
    }

    fn unsubscribe_leaf(&mut self, node: NodeId, session_id: SessionId, detached: &mut usize) {
        if let Some(leaf) = self.leaf_state_mut(node) {
            let before = leaf.subscriptions.len();
            leaf.subscriptions
                .retain(|s| s.subscriber.session_id() != session_id);
            *detached += before - leaf.subscriptions.len();
        }
    }
}

/// Split a topic filter into levels, validating the MQTT wildcard rules:
/// '#' must stand alone in the final level, '+' must stand alone in its
/// level, and only the trailing level may be empty.
fn parse_filter(filter: &str) -> Result<Vec<FilterLevel>, SubscribeError> {
    if filter.is_empty() {
        return Err(SubscribeError::InvalidFilter);
    }

    let parts: Vec<&str> = filter.split('/').collect();
    let last = parts.len() - 1;
    let mut levels = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let level = match *part {
            "#" => {
                if i != last {
                    return Err(SubscribeError::InvalidFilter);
                }
                FilterLevel::Multi
            }
            "+" => FilterLevel::Single,
            "" => {
                if i != last {
                    return Err(SubscribeError::InvalidFilter);
                }
                FilterLevel::Name("")
            }
            name => {
                if name.contains(['#', '+']) {
                    return Err(SubscribeError::InvalidFilter);
                }
                FilterLevel::Name(name)
            }
        };
        levels.push(level);
    }
    Ok(levels)
}

fn truncate_to_boundary(s: &mut String, capacity: usize) {
    if s.len() > capacity {
        let mut end = capacity;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixedpoint::TenthsU16;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::mpsc;

    fn test_subscriber(
        session_id: SessionId,
    ) -> (Subscriber, mpsc::Receiver<LeafPublish>, Arc<AtomicU32>) {
        let (sender, receiver) = mpsc::channel(64);
        let dropped = Arc::new(AtomicU32::new(0));
        (
            Subscriber::new(session_id, sender, Arc::clone(&dropped)),
            receiver,
            dropped,
        )
    }

    fn depth_model() -> (DataModel, Leaf<TenthsU16>) {
        let model = DataModel::new(5);
        let depth = model.add_node(ROOT_NODE, "depth").unwrap();
        let below_keel = model.add_node(depth, "belowKeel").unwrap();
        let meters = model.add_leaf::<TenthsU16>(below_keel, "meters").unwrap();
        (model, meters)
    }

    #[test]
    fn test_topic_name_roundtrip() {
        let (_model, meters) = depth_model();
        assert_eq!(meters.topic(), "depth/belowKeel/meters");
    }

    #[test]
    fn test_sibling_name_collision_rejected() {
        let model = DataModel::new(5);
        let gps = model.add_node(ROOT_NODE, "gps").unwrap();
        let _time = model.add_string_leaf(gps, "time", 15).unwrap();
        assert!(model.add_string_leaf(gps, "time", 15).is_err());
        assert!(model.add_node(ROOT_NODE, "gps/bad").is_err());
    }

    #[test]
    fn test_set_is_idempotent() {
        let (model, meters) = depth_model();
        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        model.subscribe("depth/#", &subscriber, 0).unwrap();

        meters.set(TenthsU16::new(12, 3));
        meters.set(TenthsU16::new(12, 3));

        let publish = receiver.try_recv().unwrap();
        assert_eq!(publish.topic, "depth/belowKeel/meters");
        assert_eq!(publish.payload, "12.3");
        assert!(!publish.retain);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_retained_value_sent_on_subscribe() {
        let (model, meters) = depth_model();
        meters.set(TenthsU16::new(12, 3));

        let (subscriber, mut receiver, _dropped) = test_subscriber(1);
        let attached = model.subscribe("depth/belowKeel/meters", &subscriber, 0).unwrap();
        assert_eq!(attached, 1);

        let publish = receiver.try_recv().unwrap();
        assert_eq!(publish.payload, "12.3");
        assert!(publish.retain);
    }

    #[test]
    fn test_resubscribe_updates_cookie_without_resend() {
        let (model, meters) = depth_model();
        meters.set(TenthsU16::new(12, 3));

        let (subscriber, mut receiver, _dropped) = test_subscriber(1);
        assert_eq!(model.subscribe("depth/#", &subscriber, 0).unwrap(), 1);
        let _retained = receiver.try_recv().unwrap();

        // Same session, new cookie: attaches nothing new, resends nothing.
        assert_eq!(model.subscribe("depth/#", &subscriber, 2).unwrap(), 0);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_remove_publishes_empty_retained() {
        let (model, meters) = depth_model();
        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        model.subscribe("depth/#", &subscriber, 0).unwrap();

        meters.set(TenthsU16::new(12, 3));
        assert!(meters.has_value());
        meters.remove();
        assert!(!meters.has_value());

        let _value = receiver.try_recv().unwrap();
        let removal = receiver.try_recv().unwrap();
        assert_eq!(removal.payload, "");
        assert!(removal.retain);

        // Removing an unset leaf publishes nothing.
        meters.remove();
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_is_silent_when_not_subscribed() {
        let (model, _meters) = depth_model();
        assert_eq!(model.unsubscribe("depth/#", 3).unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_publishes() {
        let (model, meters) = depth_model();
        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        model.subscribe("depth/+/meters", &subscriber, 0).unwrap();
        assert_eq!(model.unsubscribe("depth/+/meters", 0).unwrap(), 1);

        meters.set(TenthsU16::new(1, 0));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_single_level_wildcard_matches_one_level() {
        let model = DataModel::new(5);
        let wind = model.add_node(ROOT_NODE, "wind").unwrap();
        let angle = model.add_leaf::<u16>(wind, "angle").unwrap();
        let apparent = model.add_node(wind, "apparent").unwrap();
        let speed = model.add_leaf::<u16>(apparent, "speed").unwrap();

        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        assert_eq!(model.subscribe("wind/+", &subscriber, 0).unwrap(), 1);

        angle.set(90);
        speed.set(10);
        let publish = receiver.try_recv().unwrap();
        assert_eq!(publish.topic, "wind/angle");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_root_multi_level_wildcard_matches_all() {
        let (model, meters) = depth_model();
        let gps = model.add_node(ROOT_NODE, "gps").unwrap();
        let time = model.add_string_leaf(gps, "time", 15).unwrap();

        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        assert_eq!(model.subscribe("#", &subscriber, 0).unwrap(), 2);

        meters.set(TenthsU16::new(2, 0));
        time.set("12:35:19".to_string());
        assert_eq!(receiver.try_recv().unwrap().topic, "depth/belowKeel/meters");
        assert_eq!(receiver.try_recv().unwrap().topic, "gps/time");
    }

    #[test]
    fn test_malformed_filters_rejected() {
        let (model, _meters) = depth_model();
        let (subscriber, _receiver, _dropped) = test_subscriber(0);
        for filter in ["", "depth/#/meters", "depth//meters", "de#pth", "a+/b"] {
            assert_eq!(
                model.subscribe(filter, &subscriber, 0),
                Err(SubscribeError::InvalidFilter),
                "filter {filter:?} should be invalid"
            );
        }
        // A trailing empty level is tolerated; it simply matches nothing.
        assert_eq!(model.subscribe("depth/", &subscriber, 0).unwrap(), 0);
    }

    #[test]
    fn test_no_duplicate_subscriber_entries() {
        let (model, meters) = depth_model();
        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        model.subscribe("depth/#", &subscriber, 0).unwrap();
        model.subscribe("depth/belowKeel/meters", &subscriber, 0).unwrap();

        meters.set(TenthsU16::new(4, 2));
        let _publish = receiver.try_recv().unwrap();
        assert!(receiver.try_recv().is_err(), "one publish per subscriber");
    }

    #[test]
    fn test_subscriber_table_overflow() {
        let model = DataModel::new(2);
        let _leaf = model.add_leaf::<u8>(ROOT_NODE, "crowded").unwrap();

        let (first, _r1, _d1) = test_subscriber(0);
        let (second, _r2, _d2) = test_subscriber(1);
        let (third, _r3, _d3) = test_subscriber(2);
        assert!(model.subscribe("crowded", &first, 0).is_ok());
        assert!(model.subscribe("crowded", &second, 0).is_ok());
        assert_eq!(
            model.subscribe("crowded", &third, 0),
            Err(SubscribeError::TooManySubscribers)
        );
    }

    #[test]
    fn test_unsubscribe_all_detaches_everywhere() {
        let (model, meters) = depth_model();
        let gps = model.add_node(ROOT_NODE, "gps").unwrap();
        let time = model.add_string_leaf(gps, "time", 15).unwrap();

        let (subscriber, mut receiver, _dropped) = test_subscriber(7);
        model.subscribe("#", &subscriber, 0).unwrap();
        model.unsubscribe_all(7);

        meters.set(TenthsU16::new(2, 0));
        time.set("00:00:00".to_string());
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_increment_always_publishes() {
        let model = DataModel::new(5);
        let counter = model.add_leaf::<u32>(ROOT_NODE, "counter").unwrap();
        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        model.subscribe("counter", &subscriber, 0).unwrap();

        counter.increment();
        assert_eq!(receiver.try_recv().unwrap().payload, "1");
        counter.increment();
        assert_eq!(receiver.try_recv().unwrap().payload, "2");
    }

    #[test]
    fn test_string_leaf_truncates_to_capacity() {
        let model = DataModel::new(5);
        let name = model.add_string_leaf(ROOT_NODE, "name", 4).unwrap();
        name.set("overlong".to_string());

        let (subscriber, mut receiver, _dropped) = test_subscriber(0);
        model.subscribe("name", &subscriber, 0).unwrap();
        assert_eq!(receiver.try_recv().unwrap().payload, "over");
    }

    #[test]
    fn test_full_channel_counts_drop() {
        let (model, meters) = depth_model();
        let (sender, _receiver) = mpsc::channel(1);
        let dropped = Arc::new(AtomicU32::new(0));
        let subscriber = Subscriber::new(0, sender, Arc::clone(&dropped));
        model.subscribe("depth/#", &subscriber, 0).unwrap();

        meters.set(TenthsU16::new(1, 0));
        meters.set(TenthsU16::new(2, 0));
        assert_eq!(dropped.load(std::sync::atomic::Ordering::Relaxed), 1);
    }
}
