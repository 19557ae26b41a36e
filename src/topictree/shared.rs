use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use log::{debug, info};

use crate::topictree::node::TopicNode;
use crate::topictree::path::{PatternSegment, TopicPattern};
use crate::topictree::types::{Segment, SubscriberSet};

/// Thread-safe subscription table, sharded by top-level segment.
///
/// Each shard is the subtree below one first-level segment and is locked as
/// a unit, so writers on different shards never contend. Subscribers of the
/// empty path live outside the shards. A query reads every shard it touches
/// consistently, but does not see one snapshot of the whole table: writes to
/// other shards may land while it runs.
#[derive(Default)]
pub struct SharedTopicTree {
    shards: DashMap<Segment, TopicNode>,
    root_subscribers: RwLock<SubscriberSet>,
}

impl SharedTopicTree {
    pub fn new() -> Self {
        info!("Creating sharded topic tree");
        Self {
            shards: DashMap::new(),
            root_subscribers: RwLock::new(SubscriberSet::new()),
        }
    }

    fn root_read(&self) -> RwLockReadGuard<'_, SubscriberSet> {
        self.root_subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn root_write(&self) -> RwLockWriteGuard<'_, SubscriberSet> {
        self.root_subscribers.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe<S: AsRef<str>>(&self, subscriber: &str, path: &[S]) -> bool {
        match path.split_first() {
            None => self.root_write().insert(subscriber.to_string()),
            Some((head, tail)) => self
                .shards
                .entry(head.as_ref().to_string())
                .or_insert_with(TopicNode::new)
                .subscribe(subscriber, tail),
        }
    }

    pub fn subscribe_many<P, S>(&self, subscriber: &str, paths: &[P]) -> usize
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        paths
            .iter()
            .filter(|path| self.subscribe::<S>(subscriber, (*path).as_ref()))
            .count()
    }

    pub fn unsubscribe<S: AsRef<str>>(&self, subscriber: &str, path: &[S]) -> bool {
        match path.split_first() {
            None => self.root_write().remove(subscriber),
            Some((head, tail)) => match self.shards.get_mut(head.as_ref()) {
                Some(mut shard) => shard.unsubscribe(subscriber, tail),
                None => {
                    debug!("unsubscribe {}: shard not found", subscriber);
                    false
                }
            },
        }
    }

    pub fn unsubscribe_all(&self, subscriber: &str) -> usize {
        let mut removed = usize::from(self.root_write().remove(subscriber));
        for mut shard in self.shards.iter_mut() {
            removed += shard.unsubscribe_all(subscriber);
        }
        info!("Client {} unsubscribed from {} topics", subscriber, removed);
        removed
    }

    pub fn matches(&self, pattern: &TopicPattern) -> SubscriberSet {
        let result = self.resolve(pattern.segments());
        debug!("pattern {} matched {} subscribers", pattern, result.len());
        result
    }

    pub fn matches_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> SubscriberSet {
        self.matches(&TopicPattern::from_tokens(tokens))
    }

    /// The root level of the trie, with shards standing in for children
    fn resolve(&self, pattern: &[PatternSegment]) -> SubscriberSet {
        let Some((head, tail)) = pattern.split_first() else {
            return self.root_read().clone();
        };

        match head {
            PatternSegment::Literal(segment) => self
                .shards
                .get(segment)
                .map(|shard| shard.resolve(tail))
                .unwrap_or_default(),
            PatternSegment::SingleLevel => {
                let mut result = SubscriberSet::new();
                for shard in self.shards.iter() {
                    result.extend(shard.value().resolve(tail));
                }
                result
            }
            PatternSegment::MultiLevel => {
                let mut result = self.resolve(tail);
                for shard in self.shards.iter() {
                    result.extend(shard.value().resolve(pattern));
                }
                result
            }
        }
    }

    /// Everyone at or below `path`; empty if the path was never created
    pub fn subtree_subscribers<S: AsRef<str>>(&self, path: &[S]) -> SubscriberSet {
        match path.split_first() {
            None => {
                let mut result = self.root_read().clone();
                for shard in self.shards.iter() {
                    result.extend(shard.value().subtree_subscribers());
                }
                result
            }
            Some((head, tail)) => self
                .shards
                .get(head.as_ref())
                .and_then(|shard| shard.descend(tail).map(TopicNode::subtree_subscribers))
                .unwrap_or_default(),
        }
    }

    /// Number of distinct top-level segments
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Copies the table into a plain [`TopicNode`]. Shards are copied one at
    /// a time, so concurrent writers may be partially reflected.
    pub fn snapshot(&self) -> TopicNode {
        let children: HashMap<Segment, TopicNode> = self
            .shards
            .iter()
            .map(|shard| (shard.key().clone(), shard.value().clone()))
            .collect();
        TopicNode::from_parts(children, self.root_read().clone())
    }
}
