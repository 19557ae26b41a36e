use log::{debug, info, warn};

use crate::error::{Result, TopicTreeError};
use crate::topictree::config::TreeConfig;
use crate::topictree::node::TopicNode;
use crate::topictree::path::{TopicPath, TopicPattern};
use crate::topictree::types::SubscriberSet;

/// Outcome of [`TopicTree::try_subscribe_many`]
#[derive(Debug, Default)]
pub struct SubscribeReport {
    /// Paths that passed validation and were applied
    pub accepted: usize,
    /// Index into the input and the reason each rejected path failed
    pub rejected: Vec<(usize, TopicTreeError)>,
}

impl SubscribeReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Caller-owned subscription table: a root node plus the rules that guard
/// its registration boundary
#[derive(Debug, Default)]
pub struct TopicTree {
    root: TopicNode,
    config: TreeConfig,
}

impl TopicTree {
    pub fn new(config: TreeConfig) -> Self {
        info!("Creating topic tree (separator '{}')", config.separator);
        Self {
            root: TopicNode::new(),
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> &TopicNode {
        &self.root
    }

    /// Splits a string topic with the configured separator
    pub fn path(&self, topic: &str) -> TopicPath {
        TopicPath::parse(topic, self.config.separator)
    }

    /// Splits a string pattern with the configured separator
    pub fn pattern(&self, pattern: &str) -> TopicPattern {
        TopicPattern::parse(pattern, self.config.separator)
    }

    /// Validates `path` and registers `subscriber` there
    pub fn subscribe(&mut self, subscriber: &str, path: &TopicPath) -> Result<bool> {
        if let Err(e) = self.config.validate_path(path.segments()) {
            warn!("Rejected subscription of {} to {}: {}", subscriber, path, e);
            return Err(e);
        }
        Ok(self.root.subscribe(subscriber, path.segments()))
    }

    pub fn subscribe_str(&mut self, subscriber: &str, topic: &str) -> Result<bool> {
        let path = self.path(topic);
        self.subscribe(subscriber, &path)
    }

    /// Registers `subscriber` at each valid path; invalid paths are reported
    /// and skipped without affecting the others
    pub fn try_subscribe_many(&mut self, subscriber: &str, paths: &[TopicPath]) -> SubscribeReport {
        let mut report = SubscribeReport::default();
        for (index, path) in paths.iter().enumerate() {
            match self.subscribe(subscriber, path) {
                Ok(_) => report.accepted += 1,
                Err(e) => report.rejected.push((index, e)),
            }
        }

        debug!(
            "Subscribed {} to {}/{} paths",
            subscriber,
            report.accepted,
            paths.len()
        );
        report
    }

    /// Removes `subscriber` from `path`. With `prune_on_unsubscribe` the
    /// emptied nodes along the path are dropped as well.
    pub fn unsubscribe(&mut self, subscriber: &str, path: &TopicPath) -> bool {
        let removed = self.root.unsubscribe(subscriber, path.segments());
        if removed && self.config.prune_on_unsubscribe {
            let pruned = self.root.prune_path(path.segments());
            debug!("Pruned {} nodes below {}", pruned, path);
        }
        removed
    }

    pub fn unsubscribe_str(&mut self, subscriber: &str, topic: &str) -> bool {
        let path = self.path(topic);
        self.unsubscribe(subscriber, &path)
    }

    /// Removes `subscriber` everywhere, e.g. when it disconnects
    pub fn unsubscribe_all(&mut self, subscriber: &str) -> usize {
        let removed = self.root.unsubscribe_all(subscriber);
        if removed > 0 && self.config.prune_on_unsubscribe {
            self.root.prune();
        }
        info!("Client {} unsubscribed from {} topics", subscriber, removed);
        removed
    }

    pub fn matches(&self, pattern: &TopicPattern) -> SubscriberSet {
        self.root.matches(pattern)
    }

    pub fn matches_str(&self, pattern: &str) -> SubscriberSet {
        self.matches(&self.pattern(pattern))
    }

    /// Everyone at or below `path`; empty if the path was never created
    pub fn subtree_subscribers(&self, path: &TopicPath) -> SubscriberSet {
        self.root
            .descend(path.segments())
            .map(TopicNode::subtree_subscribers)
            .unwrap_or_default()
    }

    /// Drops every empty, childless node
    pub fn prune(&mut self) -> usize {
        let removed = self.root.prune();
        info!("Pruned {} empty nodes", removed);
        removed
    }

    /// JSON rendering of the whole tree, for diagnostics
    pub fn dump_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}
