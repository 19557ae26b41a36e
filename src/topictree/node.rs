use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::topictree::path::TopicPath;
use crate::topictree::types::{Segment, SubscriberId, SubscriberSet};

/// One level of the topic trie.
///
/// Children are owned by value, so every node is reachable from the root by
/// exactly one path. Nodes are created lazily by [`TopicNode::subscribe`] and
/// stay in place when they run empty; only [`TopicNode::prune`] and
/// [`TopicNode::prune_path`] remove them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TopicNode {
    pub(crate) children: HashMap<Segment, TopicNode>,
    pub(crate) subscribers: SubscriberSet,
}

impl TopicNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(children: HashMap<Segment, TopicNode>, subscribers: SubscriberSet) -> Self {
        Self { children, subscribers }
    }

    /// Registers `subscriber` at `path`, creating missing nodes on the way.
    /// Returns `false` if it was already registered there.
    pub fn subscribe<S: AsRef<str>>(&mut self, subscriber: &str, path: &[S]) -> bool {
        let mut node = self;
        for segment in path {
            node = node
                .children
                .entry(segment.as_ref().to_string())
                .or_insert_with(TopicNode::new);
        }

        let added = node.subscribers.insert(subscriber.to_string());
        debug!("subscribe {} at depth {} (new: {})", subscriber, path.len(), added);
        added
    }

    /// Registers `subscriber` at every path in `paths`
    pub fn subscribe_many<P, S>(&mut self, subscriber: &str, paths: &[P]) -> usize
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        paths
            .iter()
            .filter(|path| self.subscribe::<S>(subscriber, (*path).as_ref()))
            .count()
    }

    /// Removes `subscriber` from `path`. Missing paths and unknown ids are
    /// no-ops; emptied nodes are kept.
    pub fn unsubscribe<S: AsRef<str>>(&mut self, subscriber: &str, path: &[S]) -> bool {
        let mut node = self;
        for segment in path {
            match node.children.get_mut(segment.as_ref()) {
                Some(child) => node = child,
                None => {
                    debug!("unsubscribe {}: path not found", subscriber);
                    return false;
                }
            }
        }

        let removed = node.subscribers.remove(subscriber);
        debug!("unsubscribe {} at depth {} (removed: {})", subscriber, path.len(), removed);
        removed
    }

    /// Removes `subscriber` from every node below and including this one.
    /// Returns how many nodes it was registered at.
    pub fn unsubscribe_all(&mut self, subscriber: &str) -> usize {
        let mut removed = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.subscribers.remove(subscriber) {
                removed += 1;
            }
            pending.extend(node.children.values_mut());
        }

        debug!("unsubscribe_all {}: removed from {} nodes", subscriber, removed);
        removed
    }

    /// Drops every descendant that has neither subscribers nor children.
    /// Returns the number of nodes removed. The node itself is never removed.
    pub fn prune(&mut self) -> usize {
        let mut removed = 0;
        for child in self.children.values_mut() {
            removed += child.prune();
        }

        let before = self.children.len();
        self.children.retain(|_, child| !child.is_vacant());
        removed + (before - self.children.len())
    }

    /// Like [`TopicNode::prune`], restricted to the nodes along `path`
    pub fn prune_path<S: AsRef<str>>(&mut self, path: &[S]) -> usize {
        let Some((head, tail)) = path.split_first() else {
            return 0;
        };
        let Some(child) = self.children.get_mut(head.as_ref()) else {
            return 0;
        };

        let removed = child.prune_path(tail);
        if child.is_vacant() {
            self.children.remove(head.as_ref());
            removed + 1
        } else {
            removed
        }
    }

    /// Subscribers registered exactly here
    pub fn subscribers(&self) -> &SubscriberSet {
        &self.subscribers
    }

    pub fn child(&self, segment: &str) -> Option<&TopicNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &TopicNode)> {
        self.children.iter().map(|(segment, node)| (segment.as_str(), node))
    }

    /// Follows `path` literally, without wildcard interpretation
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&TopicNode> {
        path.iter()
            .try_fold(self, |node, segment| node.child(segment.as_ref()))
    }

    /// Subscribers registered exactly at `path`. Every segment is a literal,
    /// `*` and `**` included; empty if the path was never created.
    pub fn subscribers_at<S: AsRef<str>>(&self, path: &[S]) -> SubscriberSet {
        self.descend(path)
            .map(|node| node.subscribers.clone())
            .unwrap_or_default()
    }

    /// No subscribers here and no children
    pub fn is_vacant(&self) -> bool {
        self.subscribers.is_empty() && self.children.is_empty()
    }

    /// Number of nodes in this subtree, this one included
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(TopicNode::node_count).sum::<usize>()
    }

    /// Number of (path, subscriber) registrations in this subtree
    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
            + self
                .children
                .values()
                .map(TopicNode::subscription_count)
                .sum::<usize>()
    }

    /// Every registration in this subtree, with paths relative to this node
    pub fn subscriptions(&self) -> Vec<(TopicPath, SubscriberId)> {
        let mut out = Vec::new();
        let mut pending = vec![(self, TopicPath::root())];
        while let Some((node, path)) = pending.pop() {
            out.extend(node.subscribers.iter().map(|id| (path.clone(), id.clone())));
            for (segment, child) in &node.children {
                let mut child_path = path.clone();
                child_path.push(segment.clone());
                pending.push((child, child_path));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_tree() -> TopicNode {
        let mut root = TopicNode::new();
        root.subscribe("sub1", &["nytimes", "us", "editorial"]);
        root.subscribe("sub2", &["washington", "us", "sports"]);
        root.subscribe("sub3", &["nytimes", "india", "politics"]);
        root
    }

    #[test]
    fn subscribe_creates_path() {
        let root = news_tree();
        let leaf = root.descend(&["nytimes", "us", "editorial"]).unwrap();
        assert!(leaf.subscribers().contains("sub1"));
        assert_eq!(root.node_count(), 1 + 2 + 3 + 3);
    }

    #[test]
    fn subscribe_is_idempotent() {
        let mut root = news_tree();
        let before = root.clone();
        assert!(!root.subscribe("sub1", &["nytimes", "us", "editorial"]));
        assert_eq!(root, before);
    }

    #[test]
    fn root_holds_only_explicit_empty_path() {
        let mut root = news_tree();
        assert!(root.subscribers().is_empty());
        root.subscribe::<&str>("everything", &[]);
        assert!(root.subscribers().contains("everything"));
    }

    #[test]
    fn unsubscribe_keeps_empty_nodes() {
        let mut root = news_tree();
        let nodes = root.node_count();
        assert!(root.unsubscribe("sub1", &["nytimes", "us", "editorial"]));
        assert_eq!(root.node_count(), nodes);
        let leaf = root.descend(&["nytimes", "us", "editorial"]).unwrap();
        assert!(leaf.subscribers().is_empty());
    }

    #[test]
    fn unsubscribe_missing_is_noop() {
        let mut root = news_tree();
        let before = root.clone();
        assert!(!root.unsubscribe("sub1", &["nytimes", "uk"]));
        assert!(!root.unsubscribe("nobody", &["nytimes", "us", "editorial"]));
        assert_eq!(root, before);
    }

    #[test]
    fn subscribe_many_registers_each_path() {
        let mut root = news_tree();
        let added = root.subscribe_many::<_, &str>(
            "sub4",
            &[vec!["nytimes", "us", "sports"], vec!["washington", "us", "politics"], vec!["nytimes", "us", "sports"]],
        );
        assert_eq!(added, 2);
        assert!(root.descend(&["washington", "us", "politics"]).unwrap().subscribers().contains("sub4"));
    }

    #[test]
    fn unsubscribe_all_clears_every_node() {
        let mut root = news_tree();
        root.subscribe("sub1", &["washington"]);
        root.subscribe("sub1", &["nytimes"]);
        assert_eq!(root.unsubscribe_all("sub1"), 3);
        assert!(root.subscriptions().iter().all(|(_, id)| id != "sub1"));
    }

    #[test]
    fn prune_removes_only_vacant_branches() {
        let mut root = news_tree();
        root.unsubscribe("sub1", &["nytimes", "us", "editorial"]);
        assert_eq!(root.prune(), 2);
        assert!(root.descend(&["nytimes", "us"]).is_none());
        assert!(root.descend(&["nytimes", "india", "politics"]).is_some());
        assert_eq!(root.prune(), 0);
    }

    #[test]
    fn prune_path_stops_at_populated_node() {
        let mut root = news_tree();
        root.subscribe("sub5", &["nytimes", "us"]);
        root.unsubscribe("sub1", &["nytimes", "us", "editorial"]);
        assert_eq!(root.prune_path(&["nytimes", "us", "editorial"]), 1);
        assert!(root.descend(&["nytimes", "us"]).is_some());
    }

    #[test]
    fn subscribers_at_reads_wildcard_segments_literally() {
        let mut root = TopicNode::new();
        root.subscribe("star", &["a", "*"]);
        root.subscribe("plain", &["a", "b"]);
        let star = TopicPath::parse("a/*", '/');
        assert_eq!(root.subscribers_at(star.segments()), SubscriberSet::from(["star".to_string()]));
        assert!(root.subscribers_at(&["a", "**"]).is_empty());
        assert!(root.subscribers_at(&["a"]).is_empty());
    }

    #[test]
    fn subscriptions_lists_relative_paths() {
        let root = news_tree();
        let nytimes = root.child("nytimes").unwrap();
        let mut listed: Vec<String> = nytimes
            .subscriptions()
            .into_iter()
            .map(|(path, id)| format!("{}={}", path, id))
            .collect();
        listed.sort();
        assert_eq!(listed, ["india/politics=sub3", "us/editorial=sub1"]);
        assert_eq!(root.subscription_count(), 3);
    }
}
