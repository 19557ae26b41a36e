//! Hierarchical topic trie for publish/subscribe routing.
//!
//! [`TopicNode`] is the single-owner core. [`TopicTree`] adds configurable
//! validation at the registration boundary and [`SharedTopicTree`] shards the
//! trie for concurrent use. The free functions below are the plain
//! programmatic surface over a caller-owned root.

pub mod config;
pub mod node;
pub mod path;
pub mod shared;
pub mod tree;
pub mod types;
mod matcher;

pub use config::{DemoConfig, SubscriptionEntry, TreeConfig};
pub use node::TopicNode;
pub use path::{PatternSegment, TopicPath, TopicPattern};
pub use shared::SharedTopicTree;
pub use tree::{SubscribeReport, TopicTree};
pub use types::{Segment, SubscriberId, SubscriberSet};

/// Fresh, empty root
pub fn create_tree() -> TopicNode {
    TopicNode::new()
}

pub fn subscribe<S: AsRef<str>>(tree: &mut TopicNode, subscriber: &str, path: &[S]) {
    tree.subscribe(subscriber, path);
}

pub fn subscribe_many<P, S>(tree: &mut TopicNode, subscriber: &str, paths: &[P])
where
    P: AsRef<[S]>,
    S: AsRef<str>,
{
    tree.subscribe_many(subscriber, paths);
}

pub fn unsubscribe<S: AsRef<str>>(tree: &mut TopicNode, subscriber: &str, path: &[S]) {
    tree.unsubscribe(subscriber, path);
}

/// Resolves `pattern` (literals, `*`, `**`) against `tree`
pub fn match_pattern<S: AsRef<str>>(tree: &TopicNode, pattern: &[S]) -> SubscriberSet {
    tree.matches_tokens(pattern)
}

pub fn subtree_subscribers(node: &TopicNode) -> SubscriberSet {
    node.subtree_subscribers()
}
