//! Wildcard resolution and subtree aggregation.
//!
//! Both walks run on an explicit work list, so stack usage does not grow with
//! topic depth. A pending entry is a node paired with the offset of the
//! pattern suffix still to be matched below it:
//!
//! - empty suffix: the node's own subscribers are collected
//! - literal `L`: continue in child `L`, if any
//! - `*`: continue in every child with the next offset
//! - `**`: continue in the same node with the next offset (zero levels) and
//!   in every child with the same offset (one or more levels)
//!
//! Distinct routes through `**` can reach the same (node, offset) pair; each
//! pair is expanded once per query.

use std::collections::HashSet;

use log::debug;

use crate::topictree::node::TopicNode;
use crate::topictree::path::{PatternSegment, TopicPattern};
use crate::topictree::types::SubscriberSet;

impl TopicNode {
    /// Union of the subscriber sets of every node matching `pattern`, with
    /// this node as the root of the query
    pub fn matches(&self, pattern: &TopicPattern) -> SubscriberSet {
        let result = self.resolve(pattern.segments());
        debug!("pattern {} matched {} subscribers", pattern, result.len());
        result
    }

    /// Same as [`TopicNode::matches`] for raw tokens, `*` and `**` included
    pub fn matches_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> SubscriberSet {
        self.matches(&TopicPattern::from_tokens(tokens))
    }

    pub(crate) fn resolve(&self, pattern: &[PatternSegment]) -> SubscriberSet {
        self.resolve_counted(pattern).0
    }

    /// Resolves `pattern` and also returns how many (node, offset) states
    /// were expanded
    pub(crate) fn resolve_counted(&self, pattern: &[PatternSegment]) -> (SubscriberSet, usize) {
        let mut result = SubscriberSet::new();
        let mut expanded: HashSet<(*const TopicNode, usize)> = HashSet::new();
        let mut pending: Vec<(&TopicNode, usize)> = vec![(self, 0)];

        while let Some((node, offset)) = pending.pop() {
            if !expanded.insert((node as *const TopicNode, offset)) {
                continue;
            }

            match pattern.get(offset) {
                None => result.extend(node.subscribers.iter().cloned()),
                Some(PatternSegment::Literal(segment)) => {
                    if let Some(child) = node.children.get(segment) {
                        pending.push((child, offset + 1));
                    }
                }
                Some(PatternSegment::SingleLevel) => {
                    pending.extend(node.children.values().map(|child| (child, offset + 1)));
                }
                Some(PatternSegment::MultiLevel) => {
                    pending.push((node, offset + 1));
                    pending.extend(node.children.values().map(|child| (child, offset)));
                }
            }
        }

        (result, expanded.len())
    }

    /// Everyone registered at this node or anywhere below it. Equivalent to
    /// matching `**` from here, without the pattern bookkeeping.
    pub fn subtree_subscribers(&self) -> SubscriberSet {
        let mut result = SubscriberSet::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            result.extend(node.subscribers.iter().cloned());
            pending.extend(node.children.values());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> SubscriberSet {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn news_tree() -> TopicNode {
        let mut root = TopicNode::new();
        root.subscribe("sub1", &["nytimes", "us", "editorial"]);
        root.subscribe("sub2", &["washington", "us", "sports"]);
        root.subscribe("sub3", &["nytimes", "india", "politics"]);
        root.subscribe_many::<_, &str>("sub4", &[["nytimes", "us", "sports"], ["washington", "us", "politics"]]);
        root
    }

    #[test]
    fn exact_match() {
        let root = news_tree();
        assert_eq!(root.matches_tokens(&["nytimes", "us", "editorial"]), set(&["sub1"]));
    }

    #[test]
    fn missing_literal_matches_nothing() {
        let root = news_tree();
        assert!(root.matches_tokens(&["nytimes", "uk", "editorial"]).is_empty());
        assert!(root.matches_tokens(&["nytimes", "us", "editorial", "extra"]).is_empty());
    }

    #[test]
    fn intermediate_node_has_no_subscribers_of_its_own() {
        let root = news_tree();
        assert!(root.matches_tokens(&["nytimes", "us"]).is_empty());
    }

    #[test]
    fn single_level_wildcard() {
        let root = news_tree();
        assert_eq!(root.matches_tokens(&["*", "us", "editorial"]), set(&["sub1"]));
        assert_eq!(root.matches_tokens(&["*", "us", "sports"]), set(&["sub2", "sub4"]));
        assert_eq!(root.matches_tokens(&["nytimes", "*", "*"]), set(&["sub1", "sub3", "sub4"]));
    }

    #[test]
    fn single_level_wildcard_consumes_exactly_one_level() {
        let root = news_tree();
        assert!(root.matches_tokens(&["*", "editorial"]).is_empty());
        assert!(root.matches_tokens(&["nytimes", "*"]).is_empty());
    }

    #[test]
    fn multi_level_wildcard() {
        let root = news_tree();
        assert_eq!(root.matches_tokens(&["nytimes", "**"]), set(&["sub1", "sub3", "sub4"]));
        assert_eq!(root.matches_tokens(&["**", "sports"]), set(&["sub2", "sub4"]));
        assert_eq!(root.matches_tokens(&["**", "us", "**"]), set(&["sub1", "sub2", "sub4"]));
    }

    #[test]
    fn multi_level_wildcard_matches_zero_levels() {
        let mut root = news_tree();
        root.subscribe("sub5", &["nytimes"]);
        assert_eq!(root.matches_tokens(&["nytimes", "**"]), set(&["sub1", "sub3", "sub4", "sub5"]));
        assert_eq!(root.matches_tokens(&["nytimes", "**", "editorial"]), set(&["sub1"]));
        assert_eq!(root.matches_tokens(&["**", "nytimes"]), set(&["sub5"]));
    }

    #[test]
    fn lone_multi_level_wildcard_matches_everything() {
        let mut root = news_tree();
        root.subscribe::<&str>("root", &[]);
        assert_eq!(
            root.matches_tokens(&["**"]),
            set(&["root", "sub1", "sub2", "sub3", "sub4"])
        );
    }

    #[test]
    fn empty_pattern_returns_own_subscribers() {
        let mut root = news_tree();
        assert!(root.matches(&TopicPattern::default()).is_empty());
        root.subscribe::<&str>("root", &[]);
        assert_eq!(root.matches(&TopicPattern::default()), set(&["root"]));
    }

    #[test]
    fn stacked_multi_level_wildcards_terminate() {
        let mut root = TopicNode::new();
        let deep: Vec<String> = (0..64).map(|i| format!("l{}", i)).collect();
        root.subscribe("deep", deep.as_slice());
        assert_eq!(root.matches_tokens(&["**", "**", "**", "l63"]), set(&["deep"]));
        assert_eq!(root.matches_tokens(&["**", "l10", "**", "**"]), set(&["deep"]));
    }

    #[test]
    fn each_state_is_expanded_once() {
        let mut root = TopicNode::new();
        for a in ["a", "b", "c", "d"] {
            for b in ["e", "f", "g"] {
                for c in ["h", "i"] {
                    root.subscribe(&format!("{a}{b}{c}"), &[a, b, c]);
                }
            }
        }
        let nodes = root.node_count();
        assert_eq!(nodes, 1 + 4 + 12 + 24);

        let pattern = TopicPattern::from_tokens(["**", "**", "**"]);
        let (result, expanded) = root.resolve_counted(pattern.segments());
        assert_eq!(result.len(), 24);
        assert_eq!(expanded, nodes * (pattern.len() + 1));

        let pattern = TopicPattern::from_tokens(["**", "*", "**", "h"]);
        let (result, expanded) = root.resolve_counted(pattern.segments());
        assert_eq!(result.len(), 12);
        assert!(expanded <= nodes * (pattern.len() + 1));
    }

    #[test]
    fn stored_wildcard_literals_are_only_reached_by_wildcards() {
        let mut root = TopicNode::new();
        root.subscribe("star", &["a", "*"]);
        root.subscribe("plain", &["a", "b"]);
        assert_eq!(root.matches_tokens(&["a", "*"]), set(&["star", "plain"]));
        assert_eq!(root.subtree_subscribers(), set(&["star", "plain"]));
    }

    #[test]
    fn subtree_equals_multi_level_match() {
        let mut root = news_tree();
        root.subscribe("sub5", &["nytimes"]);
        let nytimes = root.child("nytimes").unwrap();
        assert_eq!(nytimes.subtree_subscribers(), set(&["sub1", "sub3", "sub4", "sub5"]));
        assert_eq!(nytimes.subtree_subscribers(), nytimes.matches_tokens(&["**"]));
        assert_eq!(root.subtree_subscribers(), root.matches_tokens(&["**"]));
    }

    #[test]
    fn removal_leaves_siblings_queryable() {
        let mut root = news_tree();
        root.unsubscribe("sub1", &["nytimes", "us", "editorial"]);
        assert!(root.matches_tokens(&["nytimes", "us", "editorial"]).is_empty());
        assert_eq!(root.matches_tokens(&["nytimes", "us", "sports"]), set(&["sub4"]));
        assert_eq!(root.matches_tokens(&["nytimes", "**"]), set(&["sub3", "sub4"]));
    }
}
