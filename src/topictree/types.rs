use std::collections::HashSet;

/// Subscriber = opaque string id
pub type SubscriberId = String;

/// One literal unit of a topic path
pub type Segment = String;

/// Result of every query: set of subscriber ids, no order
pub type SubscriberSet = HashSet<SubscriberId>;

/// Query token matching exactly one segment
pub const SINGLE_LEVEL_WILDCARD: &str = "*";

/// Query token matching zero or more segments
pub const MULTI_LEVEL_WILDCARD: &str = "**";

/// Default separator for string topics
pub const DEFAULT_SEPARATOR: char = '/';
