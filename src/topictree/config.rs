use std::fs;
use std::path::Path;

use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Result, TopicTreeError};
use crate::topictree::types::{Segment, DEFAULT_SEPARATOR, MULTI_LEVEL_WILDCARD, SINGLE_LEVEL_WILDCARD};

/// Behaviour of a [`crate::topictree::TopicTree`]. Every check is off by
/// default, which leaves registration accepting any segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Delimiter for string topics
    pub separator: char,
    /// Reject `*` and `**` as literal segments on subscribe
    pub reject_reserved_segments: bool,
    /// Reject empty segments on subscribe
    pub reject_empty_segments: bool,
    /// Reject paths deeper than this on subscribe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Remove nodes emptied by an unsubscribe
    pub prune_on_unsubscribe: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            reject_reserved_segments: false,
            reject_empty_segments: false,
            max_depth: None,
            prune_on_unsubscribe: false,
        }
    }
}

impl TreeConfig {
    /// Strict registration boundary: no wildcard literals, no empty segments
    pub fn strict() -> Self {
        Self {
            reject_reserved_segments: true,
            reject_empty_segments: true,
            ..Self::default()
        }
    }

    /// Checks the config itself
    pub fn validate(&self) -> Result<()> {
        if self.separator == '*' {
            return Err(TopicTreeError::config("separator must not be the wildcard character '*'"));
        }
        if self.max_depth == Some(0) {
            return Err(TopicTreeError::config("max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Checks a registration path against the enabled rules
    pub fn validate_path(&self, segments: &[Segment]) -> Result<()> {
        if let Some(max_depth) = self.max_depth {
            if segments.len() > max_depth {
                return Err(TopicTreeError::depth_exceeded(segments.len(), max_depth));
            }
        }

        for (position, segment) in segments.iter().enumerate() {
            if self.reject_empty_segments && segment.is_empty() {
                return Err(TopicTreeError::empty_segment(position));
            }
            if self.reject_reserved_segments
                && (segment == SINGLE_LEVEL_WILDCARD || segment == MULTI_LEVEL_WILDCARD)
            {
                return Err(TopicTreeError::reserved_segment(segment, position));
            }
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TopicTreeError::config(format!("Failed to serialize to TOML: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }
}

/// One `[[subscriptions]]` entry of the demo config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub subscriber: String,
    pub topics: Vec<String>,
}

/// Config of the demo binary: tree settings, subscriptions to load and
/// patterns to resolve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub tree: TreeConfig,
    pub subscriptions: Vec<SubscriptionEntry>,
    pub queries: Vec<String>,
}

impl DemoConfig {
    /// Newspaper sections, used when no config file is present
    pub fn news_sample() -> Self {
        let entry = |subscriber: &str, topics: &[&str]| SubscriptionEntry {
            subscriber: subscriber.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
        };

        Self {
            tree: TreeConfig::default(),
            subscriptions: vec![
                entry("sub1", &["nytimes/us/editorial"]),
                entry("sub2", &["washington/us/sports"]),
                entry("sub3", &["nytimes/india/politics"]),
                entry("sub4", &["nytimes/us/sports", "washington/us/politics"]),
            ],
            queries: vec![
                "nytimes/us/editorial".to_string(),
                "*/us/editorial".to_string(),
                "nytimes/**".to_string(),
                "**/sports".to_string(),
            ],
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_toml(path)?;
        config.tree.validate()?;
        Ok(config)
    }
}

fn read_toml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let parsed = toml::from_str(&content)
        .map_err(|e| TopicTreeError::config(format!("Failed to parse TOML: {}", e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(parsed)
}
