//! Typed topic paths and query patterns.
//!
//! A [`TopicPath`] is what gets stored: every segment is a literal, including
//! the strings `*` and `**`. A [`TopicPattern`] is what gets queried: the
//! tokens `*` and `**` are always read as wildcards there.

use std::fmt;

use smallvec::SmallVec;

use crate::topictree::types::{Segment, MULTI_LEVEL_WILDCARD, SINGLE_LEVEL_WILDCARD};

/// Most topics are only a handful of levels deep
type Segments<T> = SmallVec<[T; 8]>;

/// Ordered sequence of literal segments
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicPath {
    segments: Segments<Segment>,
}

impl TopicPath {
    /// Empty path, addresses the root
    pub fn root() -> Self {
        Self::default()
    }

    /// Splits `topic` on `separator`. The empty string is the root path;
    /// empty segments between separators are kept as literals.
    pub fn parse(topic: &str, separator: char) -> Self {
        if topic.is_empty() {
            return Self::root();
        }
        topic.split(separator).collect()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Renders the path with `separator` between segments
    pub fn join(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(segment);
        }
        out
    }
}

impl<S: Into<Segment>> FromIterator<S> for TopicPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl AsRef<[Segment]> for TopicPath {
    fn as_ref(&self) -> &[Segment] {
        self.segments()
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(crate::topictree::types::DEFAULT_SEPARATOR))
    }
}

/// One element of a query pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSegment {
    /// Matches a child with exactly this key
    Literal(Segment),
    /// `*`: exactly one level, any key
    SingleLevel,
    /// `**`: zero or more levels
    MultiLevel,
}

impl PatternSegment {
    pub fn from_token(token: &str) -> Self {
        match token {
            SINGLE_LEVEL_WILDCARD => Self::SingleLevel,
            MULTI_LEVEL_WILDCARD => Self::MultiLevel,
            literal => Self::Literal(literal.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(segment) => segment,
            Self::SingleLevel => SINGLE_LEVEL_WILDCARD,
            Self::MultiLevel => MULTI_LEVEL_WILDCARD,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

/// Ordered sequence of literals and wildcards
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TopicPattern {
    segments: Segments<PatternSegment>,
}

impl TopicPattern {
    pub fn parse(pattern: &str, separator: char) -> Self {
        if pattern.is_empty() {
            return Self::default();
        }
        Self::from_tokens(pattern.split(separator))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: tokens
                .into_iter()
                .map(|token| PatternSegment::from_token(token.as_ref()))
                .collect(),
        }
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_wildcards(&self) -> bool {
        self.segments.iter().any(PatternSegment::is_wildcard)
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", crate::topictree::types::DEFAULT_SEPARATOR)?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}
