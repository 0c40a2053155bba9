//! Canonical topic paths.
//!
//! A topic is a path of lowercase segments. Any input string is
//! canonicalized by treating `.`, `\` and `/` as separators, collapsing
//! repeated separators, trimming separators at both ends, and
//! lower-casing:
//!
//! ```text
//! "A.B.C"         → a/b/c
//! "/app//Request/" → app/request
//! "view\\render"  → view/render
//! ```
//!
//! Two inputs with the same canonical form are the same topic.

use crate::EventError;
use std::fmt;
use std::str::FromStr;

/// Characters that separate topic segments.
pub(crate) const SEPARATORS: [char; 3] = ['.', '/', '\\'];

/// A canonical topic. Always has at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic {
    segments: Vec<String>,
}

impl Topic {
    /// Canonicalizes `raw` into a topic.
    ///
    /// Whitespace around a segment is trimmed; a segment made only of
    /// whitespace is dropped like an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidTopic`] if nothing is left.
    ///
    /// ```
    /// use weft_event::Topic;
    ///
    /// let topic = Topic::parse("App.Request/Start").unwrap();
    /// assert_eq!(topic.to_string(), "app/request/start");
    /// assert_eq!(topic, Topic::parse("/app\\request//start/").unwrap());
    /// assert!(Topic::parse(" ./ ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        let segments: Vec<String> = raw
            .split(SEPARATORS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();

        if segments.is_empty() {
            return Err(EventError::InvalidTopic(raw.to_string()));
        }

        Ok(Self { segments })
    }

    /// Returns the segments, root-most first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for Topic {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Conversion into the non-empty topic set accepted by
/// [`EventBus::bind`](crate::EventBus::bind).
///
/// Implemented for a single topic string, a [`Topic`], and slices,
/// arrays and vectors of either.
pub trait IntoTopics {
    /// Canonicalizes every entry.
    ///
    /// # Errors
    ///
    /// [`EventError::NoTopics`] for an empty set, or the first
    /// [`EventError::InvalidTopic`].
    fn into_topics(self) -> Result<Vec<Topic>, EventError>;
}

fn collect_topics<I, S>(items: I) -> Result<Vec<Topic>, EventError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let topics = items
        .into_iter()
        .map(|s| Topic::parse(s.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if topics.is_empty() {
        return Err(EventError::NoTopics);
    }
    Ok(topics)
}

impl IntoTopics for &str {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics([self])
    }
}

impl IntoTopics for String {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics([self])
    }
}

impl IntoTopics for &String {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics([self])
    }
}

impl IntoTopics for Topic {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        Ok(vec![self])
    }
}

impl IntoTopics for Vec<Topic> {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        if self.is_empty() {
            return Err(EventError::NoTopics);
        }
        Ok(self)
    }
}

impl IntoTopics for &[&str] {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics(self)
    }
}

impl<const N: usize> IntoTopics for [&str; N] {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics(self)
    }
}

impl IntoTopics for Vec<&str> {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics(self)
    }
}

impl IntoTopics for Vec<String> {
    fn into_topics(self) -> Result<Vec<Topic>, EventError> {
        collect_topics(self)
    }
}
