//! Channel name value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::FayeError;

/// Trailing wildcard of a channel pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wildcard {
    /// `*`: exactly one additional segment.
    Single,
    /// `**`: one or more additional segments.
    Multi,
}

/// A slash-delimited hierarchical channel name, concrete or wildcard.
///
/// Construction normalizes leading, trailing and repeated slashes, so
/// `"foo/bar/"` and `"/foo//bar"` both become `"/foo/bar"`. A `*` is only
/// accepted as the whole last segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName {
    name: String,
    wildcard: Option<Wildcard>,
}

impl ChannelName {
    /// Prefix shared by all protocol control channels.
    pub const META_PREFIX: &'static str = "/meta/";

    /// Parses and normalizes a channel name.
    ///
    /// # Errors
    ///
    /// Returns `FayeError::InvalidChannelName` if a `*` appears anywhere
    /// other than a trailing `*` or `**` segment.
    pub fn parse(raw: &str) -> Result<Self, FayeError> {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();

        let mut wildcard = None;
        for (index, segment) in segments.iter().enumerate() {
            if !segment.contains('*') {
                continue;
            }
            let is_last = index + 1 == segments.len();
            wildcard = match (*segment, is_last) {
                ("*", true) => Some(Wildcard::Single),
                ("**", true) => Some(Wildcard::Multi),
                _ => return Err(FayeError::InvalidChannelName(raw.to_string())),
            };
        }

        let name = if segments.is_empty() {
            String::new()
        } else {
            format!("/{}", segments.join("/"))
        };

        Ok(Self { name, wildcard })
    }

    /// Builds the control channel `/meta/{kind}`. `kind` must be a single
    /// plain segment.
    pub(crate) fn meta(kind: &str) -> Self {
        Self {
            name: format!("{}{}", Self::META_PREFIX, kind),
            wildcard: None,
        }
    }

    /// Returns the canonical name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    pub fn wildcard(&self) -> Option<Wildcard> {
        self.wildcard
    }

    /// True for `**` patterns.
    pub fn is_multi_segment(&self) -> bool {
        self.wildcard == Some(Wildcard::Multi)
    }

    /// True for `/meta/...` control channels.
    pub fn is_meta(&self) -> bool {
        self.name.starts_with(Self::META_PREFIX)
    }

    /// The part of a wildcard pattern before its first `*`, including the
    /// separating slash. For a concrete name this is the whole name.
    pub fn wildcard_base(&self) -> &str {
        match self.name.find('*') {
            Some(index) => &self.name[..index],
            None => &self.name,
        }
    }

    /// Returns true if this pattern matches `candidate`.
    ///
    /// See [`super::matches`].
    pub fn matches(&self, candidate: &ChannelName) -> bool {
        super::matches(self, candidate)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl FromStr for ChannelName {
    type Err = FayeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = FayeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelName> for String {
    fn from(channel: ChannelName) -> Self {
        channel.name
    }
}
