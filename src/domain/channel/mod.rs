//! Channel names and wildcard matching.
//!
//! Pure functions over slash-delimited channel names:
//!
//! - `/foo/*` matches exactly one more segment (`/foo/bar`)
//! - `/foo/**` matches one or more (`/foo/bar`, `/foo/bar/baz`)
//! - a wildcard candidate never matches anything

mod matcher;
mod name;

pub use matcher::{matches, wildcard_expand};
pub use name::{ChannelName, Wildcard};
