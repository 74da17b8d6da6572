//! Download target definitions.

use std::fmt;

/// A single thing to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every post of a fanclub.
    Fanclub(String),
    /// One post.
    Post(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Fanclub(id) => write!(f, "fanclub {}", id),
            Target::Post(id) => write!(f, "post {}", id),
        }
    }
}
