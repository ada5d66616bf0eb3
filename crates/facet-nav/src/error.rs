use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors returned by navigation-tree traversal.
///
/// `DepthExceeded` and `MissingScope` never reach callers of `get_node`: the
/// engine converts both into an empty leaf so a misconfigured tree still
/// renders (see the engine's expansion path).
#[derive(Debug)]
pub enum NavError {
    /// Query provider failure (index/network), surfaced to the caller.
    Backend(String),
    /// The expansion deadline passed before the provider call was issued.
    Timeout,
    /// No resolvable document scope is configured.
    MissingScope,
    /// Internal safety guard against pathological facet configurations.
    DepthExceeded,
    /// The requested path names a segment that does not exist. Distinct from
    /// an empty bucket, which is a valid zero-count node.
    NotFound(String),
}

impl Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::Backend(s) => write!(f, "backend error: {}", s),
            NavError::Timeout => write!(f, "expansion deadline exceeded"),
            NavError::MissingScope => write!(f, "no document scope configured"),
            NavError::DepthExceeded => write!(f, "maximum navigation depth exceeded"),
            NavError::NotFound(p) => write!(f, "no such navigation node: {}", p),
        }
    }
}

impl Error for NavError {}

// Provider calls return anyhow::Result; fold those into the Backend variant.
impl From<anyhow::Error> for NavError {
    fn from(e: anyhow::Error) -> Self {
        NavError::Backend(e.to_string())
    }
}
