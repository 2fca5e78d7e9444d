//! Internal edge records.

use super::attributes::AttrMap;
use super::types::Key;

/// Internal edge record.
///
/// `directed` and the endpoints are fixed at creation; `generated` records
/// whether the key was auto-assigned, which is informational only: a
/// generated key behaves exactly like a user-supplied one.
#[derive(Debug, Clone)]
pub(crate) struct EdgeData {
    pub(crate) source: Key,
    pub(crate) target: Key,
    pub(crate) directed: bool,
    pub(crate) generated: bool,
    pub(crate) attributes: AttrMap,
}

impl EdgeData {
    pub(crate) fn new(
        source: Key,
        target: Key,
        directed: bool,
        generated: bool,
        attributes: AttrMap,
    ) -> Self {
        EdgeData { source, target, directed, generated, attributes }
    }

    pub(crate) fn is_loop(&self) -> bool {
        self.source == self.target
    }

    /// The endpoint opposite to `node`, or `None` if `node` is not an
    /// endpoint of this edge.
    pub(crate) fn opposite(&self, node: &Key) -> Option<&Key> {
        if *node == self.source {
            Some(&self.target)
        } else if *node == self.target {
            Some(&self.source)
        } else {
            None
        }
    }
}
