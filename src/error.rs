use thiserror::Error;

/// A structural defect found by [`AvlTree::check_invariants`](crate::AvlTree::check_invariants).
///
/// Keys are rendered with their `Debug` representation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("keys out of order: {prev} precedes {next}")]
    OutOfOrder { prev: String, next: String },

    #[error("node {key} is unbalanced: left height {left}, right height {right}")]
    Unbalanced {
        key: String,
        left: usize,
        right: usize,
    },

    #[error("node {key} stores balance {stored}, but its subtree heights differ by {actual}")]
    StaleBalance { key: String, stored: i8, actual: i8 },

    #[error("child {child} of node {parent} does not link back to it")]
    BrokenParentLink { parent: String, child: String },

    #[error("root {key} has a parent link")]
    RootHasParent { key: String },

    #[error("tree holds {expected} elements, but {found} are reachable from the root")]
    LengthMismatch { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_keys() {
        let violation = InvariantViolation::StaleBalance {
            key: "7".into(),
            stored: 1,
            actual: -1,
        };

        assert_eq!(
            violation.to_string(),
            "node 7 stores balance 1, but its subtree heights differ by -1"
        );
    }
}
