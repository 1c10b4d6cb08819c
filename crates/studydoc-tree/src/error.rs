//! Error types for tree parsing and manipulation.

use crate::tree::NodeId;

/// Error while reading HTML into a tree or restructuring a tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    /// XML parse error.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// The node does not belong to this tree.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// The node has no parent (it is the root or was already detached).
    #[error("node {0:?} has no parent")]
    Detached(NodeId),

    /// The node's parent does not list it among its children.
    #[error("node {node:?} is not among the children of its parent {parent:?}")]
    NotInParent {
        /// Node that was looked up.
        node: NodeId,
        /// Parent recorded on the node.
        parent: NodeId,
    },

    /// The node cannot hold children.
    #[error("node {0:?} cannot have children")]
    NotAParent(NodeId),

    /// The node cannot be inserted as a child (the document root, or a node
    /// that is still attached elsewhere).
    #[error("node {0:?} cannot be inserted here")]
    InvalidChild(NodeId),
}
