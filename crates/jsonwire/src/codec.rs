//! Seams for tree-model and data-binding collaborators.
//!
//! The streaming layer neither builds trees nor binds values; higher layers
//! do, through two capability traits. [`TreeNode`] is the minimal shape of an
//! opaque document node, and an [`ObjectCodec`] moves whole trees across a
//! parser or generator. The streaming types consume these traits, they never
//! implement them.

use std::io::Write;

use crate::{
    error::Result,
    parser::Parser,
    pointer::{Pointer, Segment},
    writer::Generator,
};

/// Minimal capability of an opaque document tree node.
pub trait TreeNode {
    /// `true` for an object node.
    fn is_object(&self) -> bool;
    /// `true` for an array node.
    fn is_array(&self) -> bool;
    /// `true` for a scalar (non-container) node.
    fn is_value(&self) -> bool {
        !self.is_object() && !self.is_array()
    }
    /// Number of children (members or elements); 0 for scalars.
    fn size(&self) -> usize;
    /// The member with the given name, objects only.
    fn get_field(&self, name: &str) -> Option<&Self>;
    /// The element at the given index, arrays only.
    fn get_index(&self, index: usize) -> Option<&Self>;

    /// Resolves a pointer segment against this node: index access for
    /// arrays, name access for objects.
    fn get_segment(&self, segment: &Segment) -> Option<&Self> {
        if self.is_array() {
            segment.index().and_then(|i| self.get_index(i))
        } else if self.is_object() {
            self.get_field(segment.name())
        } else {
            None
        }
    }

    /// Walks a JSON Pointer from this node; `None` when any step is missing.
    fn at(&self, pointer: &Pointer) -> Option<&Self> {
        let mut node = self;
        for segment in pointer.segments() {
            node = node.get_segment(segment)?;
        }
        Some(node)
    }
}

/// A collaborator that can move whole trees across the streaming layer.
pub trait ObjectCodec {
    /// The tree node type this codec produces and consumes.
    type Node: TreeNode;

    /// Reads the value the parser is positioned on (advancing over it) into
    /// a tree.
    ///
    /// # Errors
    ///
    /// Parse errors from the underlying token stream.
    fn read_tree(&self, parser: &mut Parser) -> Result<Self::Node>;

    /// Writes a tree as the next value of the generator.
    ///
    /// # Errors
    ///
    /// Generation and I/O errors from the generator.
    fn write_tree<W: Write>(&self, generator: &mut Generator<W>, node: &Self::Node) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    enum Node {
        Object(BTreeMap<String, Node>),
        Array(Vec<Node>),
        Scalar,
    }

    impl TreeNode for Node {
        fn is_object(&self) -> bool {
            matches!(self, Node::Object(_))
        }

        fn is_array(&self) -> bool {
            matches!(self, Node::Array(_))
        }

        fn size(&self) -> usize {
            match self {
                Node::Object(m) => m.len(),
                Node::Array(v) => v.len(),
                Node::Scalar => 0,
            }
        }

        fn get_field(&self, name: &str) -> Option<&Self> {
            match self {
                Node::Object(m) => m.get(name),
                _ => None,
            }
        }

        fn get_index(&self, index: usize) -> Option<&Self> {
            match self {
                Node::Array(v) => v.get(index),
                _ => None,
            }
        }
    }

    #[test]
    fn pointer_walk_over_default_methods() {
        let tree = Node::Object(BTreeMap::from([(
            "a".to_owned(),
            Node::Array(vec![Node::Scalar, Node::Object(BTreeMap::from([(
                "b".to_owned(),
                Node::Scalar,
            )]))]),
        )]));

        let p = Pointer::parse("/a/1/b").unwrap();
        let hit = tree.at(&p).expect("path exists");
        assert!(hit.is_value());

        assert!(tree.at(&Pointer::parse("/a/2").unwrap()).is_none());
        assert!(tree.at(&Pointer::parse("/missing").unwrap()).is_none());
        // The empty pointer is the node itself.
        assert!(tree.at(&Pointer::empty()).expect("self").is_object());
    }
}
