//! Nesting context shared by the parser and the generator.
//!
//! A [`StreamContext`] describes one open container: root, array, or object,
//! with the entry index (starting at -1), the current member name for
//! objects, and an opaque current-value slot for higher layers. The
//! [`ContextStack`] is a Vec of frames whose top is the innermost container;
//! the root frame is always present.

use std::{any::Any, collections::HashSet, fmt, sync::Arc};

use crate::pointer::Pointer;

/// The container type of a context frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// Outside any container; a sequence of root values.
    Root,
    /// Inside `[` ... `]`.
    Array,
    /// Inside `{` ... `}`.
    Object,
}

impl ContextKind {
    /// Short type description used in error messages.
    #[must_use]
    pub const fn type_desc(self) -> &'static str {
        match self {
            ContextKind::Root => "root",
            ContextKind::Array => "Array",
            ContextKind::Object => "Object",
        }
    }
}

/// One frame of the nesting stack.
pub struct StreamContext {
    kind: ContextKind,
    index: i64,
    name: Option<Arc<str>>,
    dups: Option<HashSet<Arc<str>>>,
    value: Option<Box<dyn Any + Send>>,
}

impl fmt::Debug for StreamContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamContext")
            .field("kind", &self.kind)
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl StreamContext {
    fn new(kind: ContextKind, track_dups: bool) -> Self {
        StreamContext {
            kind,
            index: -1,
            name: None,
            dups: if track_dups && kind == ContextKind::Object {
                Some(HashSet::new())
            } else {
                None
            },
            value: None,
        }
    }

    /// The container type of this frame.
    #[must_use]
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Index of the current entry, `-1` before the first.
    #[must_use]
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Number of entries started so far.
    #[must_use]
    pub fn entry_count(&self) -> i64 {
        self.index + 1
    }

    /// Current member name, objects only.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether a member name is pending.
    #[must_use]
    pub fn has_current_name(&self) -> bool {
        self.name.is_some()
    }

    /// Stores an opaque value for higher layers (data-binding state etc.).
    pub fn set_current_value(&mut self, value: Box<dyn Any + Send>) {
        self.value = Some(value);
    }

    /// The opaque value slot, if set.
    #[must_use]
    pub fn current_value(&self) -> Option<&(dyn Any + Send)> {
        self.value.as_deref()
    }

    /// Records the member name just read/written.
    ///
    /// Returns `false` when duplicate tracking is active and the name was
    /// already present in this object.
    pub(crate) fn set_current_name(&mut self, name: Arc<str>) -> bool {
        let fresh = match &mut self.dups {
            Some(seen) => seen.insert(Arc::clone(&name)),
            None => true,
        };
        self.name = Some(name);
        fresh
    }

    /// Bumps the entry index; called once per value (and per root value).
    pub(crate) fn advance(&mut self) {
        self.index += 1;
    }
}

/// The nesting stack; the root frame is always present at the bottom.
#[derive(Debug)]
pub struct ContextStack {
    frames: Vec<StreamContext>,
    track_dups: bool,
}

impl ContextStack {
    pub(crate) fn new(track_dups: bool) -> Self {
        ContextStack {
            frames: vec![StreamContext::new(ContextKind::Root, false)],
            track_dups,
        }
    }

    /// The innermost open container.
    #[must_use]
    pub fn current(&self) -> &StreamContext {
        self.frames.last().expect("root frame always present")
    }

    pub(crate) fn current_mut(&mut self) -> &mut StreamContext {
        self.frames.last_mut().expect("root frame always present")
    }

    /// The frame enclosing the current one, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&StreamContext> {
        self.frames.iter().rev().nth(1)
    }

    /// Nesting depth: 0 at root, 1 inside the first container.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Whether only the root frame remains.
    #[must_use]
    pub fn in_root(&self) -> bool {
        self.frames.len() == 1
    }

    pub(crate) fn push(&mut self, kind: ContextKind) {
        debug_assert!(kind != ContextKind::Root);
        self.frames.push(StreamContext::new(kind, self.track_dups));
    }

    /// Pops the innermost container; `None` when already at root.
    pub(crate) fn pop(&mut self) -> Option<StreamContext> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Renders the current position as a JSON Pointer.
    ///
    /// Object frames contribute their current member name, array frames the
    /// current index; the root contributes nothing.
    #[must_use]
    pub fn pointer(&self) -> Pointer {
        let mut names = Vec::with_capacity(self.depth());
        for frame in &self.frames[1..] {
            match frame.kind {
                ContextKind::Object => {
                    let Some(name) = frame.current_name() else {
                        break;
                    };
                    names.push(name.to_owned());
                }
                ContextKind::Array => {
                    if frame.index < 0 {
                        break;
                    }
                    names.push(frame.index.to_string());
                }
                ContextKind::Root => unreachable!(),
            }
        }
        Pointer::from_names(names)
    }
}
