//! Environment: the chain of lexical frames active during a traversal.
//!
//! Frames live on a stack owned by the pass. A frame is pushed when a
//! binding construct is entered and popped when its visit ends, so the chain
//! is always linear and never outlives the subtree it was created for.

use indexmap::IndexMap;

use crate::base::Name;
use crate::syntax::NodeId;

use super::definition::DefId;
use super::scope::ScopeId;

/// The construct that introduced a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Builtins. Always the outermost frame.
    Global,
    Let,
    Lambda,
    Rec,
    /// `with` fallback. Its names are only known at run time.
    With,
}

impl FrameKind {
    pub fn is_dynamic(self) -> bool {
        self == FrameKind::With
    }
}

/// Identifies a pushed frame; pass it back to [`Environment::pop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(usize);

/// The outcome of resolving a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Statically bound.
    Defined(DefId),
    /// Not statically bound, but provided at run time by one of these `with`
    /// expressions (innermost first).
    Dynamic(Vec<NodeId>),
    Unresolved,
}

/// A resolution plus the innermost `with` passed on the way to a static binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lookup {
    pub resolution: Resolution,
    pub crossed_with: Option<NodeId>,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    syntax: Option<NodeId>,
    scope: ScopeId,
    defs: IndexMap<Name, DefId>,
    /// Names of this frame temporarily skipped by lookups.
    hidden: Vec<Name>,
}

/// A frame after it left the stack.
#[derive(Debug)]
pub struct PoppedFrame {
    pub kind: FrameKind,
    pub syntax: Option<NodeId>,
    pub defs: IndexMap<Name, DefId>,
}

#[derive(Debug, Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: FrameKind, syntax: Option<NodeId>, scope: ScopeId) -> FrameHandle {
        self.frames.push(Frame {
            kind,
            syntax,
            scope,
            defs: IndexMap::new(),
            hidden: Vec::new(),
        });
        FrameHandle(self.frames.len() - 1)
    }

    /// Pop `handle` together with anything still pushed above it.
    pub fn pop(&mut self, handle: FrameHandle) -> Option<PoppedFrame> {
        if handle.0 >= self.frames.len() {
            return None;
        }
        self.frames.truncate(handle.0 + 1);
        self.frames.pop().map(|frame| PoppedFrame {
            kind: frame.kind,
            syntax: frame.syntax,
            defs: frame.defs,
        })
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame.
    ///
    /// Fails with the existing definition when the frame already binds it.
    /// Binding into an empty environment is a no-op.
    pub fn define(&mut self, name: Name, def: DefId) -> Result<(), DefId> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        match frame.defs.get(&name) {
            Some(existing) => Err(*existing),
            None => {
                frame.defs.insert(name, def);
                Ok(())
            }
        }
    }

    /// The definition of `name` in the innermost frame only.
    pub fn lookup_local(&self, name: &str) -> Option<DefId> {
        self.frames.last()?.defs.get(name).copied()
    }

    /// Resolve `name` through the whole chain.
    pub fn resolve(&self, name: &str) -> Resolution {
        self.lookup(name).resolution
    }

    pub fn lookup(&self, name: &str) -> Lookup {
        self.lookup_skipping(name, 0)
    }

    /// Resolve `name` starting below the innermost frame.
    pub fn lookup_outer(&self, name: &str) -> Lookup {
        self.lookup_skipping(name, 1)
    }

    fn lookup_skipping(&self, name: &str, skip: usize) -> Lookup {
        let mut withs = Vec::new();
        for frame in self.frames.iter().rev().skip(skip) {
            if frame.kind.is_dynamic() {
                withs.extend(frame.syntax);
                continue;
            }
            if frame.hidden.iter().any(|hidden| hidden == name) {
                continue;
            }
            if let Some(def) = frame.defs.get(name) {
                return Lookup {
                    resolution: Resolution::Defined(*def),
                    crossed_with: withs.first().copied(),
                };
            }
        }
        let resolution = if withs.is_empty() {
            Resolution::Unresolved
        } else {
            Resolution::Dynamic(withs)
        };
        Lookup {
            resolution,
            crossed_with: None,
        }
    }

    /// Skip `names` of the innermost frame until [`Environment::unhide`].
    pub fn hide(&mut self, names: Vec<Name>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.hidden = names;
        }
    }

    pub fn unhide(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.hidden.clear();
        }
    }

    /// Syntax of the innermost frame that has any.
    pub fn nearest_syntax(&self) -> Option<NodeId> {
        self.frames.iter().rev().find_map(|frame| frame.syntax)
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.frames.last().map(|frame| frame.scope)
    }
}
