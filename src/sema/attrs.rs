//! Attribute-set analyzer.
//!
//! Bindings of an attribute set or `let` are first collected into an
//! [`AttrSetScratch`]: attribute paths are expanded into nested sets,
//! literal sets bound to the same key are merged, `inherit` clauses are
//! desugared and duplicates are reported. The driver then walks the scratch
//! to create definitions and analyse values. Once that walk is done the
//! scratch is dropped.

use indexmap::IndexMap;

use crate::base::{Name, TextRange};
use crate::syntax::{AttrName, NodeId, NodeKind, SyntaxTree};

use super::config::LintOptions;
use super::diagnostics::DiagnosticCollector;
use super::error::{SemaError, child_node};
use super::inherit::{DesugaredInherit, desugar_inherit};
use super::stack::ensure_sufficient_stack;

/// The construct a scratch set belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOwner {
    Attrs,
    Let,
}

/// The right-hand side of a collected attribute.
#[derive(Debug)]
pub enum AttrValue {
    Expr(NodeId),
    /// An implicit set from an attribute path, or a merged literal set.
    Nested(Box<AttrSetScratch>),
    /// `inherit name;`
    Inherit(Name),
    /// `inherit (from) name;`, indexing [`AttrSetScratch::inherits`].
    InheritFrom(usize),
}

impl AttrValue {
    pub fn is_inherited(&self) -> bool {
        matches!(self, AttrValue::Inherit(_) | AttrValue::InheritFrom(_))
    }

    fn shift_inherit(&mut self, offset: usize) {
        if let AttrValue::InheritFrom(index) = self {
            *index += offset;
        }
    }
}

#[derive(Debug)]
pub struct Attr {
    /// The name node that declared the attribute first.
    pub key: NodeId,
    /// Later path segments that extended the same nested set.
    pub aliases: Vec<NodeId>,
    pub value: AttrValue,
}

impl Attr {
    fn new(key: NodeId, value: AttrValue) -> Self {
        Self {
            key,
            aliases: Vec::new(),
            value,
        }
    }
}

/// Keys of one set, collected before any value is analysed.
#[derive(Debug)]
pub struct AttrSetScratch {
    /// The `Attrs`/`Let` node, or the path segment of an implicit set.
    pub syntax: NodeId,
    pub owner: SetOwner,
    pub recursive: bool,
    pub statics: IndexMap<Name, Attr>,
    pub dynamics: Vec<Attr>,
    pub inherits: Vec<DesugaredInherit>,
    /// Rejected bindings whose values are still analysed.
    pub orphans: Vec<Attr>,
}

impl AttrSetScratch {
    /// Whether this scratch stands for a `rec { ... }` literal.
    pub fn is_rec_literal(&self, tree: &SyntaxTree) -> bool {
        self.owner == SetOwner::Attrs
            && matches!(tree.kind(self.syntax), Some(NodeKind::Attrs { rec: true, .. }))
    }
}

pub struct AttrSetAnalyzer<'a> {
    tree: &'a SyntaxTree,
    lints: &'a LintOptions,
    diags: &'a mut DiagnosticCollector,
}

impl<'a> AttrSetAnalyzer<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        lints: &'a LintOptions,
        diags: &'a mut DiagnosticCollector,
    ) -> Self {
        Self { tree, lints, diags }
    }

    pub fn begin_attr_set(&self, syntax: NodeId, owner: SetOwner, is_recursive: bool) -> AttrSetScratch {
        AttrSetScratch {
            syntax,
            owner,
            recursive: is_recursive,
            statics: IndexMap::new(),
            dynamics: Vec::new(),
            inherits: Vec::new(),
            orphans: Vec::new(),
        }
    }

    /// Collect the bindings listed by `parent`.
    pub fn add_bindings(
        &mut self,
        set: &mut AttrSetScratch,
        parent: NodeId,
        bindings: &[NodeId],
    ) -> Result<(), SemaError> {
        let tree = self.tree;
        for &binding in bindings {
            match &child_node(tree, parent, binding)?.kind {
                NodeKind::Binding { path, value } => {
                    child_node(tree, binding, *value)?;
                    match self.path_names(binding, *path)? {
                        Some(names) => self.add_path(set, &names, *value)?,
                        None => set.orphans.push(Attr::new(*path, AttrValue::Expr(*value))),
                    }
                }
                NodeKind::Inherit { .. } => {
                    let inherit = desugar_inherit(tree, binding, self.lints, self.diags)?;
                    self.add_inherit(set, inherit)?;
                }
                NodeKind::Null => {}
                other => return Err(SemaError::unexpected(binding, "binding", other.name())),
            }
        }
        Ok(())
    }

    /// Record `name = value`, merging literal sets and reporting duplicates.
    pub fn add_static_key(
        &mut self,
        set: &mut AttrSetScratch,
        name: Name,
        key: NodeId,
        value: AttrValue,
    ) -> Result<(), SemaError> {
        let owner = set.owner;
        if !set.statics.contains_key(&name) {
            set.statics.insert(name, Attr::new(key, value));
            return Ok(());
        }
        let Some(existing) = set.statics.get_mut(&name) else {
            return Ok(());
        };

        let tree = self.tree;
        if let AttrValue::Expr(expr) = value {
            if let Some(NodeKind::Attrs { rec, bindings }) = tree.kind(expr) {
                self.make_nested(existing)?;
                if let AttrValue::Nested(nested) = &mut existing.value {
                    existing.aliases.push(key);
                    return self.merge_literal(nested, expr, *rec, bindings);
                }
            }
        }

        self.duplicate(owner, &name, key, existing.key);
        set.orphans.push(Attr::new(key, value));
        Ok(())
    }

    /// Record a key whose name is only known at run time.
    pub fn add_dynamic_key(&mut self, set: &mut AttrSetScratch, key: NodeId, value: AttrValue) {
        if set.owner == SetOwner::Let {
            let range = self.range(key);
            self.diags.let_dynamic(range);
        }
        set.dynamics.push(Attr::new(key, value));
    }

    /// Finish collection: emit the mixed static/dynamic advisory for this
    /// set and every nested set.
    pub fn end_attr_set(&mut self, set: &AttrSetScratch) {
        if self.lints.dynamic_key_collision {
            if let (Some(first_static), Some(first_dynamic)) =
                (set.statics.values().next(), set.dynamics.first())
            {
                let dynamic = self.range(first_dynamic.key);
                let first_static = self.range(first_static.key);
                self.diags.dynamic_key_collision(dynamic, first_static);
            }
        }
        let nested = set
            .statics
            .values()
            .chain(&set.dynamics)
            .chain(&set.orphans)
            .filter_map(|attr| match &attr.value {
                AttrValue::Nested(nested) => Some(nested),
                _ => None,
            });
        for nested in nested {
            ensure_sufficient_stack(|| self.end_attr_set(nested));
        }
    }

    // ========================================================================
    // PATHS
    // ========================================================================

    /// Names of `path`, or `None` when the parser left only error recovery.
    fn path_names(&self, binding: NodeId, path: NodeId) -> Result<Option<Vec<NodeId>>, SemaError> {
        let tree = self.tree;
        let names = match &child_node(tree, binding, path)?.kind {
            NodeKind::AttrPath(names) => names,
            NodeKind::Null => return Ok(None),
            other => return Err(SemaError::unexpected(path, "attrpath", other.name())),
        };
        let mut present = Vec::with_capacity(names.len());
        for &name in names {
            match &child_node(tree, path, name)?.kind {
                NodeKind::AttrName(attr) => {
                    if let AttrName::String(inner) | AttrName::Interpolation(inner) = attr {
                        child_node(tree, name, *inner)?;
                    }
                    present.push(name);
                }
                NodeKind::Null => {}
                other => return Err(SemaError::unexpected(name, "attrname", other.name())),
            }
        }
        Ok((!present.is_empty()).then_some(present))
    }

    /// `a.b.c = value`: walk or create nested sets down to the last name.
    fn add_path(&mut self, set: &mut AttrSetScratch, names: &[NodeId], value: NodeId) -> Result<(), SemaError> {
        ensure_sufficient_stack(|| self.add_path_segment(set, names, value))
    }

    fn add_path_segment(
        &mut self,
        set: &mut AttrSetScratch,
        names: &[NodeId],
        value: NodeId,
    ) -> Result<(), SemaError> {
        let Some((&first, rest)) = names.split_first() else {
            return Ok(());
        };

        let Some(name) = self.tree.static_attr_name(first) else {
            let value = if rest.is_empty() {
                AttrValue::Expr(value)
            } else {
                let mut nested = self.begin_attr_set(first, SetOwner::Attrs, false);
                self.add_path(&mut nested, rest, value)?;
                AttrValue::Nested(Box::new(nested))
            };
            self.add_dynamic_key(set, first, value);
            return Ok(());
        };

        if rest.is_empty() {
            return self.add_static_key(set, name, first, AttrValue::Expr(value));
        }

        let owner = set.owner;
        if !set.statics.contains_key(&name) {
            let mut nested = self.begin_attr_set(first, SetOwner::Attrs, false);
            self.add_path(&mut nested, rest, value)?;
            set.statics
                .insert(name, Attr::new(first, AttrValue::Nested(Box::new(nested))));
            return Ok(());
        }
        match set.statics.get_mut(&name) {
            None => {}
            Some(existing) => {
                self.make_nested(existing)?;
                if let AttrValue::Nested(nested) = &mut existing.value {
                    existing.aliases.push(first);
                    self.add_path(nested, rest, value)?;
                } else {
                    let previous = existing.key;
                    self.duplicate(owner, &name, first, previous);
                    self.orphan_path(set, rest, value);
                }
            }
        }
        Ok(())
    }

    /// Keep the expressions of a rejected path reachable for analysis.
    fn orphan_path(&self, set: &mut AttrSetScratch, names: &[NodeId], value: NodeId) {
        for &name in names {
            if let Some(NodeKind::AttrName(AttrName::String(inner) | AttrName::Interpolation(inner))) =
                self.tree.kind(name)
            {
                set.orphans.push(Attr::new(name, AttrValue::Expr(*inner)));
            }
        }
        let key = names.first().copied().unwrap_or(value);
        set.orphans.push(Attr::new(key, AttrValue::Expr(value)));
    }

    // ========================================================================
    // INHERIT
    // ========================================================================

    fn add_inherit(&mut self, set: &mut AttrSetScratch, inherit: DesugaredInherit) -> Result<(), SemaError> {
        for &rejected in &inherit.rejected {
            set.orphans.push(Attr::new(inherit.node, AttrValue::Expr(rejected)));
        }
        let names = inherit.names.clone();
        let from_index = if inherit.from.is_some() {
            set.inherits.push(inherit);
            Some(set.inherits.len() - 1)
        } else {
            None
        };
        if let Some(index) = from_index {
            if names.is_empty() {
                let node = set.inherits[index].node;
                set.orphans.push(Attr::new(node, AttrValue::InheritFrom(index)));
            }
        }
        for inherited in names {
            let value = match from_index {
                Some(index) => AttrValue::InheritFrom(index),
                None => AttrValue::Inherit(inherited.name.clone()),
            };
            self.add_static_key(set, inherited.name, inherited.key, value)?;
        }
        Ok(())
    }

    // ========================================================================
    // MERGING
    // ========================================================================

    /// Turn an attribute bound to a literal set into a nested scratch so
    /// later bindings can extend it.
    fn make_nested(&mut self, attr: &mut Attr) -> Result<(), SemaError> {
        let AttrValue::Expr(expr) = attr.value else {
            return Ok(());
        };
        let tree = self.tree;
        if let Some(NodeKind::Attrs { rec, bindings }) = tree.kind(expr) {
            let mut nested = self.begin_attr_set(expr, SetOwner::Attrs, *rec);
            self.add_bindings(&mut nested, expr, bindings)?;
            attr.value = AttrValue::Nested(Box::new(nested));
        }
        Ok(())
    }

    /// Fold the literal set `literal` into `target`. Keys already present
    /// are duplicates; nested sets are not merged recursively.
    fn merge_literal(
        &mut self,
        target: &mut AttrSetScratch,
        literal: NodeId,
        rec: bool,
        bindings: &[NodeId],
    ) -> Result<(), SemaError> {
        let mut incoming = self.begin_attr_set(literal, SetOwner::Attrs, rec);
        self.add_bindings(&mut incoming, literal, bindings)?;

        if target.recursive != rec {
            let range = self.range(literal);
            let kept = self.range(target.syntax);
            self.diags.merge_diff_rec(range, kept);
        }

        let offset = target.inherits.len();
        target.inherits.append(&mut incoming.inherits);
        for (name, mut attr) in incoming.statics {
            attr.value.shift_inherit(offset);
            match target.statics.get(&name) {
                Some(existing) => {
                    let previous = existing.key;
                    self.duplicate(target.owner, &name, attr.key, previous);
                    target.orphans.push(attr);
                }
                None => {
                    target.statics.insert(name, attr);
                }
            }
        }
        for mut attr in incoming.dynamics {
            attr.value.shift_inherit(offset);
            target.dynamics.push(attr);
        }
        for mut attr in incoming.orphans {
            attr.value.shift_inherit(offset);
            target.orphans.push(attr);
        }
        Ok(())
    }

    fn duplicate(&mut self, owner: SetOwner, name: &str, key: NodeId, previous: NodeId) {
        let range = self.range(key);
        let previous = self.range(previous);
        match owner {
            SetOwner::Attrs => self.diags.duplicate_attr(name, range, previous),
            SetOwner::Let => self.diags.duplicate_binding(name, range, previous),
        }
    }

    fn range(&self, node: NodeId) -> TextRange {
        self.tree.range(node).unwrap_or_default()
    }
}
