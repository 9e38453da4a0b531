//! Sema driver: one recursive pass over a syntax tree.
//!
//! The pass dispatches on [`NodeKind`]. Binding constructs push a frame on
//! the [`Environment`], declare their names, visit their children and pop
//! the frame again. Variable references are resolved against the frames
//! active at that moment. Everything the pass learns ends up in an
//! [`Analysis`]; the environment itself is dropped with the pass.

use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::base::{Name, TextRange, TextSize};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

use super::analysis::Analysis;
use super::attrs::{Attr, AttrSetAnalyzer, AttrSetScratch, AttrValue, SetOwner};
use super::builtins::{self, PrimOpLookup};
use super::config::SemaConfig;
use super::definition::{DefId, DefUseGraph, Definition, DefinitionSource};
use super::diagnostics::DiagnosticCollector;
use super::env::{Environment, FrameHandle, FrameKind, PoppedFrame, Resolution};
use super::error::{SemaError, check_shape, child_node};
use super::scope::ScopeTree;
use super::stack::ensure_sufficient_stack;

/// Analyse `tree` to completion.
pub fn analyze(tree: &SyntaxTree, config: &SemaConfig) -> Result<Analysis, SemaError> {
    Sema::new(tree, config, None).run()
}

/// Analyse `tree`, stopping early once `cancel` fires.
///
/// A cancelled pass still returns an [`Analysis`]; it holds whatever was
/// collected so far and reports `is_complete() == false`.
pub fn analyze_with_cancel(
    tree: &SyntaxTree,
    config: &SemaConfig,
    cancel: &CancellationToken,
) -> Result<Analysis, SemaError> {
    Sema::new(tree, config, Some(cancel)).run()
}

struct Sema<'t> {
    tree: &'t SyntaxTree,
    config: &'t SemaConfig,
    cancel: Option<&'t CancellationToken>,
    env: Environment,
    graph: DefUseGraph,
    scopes: ScopeTree,
    diags: DiagnosticCollector,
    resolutions: FxHashMap<NodeId, Resolution>,
    with_uses: FxHashMap<NodeId, Vec<NodeId>>,
    cancelled: bool,
}

/// One formal collected before the lambda frame is populated.
struct FormalEntry {
    /// `None` when the name failed to parse.
    name: Option<Name>,
    ident: NodeId,
    default: Option<NodeId>,
}

impl<'t> Sema<'t> {
    fn new(tree: &'t SyntaxTree, config: &'t SemaConfig, cancel: Option<&'t CancellationToken>) -> Self {
        Self {
            tree,
            config,
            cancel,
            env: Environment::new(),
            graph: DefUseGraph::new(),
            scopes: ScopeTree::new(),
            diags: DiagnosticCollector::new(),
            resolutions: FxHashMap::default(),
            with_uses: FxHashMap::default(),
            cancelled: false,
        }
    }

    fn run(mut self) -> Result<Analysis, SemaError> {
        let root = self.tree.root();
        check_shape(self.tree)?;
        debug!("[SEMA] analysing {} nodes from root {:?}", self.tree.len(), root);

        self.push_globals();
        self.visit(root)?;

        let analysis = Analysis {
            graph: self.graph,
            resolutions: self.resolutions,
            with_uses: self.with_uses,
            scopes: self.scopes,
            diagnostics: self.diags.take(),
            complete: !self.cancelled,
        };
        debug!(
            "[SEMA] finished: {} definitions, {} diagnostics, complete: {}",
            analysis.graph.len(),
            analysis.diagnostics.len(),
            analysis.complete
        );
        Ok(analysis)
    }

    fn push_globals(&mut self) {
        let scope = self.scopes.alloc(FrameKind::Global, None, None);
        self.env.push(FrameKind::Global, None, scope);
        let names = builtins::global_names()
            .map(Name::from)
            .chain(self.config.extra_builtins.iter().cloned());
        for name in names {
            if let Ok(def) = self
                .graph
                .declare(&mut self.env, name.clone(), None, DefinitionSource::Builtin)
            {
                self.scopes.bind(scope, name, def);
            }
        }
    }

    fn is_cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_some_and(|token| token.is_cancelled()) {
            debug!("[SEMA] cancelled");
            self.cancelled = true;
        }
        self.cancelled
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    fn visit(&mut self, id: NodeId) -> Result<(), SemaError> {
        ensure_sufficient_stack(|| self.visit_node(id))
    }

    fn visit_node(&mut self, id: NodeId) -> Result<(), SemaError> {
        if self.is_cancelled() {
            return Ok(());
        }
        let tree = self.tree;
        let node = tree.get(id).ok_or(SemaError::UnknownNode(id))?;
        self.record_scope(id);

        match &node.kind {
            NodeKind::Var(name) => {
                self.resolve_var(name, id, false);
                Ok(())
            }
            NodeKind::Attrs { rec, bindings } => {
                let set = self.lower_set(id, SetOwner::Attrs, *rec, bindings)?;
                self.visit_set(&set, None)
            }
            NodeKind::Let { bindings, body } => {
                child_node(tree, id, *body)?;
                let set = self.lower_set(id, SetOwner::Let, true, bindings)?;
                self.visit_set(&set, Some(*body))
            }
            NodeKind::With { subject, body } => self.visit_with(id, *subject, *body),
            NodeKind::Lambda { arg, formals, body } => self.visit_lambda(id, *arg, *formals, *body),
            NodeKind::Select { expr, path, .. } => {
                self.visit_children(id, &node.kind)?;
                self.check_builtins_select(*expr, *path);
                Ok(())
            }
            kind => self.visit_children(id, kind),
        }
    }

    fn visit_children(&mut self, id: NodeId, kind: &NodeKind) -> Result<(), SemaError> {
        for child in kind.children() {
            child_node(self.tree, id, child)?;
            self.visit(child)?;
        }
        Ok(())
    }

    fn record_scope(&mut self, id: NodeId) {
        if let Some(scope) = self.env.current_scope() {
            self.scopes.record_node(id, scope);
        }
    }

    fn push_frame(&mut self, kind: FrameKind, syntax: NodeId) -> FrameHandle {
        let parent = self.env.current_scope();
        let scope = self.scopes.alloc(kind, Some(syntax), parent);
        self.env.push(kind, Some(syntax), scope)
    }

    fn range(&self, node: NodeId) -> TextRange {
        self.tree.range(node).unwrap_or_default()
    }

    // ========================================================================
    // VARIABLES
    // ========================================================================

    /// Resolve `name` referenced at `node`. With `outer` the innermost frame
    /// is skipped, as needed for `inherit name;` inside a `let` or `rec` set.
    fn resolve_var(&mut self, name: &Name, node: NodeId, outer: bool) {
        let lookup = if outer {
            self.env.lookup_outer(name)
        } else {
            self.env.lookup(name)
        };

        match &lookup.resolution {
            Resolution::Defined(def) => {
                self.graph.record_use(*def, node);
                if let Some(with) = lookup.crossed_with {
                    self.check_escaping_with(*def, node, with);
                }
            }
            Resolution::Dynamic(withs) => {
                for with in withs {
                    self.with_uses.entry(*with).or_default().push(node);
                }
            }
            Resolution::Unresolved => {
                let range = self.range(node);
                if builtins::lookup_primop(name) == PrimOpLookup::PrefixedFound {
                    self.diags.primop_needs_prefix(name, range);
                } else {
                    let scope = self.env.nearest_syntax().map(|syntax| self.range(syntax));
                    self.diags.undefined_variable(name, range, scope);
                }
            }
        }

        trace!("[SEMA] `{}` at {:?} -> {:?}", name, node, lookup.resolution);
        self.resolutions.insert(node, lookup.resolution);
    }

    fn check_escaping_with(&mut self, def: DefId, node: NodeId, with: NodeId) {
        if !self.config.lints.escaping_with {
            return;
        }
        let Some(definition) = self.graph.get(def) else {
            return;
        };
        if definition.source().is_builtin() {
            return;
        }
        trace!("[SEMA] {:?} escapes `with` {:?}", node, with);
        let bound = definition.syntax().map(|syntax| self.range(syntax));
        let range = self.range(node);
        self.diags.escaping_with(range, bound);
    }

    /// Declare `name` in the innermost frame and record it in the scope tree.
    fn declare(
        &mut self,
        name: &Name,
        syntax: NodeId,
        source: DefinitionSource,
        from_builtins: bool,
    ) -> Result<DefId, DefId> {
        let def = self
            .graph
            .declare(&mut self.env, name.clone(), Some(syntax), source)?;
        if let Some(scope) = self.env.current_scope() {
            self.scopes.bind(scope, name.clone(), def);
        }
        if self.config.lints.builtin_override && !from_builtins {
            let range = self.range(syntax);
            if builtins::lookup_primop(name) == PrimOpLookup::Found {
                self.diags.builtin_overridden(name, range, false);
            } else if builtins::is_constant(name) {
                self.diags.builtin_overridden(name, range, true);
            }
        }
        Ok(def)
    }

    /// `builtins.name`: report unknown primops, and with the lint enabled a
    /// prefix that can be dropped. Only applies while `builtins` is the
    /// global one.
    fn check_builtins_select(&mut self, expr: NodeId, path: NodeId) {
        let tree = self.tree;
        if !matches!(tree.kind(expr), Some(NodeKind::Var(name)) if name == "builtins") {
            return;
        }
        let is_global = match self.resolutions.get(&expr) {
            Some(Resolution::Defined(def)) => self
                .graph
                .get(*def)
                .is_some_and(|definition| definition.source().is_builtin()),
            _ => false,
        };
        if !is_global {
            return;
        }
        let Some(NodeKind::AttrPath(names)) = tree.kind(path) else {
            return;
        };
        let [first] = names.as_slice() else {
            return;
        };
        let Some(name) = tree.static_attr_name(*first) else {
            return;
        };

        match builtins::lookup_primop(&name) {
            PrimOpLookup::Found if self.config.lints.removable_prefix => {
                let range = self.range(expr);
                let name_start = self.range(*first).start();
                let removal = if name_start >= range.start() {
                    TextRange::new(range.start(), name_start)
                } else {
                    range
                };
                self.diags.primop_removable_prefix(&name, range, removal);
            }
            PrimOpLookup::NotFound if !builtins::is_builtins_constant(&name) => {
                let range = self.range(*first);
                self.diags.primop_unknown(&name, range);
            }
            _ => {}
        }
    }

    // ========================================================================
    // ATTRIBUTE SETS AND LET
    // ========================================================================

    fn lower_set(
        &mut self,
        syntax: NodeId,
        owner: SetOwner,
        recursive: bool,
        bindings: &[NodeId],
    ) -> Result<AttrSetScratch, SemaError> {
        let mut analyzer = AttrSetAnalyzer::new(self.tree, &self.config.lints, &mut self.diags);
        let mut set = analyzer.begin_attr_set(syntax, owner, recursive);
        analyzer.add_bindings(&mut set, syntax, bindings)?;
        analyzer.end_attr_set(&set);
        Ok(set)
    }

    /// Declare the keys of `set`, then visit values, keys and `body`.
    ///
    /// `let` and recursive sets get a frame, so their values see the keys.
    fn visit_set(&mut self, set: &AttrSetScratch, body: Option<NodeId>) -> Result<(), SemaError> {
        self.record_scope(set.syntax);
        let framed = set.recursive || set.owner == SetOwner::Let;
        let handle = framed.then(|| {
            let kind = match set.owner {
                SetOwner::Let => FrameKind::Let,
                SetOwner::Attrs => FrameKind::Rec,
            };
            self.push_frame(kind, set.syntax)
        });

        for (name, attr) in &set.statics {
            let source = match (&attr.value, set.owner) {
                (value, _) if value.is_inherited() => DefinitionSource::Inherited,
                (_, SetOwner::Let) => DefinitionSource::Let,
                (_, SetOwner::Attrs) if set.recursive => DefinitionSource::RecAttr,
                _ => DefinitionSource::AttrKey,
            };
            let def = if framed {
                let from_builtins = self.inherits_from_builtins(set, attr);
                if from_builtins
                    && set.owner == SetOwner::Let
                    && self.config.lints.removable_prefix
                    && builtins::lookup_primop(name) == PrimOpLookup::Found
                {
                    let range = self.range(attr.key);
                    self.diags.inherit_removable_prefix(name, range);
                }
                match self.declare(name, attr.key, source, from_builtins) {
                    Ok(def) | Err(def) => def,
                }
            } else {
                self.graph.add(name.clone(), Some(attr.key), source)
            };
            for &alias in &attr.aliases {
                self.graph.alias(alias, def);
            }
        }

        for (index, inherit) in set.inherits.iter().enumerate() {
            let Some(from) = inherit.from else {
                continue;
            };
            trace!("[SEMA] inherit source {:?} (clause {})", from, index);
            if framed {
                self.env
                    .hide(inherit.names.iter().map(|inherited| inherited.name.clone()).collect());
            }
            let result = self.visit(from);
            if framed {
                self.env.unhide();
            }
            result?;
        }

        for attr in set.statics.values() {
            self.visit_attr_value(attr, framed)?;
        }
        for attr in &set.dynamics {
            self.visit(attr.key)?;
            self.visit_attr_value(attr, framed)?;
        }
        for attr in &set.orphans {
            self.visit_attr_value(attr, framed)?;
        }
        if let Some(body) = body {
            self.visit(body)?;
        }

        if let Some(handle) = handle {
            if let Some(frame) = self.env.pop(handle) {
                self.finish_set_frame(set, &frame);
            }
        }
        Ok(())
    }

    fn visit_attr_value(&mut self, attr: &Attr, framed: bool) -> Result<(), SemaError> {
        match &attr.value {
            AttrValue::Expr(expr) => self.visit(*expr),
            AttrValue::Nested(nested) => ensure_sufficient_stack(|| self.visit_set(nested, None)),
            AttrValue::Inherit(name) => {
                if !self.is_cancelled() {
                    self.record_scope(attr.key);
                    self.resolve_var(name, attr.key, framed);
                }
                Ok(())
            }
            AttrValue::InheritFrom(_) => Ok(()),
        }
    }

    fn inherits_from_builtins(&self, set: &AttrSetScratch, attr: &Attr) -> bool {
        match attr.value {
            AttrValue::InheritFrom(index) => set
                .inherits
                .get(index)
                .is_some_and(|inherit| inherit.is_from_builtins(self.tree)),
            _ => false,
        }
    }

    fn finish_set_frame(&mut self, set: &AttrSetScratch, frame: &PoppedFrame) {
        if self.cancelled {
            return;
        }
        let config = self.config;
        let lints = &config.lints;
        let tree = self.tree;
        match set.owner {
            SetOwner::Let if lints.unused_definitions => self.report_unused(frame, |_| true),
            SetOwner::Attrs if lints.extra_rec && set.is_rec_literal(tree) => {
                let used = frame
                    .defs
                    .values()
                    .any(|def| self.graph.get(*def).is_some_and(Definition::is_used));
                if !used {
                    // A recursive set's range starts at its `rec` keyword.
                    let range = self.range(set.syntax);
                    let keyword = TextRange::at(range.start(), TextSize::from(3))
                        .intersect(range)
                        .unwrap_or(range);
                    self.diags.extra_rec(range, keyword);
                }
            }
            _ => {}
        }
    }

    fn report_unused(&mut self, frame: &PoppedFrame, include: impl Fn(DefinitionSource) -> bool) {
        for (name, def) in &frame.defs {
            let Some(definition) = self.graph.get(*def) else {
                continue;
            };
            if definition.is_used() || !include(definition.source()) {
                continue;
            }
            if let Some(syntax) = definition.syntax() {
                let range = self.range(syntax);
                self.diags.unused_definition(name, range);
            }
        }
    }

    // ========================================================================
    // WITH
    // ========================================================================

    fn visit_with(&mut self, id: NodeId, subject: NodeId, body: NodeId) -> Result<(), SemaError> {
        let tree = self.tree;
        child_node(tree, id, subject)?;
        child_node(tree, id, body)?;

        self.visit(subject)?;
        let handle = self.push_frame(FrameKind::With, id);
        self.visit(body)?;
        self.env.pop(handle);

        let unused = self.with_uses.get(&id).is_none_or(Vec::is_empty);
        if self.config.lints.extra_with && unused && !self.cancelled {
            let range = self.range(id);
            let body_start = self.range(body).start();
            let removal = if body_start >= range.start() {
                TextRange::new(range.start(), body_start)
            } else {
                range
            };
            self.diags.extra_with(range, removal);
        }
        Ok(())
    }

    // ========================================================================
    // LAMBDA
    // ========================================================================

    fn visit_lambda(
        &mut self,
        id: NodeId,
        arg: Option<NodeId>,
        formals: Option<NodeId>,
        body: NodeId,
    ) -> Result<(), SemaError> {
        let tree = self.tree;
        child_node(tree, id, body)?;
        let entries = match formals {
            Some(formals) => Some(self.collect_formals(id, formals)?),
            None => None,
        };

        let handle = self.push_frame(FrameKind::Lambda, id);

        if let Some(arg) = arg {
            if let NodeKind::Identifier(name) = &child_node(tree, id, arg)?.kind {
                let clash = entries
                    .iter()
                    .flatten()
                    .find(|entry| entry.name.as_ref() == Some(name))
                    .map(|entry| entry.ident);
                match clash {
                    Some(formal) => {
                        let (arg_range, formal_range) = (self.range(arg), self.range(formal));
                        self.diags.duplicate_formal_arg(arg_range, formal_range);
                    }
                    None => {
                        let source = if entries.is_some() {
                            DefinitionSource::LambdaAtArg
                        } else {
                            DefinitionSource::LambdaArg
                        };
                        // First name of a fresh frame, so it cannot clash.
                        let _ = self.declare(name, arg, source, false);
                    }
                }
            }
        }

        let entries = entries.unwrap_or_default();
        for entry in &entries {
            let Some(name) = &entry.name else {
                continue;
            };
            if let Err(first) = self.declare(name, entry.ident, DefinitionSource::Formal, false) {
                let previous = self
                    .graph
                    .get(first)
                    .and_then(Definition::syntax)
                    .map(|syntax| self.range(syntax))
                    .unwrap_or_default();
                let range = self.range(entry.ident);
                self.diags.duplicate_formal(name, range, previous);
            }
        }
        for default in entries.iter().filter_map(|entry| entry.default) {
            self.visit(default)?;
        }
        self.visit(body)?;

        if let Some(frame) = self.env.pop(handle) {
            if self.config.lints.unused_definitions && !self.cancelled {
                self.report_unused(&frame, |source| source != DefinitionSource::LambdaArg);
            }
        }
        Ok(())
    }

    /// Validate the formals node and list its named formals in order.
    fn collect_formals(&mut self, lambda: NodeId, formals: NodeId) -> Result<Vec<FormalEntry>, SemaError> {
        let tree = self.tree;
        let list = match &child_node(tree, lambda, formals)?.kind {
            NodeKind::Formals { formals, .. } => formals,
            NodeKind::Null => return Ok(Vec::new()),
            other => return Err(SemaError::unexpected(formals, "formals", other.name())),
        };
        self.record_scope(formals);

        let mut entries = Vec::with_capacity(list.len());
        for &formal in list {
            let (ident, default) = match &child_node(tree, formals, formal)?.kind {
                NodeKind::Formal { name, default } => (*name, *default),
                NodeKind::Null => continue,
                other => return Err(SemaError::unexpected(formal, "formal", other.name())),
            };
            if let Some(default) = default {
                child_node(tree, formal, default)?;
            }
            match &child_node(tree, formal, ident)?.kind {
                NodeKind::Identifier(name) => entries.push(FormalEntry {
                    name: Some(name.clone()),
                    ident,
                    default,
                }),
                NodeKind::Null => entries.push(FormalEntry {
                    name: None,
                    ident,
                    default,
                }),
                other => return Err(SemaError::unexpected(ident, "identifier", other.name())),
            }
        }
        Ok(entries)
    }
}
