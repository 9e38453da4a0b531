//! AnalysisHost: owns documents and their cached analyses.
//!
//! Documents are syntax trees handed over by a parser, either directly or
//! in the byte encoding of [`crate::bytecode`]. Each document keeps at most
//! one [`Analysis`], computed on first request and dropped when the tree is
//! replaced. Queries take `&self`, so several threads can read at once.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! let file = host.set_tree("default.nix", tree);
//!
//! let diagnostics = host.diagnostics(file)?;
//! let targets = host.goto_definition(file, offset)?;
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::{FileId, TextSize};
use crate::bytecode;
use crate::sema::{self, Analysis, Diagnostic, SemaConfig};
use crate::syntax::SyntaxTree;

use super::error::IdeError;
use super::{
    CompletionItem, GotoResult, ReferenceResult, RenameResult, completions, find_references,
    goto_definition, rename,
};

struct Document {
    path: String,
    tree: Arc<SyntaxTree>,
    analysis: RwLock<Option<Arc<Analysis>>>,
}

impl Document {
    fn new(path: String, tree: Arc<SyntaxTree>) -> Self {
        Self {
            path,
            tree,
            analysis: RwLock::new(None),
        }
    }
}

/// Owns all documents and their analyses.
///
/// Apply changes via [`set_tree`](Self::set_tree), [`set_encoded`](Self::set_encoded)
/// and [`remove_file`](Self::remove_file); query through the remaining methods.
pub struct AnalysisHost {
    config: SemaConfig,
    documents: IndexMap<FileId, Document>,
    paths: FxHashMap<String, FileId>,
    next_id: u32,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Create a new empty AnalysisHost.
    pub fn new() -> Self {
        Self::with_config(SemaConfig::default())
    }

    pub fn with_config(config: SemaConfig) -> Self {
        Self {
            config,
            documents: IndexMap::new(),
            paths: FxHashMap::default(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &SemaConfig {
        &self.config
    }

    /// Change the configuration; every cached analysis is dropped.
    pub fn set_config(&mut self, config: SemaConfig) {
        self.config = config;
        for document in self.documents.values() {
            *document.analysis.write() = None;
        }
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    /// Store `tree` as the current content of `path`.
    ///
    /// A path keeps its [`FileId`] across updates.
    pub fn set_tree(&mut self, path: &str, tree: SyntaxTree) -> FileId {
        let file = match self.paths.get(path) {
            Some(file) => *file,
            None => {
                let file = FileId::new(self.next_id);
                self.next_id += 1;
                self.paths.insert(path.to_string(), file);
                file
            }
        };
        debug!("[IDE] {} ({}): new tree with {} nodes", path, file, tree.len());
        self.documents
            .insert(file, Document::new(path.to_string(), Arc::new(tree)));
        file
    }

    /// Decode an encoded tree and store it as the content of `path`.
    pub fn set_encoded(&mut self, path: &str, bytes: &[u8]) -> Result<FileId, IdeError> {
        let tree = bytecode::decode(bytes)?;
        Ok(self.set_tree(path, tree))
    }

    /// Forget `path`. Returns whether it was known.
    pub fn remove_file(&mut self, path: &str) -> bool {
        let Some(file) = self.paths.remove(path) else {
            return false;
        };
        debug!("[IDE] {} ({}): removed", path, file);
        self.documents.shift_remove(&file).is_some()
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.paths.get(path).copied()
    }

    pub fn path(&self, file: FileId) -> Option<&str> {
        self.documents.get(&file).map(|document| document.path.as_str())
    }

    pub fn tree(&self, file: FileId) -> Option<Arc<SyntaxTree>> {
        self.documents.get(&file).map(|document| document.tree.clone())
    }

    /// Files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.documents.keys().copied()
    }

    pub fn file_count(&self) -> usize {
        self.documents.len()
    }

    fn document(&self, file: FileId) -> Result<&Document, IdeError> {
        self.documents.get(&file).ok_or(IdeError::UnknownFile(file))
    }

    // ========================================================================
    // ANALYSIS
    // ========================================================================

    /// The analysis of `file`, computed on first use.
    pub fn analysis(&self, file: FileId) -> Result<Arc<Analysis>, IdeError> {
        let document = self.document(file)?;
        if let Some(cached) = document.analysis.read().as_ref() {
            return Ok(cached.clone());
        }
        let analysis = Arc::new(sema::analyze(&document.tree, &self.config)?);
        debug!("[IDE] {}: analysed", document.path);
        *document.analysis.write() = Some(analysis.clone());
        Ok(analysis)
    }

    /// Like [`analysis`](Self::analysis), but gives up once `cancel` fires.
    ///
    /// An incomplete result is returned to the caller but never cached.
    pub fn analysis_with_cancel(
        &self,
        file: FileId,
        cancel: &CancellationToken,
    ) -> Result<Arc<Analysis>, IdeError> {
        let document = self.document(file)?;
        if let Some(cached) = document.analysis.read().as_ref() {
            return Ok(cached.clone());
        }
        let analysis = Arc::new(sema::analyze_with_cancel(&document.tree, &self.config, cancel)?);
        if analysis.is_complete() {
            *document.analysis.write() = Some(analysis.clone());
        } else {
            debug!("[IDE] {}: analysis cancelled", document.path);
        }
        Ok(analysis)
    }

    /// Analyse every document in parallel.
    pub fn analyze_all(&self) -> Vec<(FileId, Result<Arc<Analysis>, IdeError>)> {
        let files: Vec<FileId> = self.files().collect();
        files
            .into_par_iter()
            .map(|file| (file, self.analysis(file)))
            .collect()
    }

    pub fn is_cached(&self, file: FileId) -> bool {
        self.documents
            .get(&file)
            .is_some_and(|document| document.analysis.read().is_some())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn diagnostics(&self, file: FileId) -> Result<Vec<Diagnostic>, IdeError> {
        Ok(self.analysis(file)?.diagnostics().to_vec())
    }

    pub fn goto_definition(&self, file: FileId, offset: TextSize) -> Result<GotoResult, IdeError> {
        let tree = self.document(file)?.tree.clone();
        let analysis = self.analysis(file)?;
        Ok(goto_definition(file, &tree, &analysis, offset))
    }

    pub fn find_references(
        &self,
        file: FileId,
        offset: TextSize,
        include_declaration: bool,
    ) -> Result<ReferenceResult, IdeError> {
        let tree = self.document(file)?.tree.clone();
        let analysis = self.analysis(file)?;
        Ok(find_references(file, &tree, &analysis, offset, include_declaration))
    }

    pub fn rename(&self, file: FileId, offset: TextSize, new_name: &str) -> Result<RenameResult, IdeError> {
        let tree = self.document(file)?.tree.clone();
        let analysis = self.analysis(file)?;
        rename(file, &tree, &analysis, offset, new_name)
    }

    pub fn completions(&self, file: FileId, offset: TextSize) -> Result<Vec<CompletionItem>, IdeError> {
        let tree = self.document(file)?.tree.clone();
        let analysis = self.analysis(file)?;
        Ok(completions(&tree, &analysis, offset))
    }
}
