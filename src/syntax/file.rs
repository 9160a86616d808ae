//! Parsed file wrapper.
//!
//! A [`ParsedFile`] is one file as a session sees it: its id, its path, the
//! CST root and whether it stands for compiled library code or for a
//! synthetic copy of another file.

use smol_str::SmolStr;

use crate::base::{FileId, FqName};
use crate::parser::ast::{ImportDirective, SourceFile};
use crate::parser::{AstNode, GreenNode, SyntaxError, SyntaxNode};

/// An import directive in resolved form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportEntry {
    pub path: FqName,
    pub all_under: bool,
    pub alias: Option<SmolStr>,
}

/// A parsed file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    id: FileId,
    path: SmolStr,
    root: SyntaxNode,
    errors: Vec<SyntaxError>,
    /// Decompiled stub of library code rather than user source
    is_compiled: bool,
    /// Set when this file is a synthetic copy made for re-entrant analysis
    original: Option<FileId>,
}

// Two ParsedFiles are equal if they are the same file with the same tree
impl PartialEq for ParsedFile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.path == other.path && self.root == other.root
    }
}

impl Eq for ParsedFile {}

impl ParsedFile {
    pub fn new(
        id: FileId,
        path: impl Into<SmolStr>,
        green: GreenNode,
        errors: Vec<SyntaxError>,
        is_compiled: bool,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            root: SyntaxNode::new_root(green),
            errors,
            is_compiled,
            original: None,
        }
    }

    /// Mark this file as a synthetic copy of `original`.
    pub fn with_original(mut self, original: FileId) -> Self {
        self.original = Some(original);
        self
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn source_file(&self) -> Option<SourceFile> {
        SourceFile::cast(self.root.clone())
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn is_compiled(&self) -> bool {
        self.is_compiled
    }

    pub fn original(&self) -> Option<FileId> {
        self.original
    }

    /// Package declared by the `package` directive, root if absent.
    pub fn package_fq_name(&self) -> FqName {
        self.source_file()
            .and_then(|f| f.package_directive())
            .and_then(|p| p.path())
            .map(|p| FqName::new(&p.dotted()))
            .unwrap_or_default()
    }

    pub fn imports(&self) -> Vec<ImportEntry> {
        let Some(file) = self.source_file() else {
            return Vec::new();
        };
        file.imports().filter_map(|i| import_entry(&i)).collect()
    }

    /// Top-level declaration nodes in source order.
    pub fn declarations(&self) -> Vec<SyntaxNode> {
        self.source_file()
            .map(|f| f.declarations().collect())
            .unwrap_or_default()
    }
}

fn import_entry(import: &ImportDirective) -> Option<ImportEntry> {
    let path = import.path()?;
    Some(ImportEntry {
        path: FqName::new(&path.dotted()),
        all_under: import.is_all_under(),
        alias: import.alias().map(SmolStr::from),
    })
}
