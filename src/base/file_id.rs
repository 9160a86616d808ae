//! Dense file identifiers assigned by the analysis host.

/// Identifier of a file known to an [`AnalysisHost`](crate::ide::AnalysisHost).
///
/// Ids are dense indices into the host's file table. They are stable for the
/// lifetime of the host but are not meant to be persisted; pointers store
/// file paths instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Create a file id from its raw index.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw index.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The index as `usize` for table lookups.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file#{}", self.0)
    }
}
