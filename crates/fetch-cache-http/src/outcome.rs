/// What a conditional download did to the cached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server sent new content; `bytes` were written to disk.
    Updated { bytes: u64 },
    /// The server confirmed the cached copy is current. Nothing was written.
    NotModified,
}

impl FetchOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}
