/// What a guarded mutation did, distinguishing the cases the original
/// boolean collapsed: the write happened, the ownership guard rejected
/// it, or there was nothing at the key. Store failures are reported
/// separately as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation was applied.
    Applied,
    /// A document exists at the key but its `uid` field does not match
    /// the supplied guard value; nothing was written.
    GuardFailed,
    /// No document exists at the key.
    NotFound,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}
