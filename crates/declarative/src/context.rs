//! Apply context

/// Context passed to apply operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Report what would change without touching the store
    pub check_mode: bool,
    /// Whether to output verbose information
    pub verbose: bool,
}

impl ApplyContext {
    /// Create a new apply context
    pub fn new(check_mode: bool, verbose: bool) -> Self {
        Self {
            check_mode,
            verbose,
        }
    }
}
