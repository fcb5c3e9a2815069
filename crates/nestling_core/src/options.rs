//! Options carried through set calls.

/// Flags that shape a single set call.
///
/// Options propagate through every nested merge the call performs, so a
/// silent set stays silent all the way down the graph.
#[derive(Debug, Clone, Copy)]
pub struct SetOptions {
    /// Suppress all change notifications for this call.
    pub silent: bool,

    /// Whether a full reconciliation may remove members missing from the
    /// incoming data. Additive writes run with this disabled.
    pub remove: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            silent: false,
            remove: true,
        }
    }
}

impl SetOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether notifications are suppressed.
    #[must_use]
    pub const fn silent(mut self, value: bool) -> Self {
        self.silent = value;
        self
    }

    /// Sets whether reconciliation may remove absent members.
    #[must_use]
    pub const fn remove(mut self, value: bool) -> Self {
        self.remove = value;
        self
    }
}
