/// Per-call decode limits.
///
/// A zero in either field means unbounded. Callers processing untrusted
/// input should always set a finite `max_depth`; without it, decode
/// recursion is bounded only by the call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// Maximum nesting depth (root value counts as depth 1). 0 = unbounded.
    pub max_depth: u32,
    /// Maximum byte-string length in bytes. 0 = unbounded.
    pub max_bytes_len: u32,
}

impl Limits {
    /// No depth or size limits.
    pub const UNBOUNDED: Limits = Limits {
        max_depth: 0,
        max_bytes_len: 0,
    };

    pub fn new(max_depth: u32, max_bytes_len: u32) -> Self {
        Self {
            max_depth,
            max_bytes_len,
        }
    }
}
