// Core structural scanner
//
// classify -> parity -> chunker (+ replay), with the generic byte loop
// covering unaligned prefixes, short tails and the portable backend.

pub mod chunker;
pub mod classify;
pub mod field;
pub mod generic;
pub mod parity;
pub mod replay;

use tracing::debug;

pub use crate::dialect::Structural;
pub use chunker::Chunker;
pub use classify::Classifier;
pub use field::*;
pub use parity::QuoteState;
pub use replay::{ReplayBuffer, REPLAY_CAPACITY};

/// Bytes per vector window.
pub const WINDOW: usize = 64;

/// Which boundaries a `Chunker::find` query is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindMode {
    /// First unquoted delimiter.
    Delimiter,
    /// First unquoted line ending.
    LineEnd,
    /// First unquoted line ending, plus the first delimiter before it.
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    Delimiter,
    LineEnd,
}

/// Result of a `find` query. Each side is `last` when not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPair {
    pub delimiter: usize,
    pub line_end: usize,
}

impl BoundaryPair {
    #[inline]
    pub fn none(last: usize) -> Self {
        BoundaryPair {
            delimiter: last,
            line_end: last,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Scanning strategy, chosen once per scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 64-byte windows classified with AVX2, prefix-xor via PCLMULQDQ.
    Avx2,
    /// 64-byte windows with byte-built masks and shift-xor prefix parity.
    Bitwise,
    /// Byte-at-a-time loop.
    Generic,
}

impl Backend {
    /// Pick the fastest backend this CPU supports.
    pub fn detect() -> Backend {
        let backend = if Classifier::accelerated().is_some() {
            Backend::Avx2
        } else {
            Backend::Generic
        };
        debug!(?backend, "selected scanner backend");
        backend
    }

    pub fn is_available(self) -> bool {
        match self {
            Backend::Avx2 => Classifier::accelerated().is_some(),
            Backend::Bitwise | Backend::Generic => true,
        }
    }

    /// Every backend usable on this machine, generic first.
    pub fn available() -> Vec<Backend> {
        [Backend::Generic, Backend::Bitwise, Backend::Avx2]
            .into_iter()
            .filter(|b| b.is_available())
            .collect()
    }

    /// The backend actually run when `self` is requested.
    pub(crate) fn resolve(self) -> Backend {
        if self.is_available() {
            self
        } else {
            debug!(requested = ?self, "backend unavailable, using bitwise windows");
            Backend::Bitwise
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_backends_always_available() {
        let all = Backend::available();
        assert!(all.contains(&Backend::Generic));
        assert!(all.contains(&Backend::Bitwise));
        assert_eq!(Backend::Generic.resolve(), Backend::Generic);
    }

    #[test]
    fn test_resolve_never_yields_unavailable() {
        for b in [Backend::Avx2, Backend::Bitwise, Backend::Generic] {
            assert!(b.resolve().is_available());
        }
        assert!(Backend::detect().is_available());
    }
}
