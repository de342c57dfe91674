// StrideCSV - zero-copy CSV boundary scanning over 64-byte windows
//
// Layers:
// core      classifier, quote parity, chunker, replay buffer, generic scanner
// parser    Parser -> Rows -> Row -> Cells -> Cell views over a Source
// strategy  zero-copy boundary tables and rayon-parallel extraction
// nif       Elixir bindings (feature "nif")

//! Zero-copy CSV scanning.
//!
//! ```
//! use stridecsv::Parser;
//!
//! let parser = Parser::new("name,qty\n\"bolt, m4\",12\n");
//! let qty = parser.index_of("qty").unwrap();
//! for row in parser.rows() {
//!     let [name, count] = row.cells_at([0, qty]).unwrap();
//!     assert_eq!(name.unescaped().as_ref(), b"bolt, m4");
//!     assert_eq!(count.raw(), b"12");
//! }
//! ```

pub mod core;
pub mod dialect;
pub mod error;
pub mod parser;
pub mod source;
pub mod strategy;

#[cfg(feature = "nif")]
mod nif;
#[cfg(feature = "nif")]
mod term;

pub use crate::core::{Backend, BoundaryKind, BoundaryPair, Chunker, FindMode, QuoteState};
pub use dialect::{Dialect, Structural};
pub use error::{Error, Result};
pub use parser::{Cell, Cells, Parser, Row, Rows};
pub use source::{MmapSource, Source};

// ============================================================================
// Allocator Configuration
// ============================================================================
//
// Only the NIF cdylib installs a global allocator. Library dependents keep
// their own even when they turn on `mimalloc` or `memory_tracking`.

// When memory_tracking is enabled, wrap the allocator to track usage
#[cfg(all(feature = "nif", feature = "memory_tracking"))]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(all(feature = "nif", feature = "memory_tracking"))]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

// When memory_tracking is disabled, use mimalloc directly (no overhead)
#[cfg(all(feature = "nif", feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Global allocator this build installs, `None` when the process default is
/// left alone.
pub fn installed_allocator() -> Option<&'static str> {
    if cfg!(all(feature = "nif", feature = "memory_tracking")) {
        Some("tracking")
    } else if cfg!(all(feature = "nif", feature = "mimalloc")) {
        Some("mimalloc")
    } else {
        None
    }
}
