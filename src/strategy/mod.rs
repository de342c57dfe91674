// Whole-input parsing strategies built on the chunker

pub mod parallel;
pub mod zero_copy;

pub use parallel::*;
pub use zero_copy::*;
