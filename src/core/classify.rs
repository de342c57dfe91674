// Vector classifier: 64-byte window -> one bitmask per target byte
//
// Bit i of mask k is set iff window[i] == targets[k]. The AVX2 path compares
// two 32-byte lanes and joins their movemasks as `lo | hi << 32`; the
// portable path builds the same masks a byte at a time.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::WINDOW;

/// Window classifier. The accelerated variant can only be obtained after
/// the CPU has been checked for AVX2 and PCLMULQDQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    accelerated: bool,
}

impl Classifier {
    pub fn portable() -> Self {
        Classifier { accelerated: false }
    }

    #[cfg(target_arch = "x86_64")]
    pub fn accelerated() -> Option<Self> {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("pclmulqdq") {
            Some(Classifier { accelerated: true })
        } else {
            None
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub fn accelerated() -> Option<Self> {
        None
    }

    #[inline]
    pub fn is_accelerated(&self) -> bool {
        self.accelerated
    }

    #[inline]
    pub fn classify<const N: usize>(&self, window: &[u8; WINDOW], targets: [u8; N]) -> [u64; N] {
        #[cfg(target_arch = "x86_64")]
        if self.accelerated {
            // SAFETY: `accelerated` is only set after AVX2 was detected.
            return unsafe { classify_avx2(window, targets) };
        }
        classify_bytes(window, targets)
    }

    /// Running parity of `x`: bit i is the xor of bits 0..=i.
    #[inline]
    pub fn prefix_xor(&self, x: u64) -> u64 {
        #[cfg(target_arch = "x86_64")]
        if self.accelerated {
            // SAFETY: `accelerated` is only set after PCLMULQDQ was detected.
            return unsafe { prefix_xor_clmul(x) };
        }
        prefix_xor(x)
    }
}

#[inline]
pub fn classify_bytes<const N: usize>(window: &[u8; WINDOW], targets: [u8; N]) -> [u64; N] {
    let mut masks = [0u64; N];
    for (i, &byte) in window.iter().enumerate() {
        for (mask, &target) in masks.iter_mut().zip(targets.iter()) {
            *mask |= u64::from(byte == target) << i;
        }
    }
    masks
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn classify_avx2<const N: usize>(window: &[u8; WINDOW], targets: [u8; N]) -> [u64; N] {
    let ptr = window.as_ptr() as *const __m256i;
    let lo = _mm256_loadu_si256(ptr);
    let hi = _mm256_loadu_si256(ptr.add(1));

    let mut masks = [0u64; N];
    for (mask, &target) in masks.iter_mut().zip(targets.iter()) {
        let splat = _mm256_set1_epi8(target as i8);
        let lo_bits = _mm256_movemask_epi8(_mm256_cmpeq_epi8(lo, splat)) as u32 as u64;
        let hi_bits = _mm256_movemask_epi8(_mm256_cmpeq_epi8(hi, splat)) as u32 as u64;
        *mask = lo_bits | (hi_bits << 32);
    }
    masks
}

// ---------------------------------------------------------------------------
// Prefix-XOR
// ---------------------------------------------------------------------------

/// Shift-and-xor cascade, six dependent steps.
#[inline]
pub fn prefix_xor(mut x: u64) -> u64 {
    x ^= x << 1;
    x ^= x << 2;
    x ^= x << 4;
    x ^= x << 8;
    x ^= x << 16;
    x ^= x << 32;
    x
}

/// Carry-less multiply by all-ones; the low 64 bits are the prefix xor.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "pclmulqdq")]
unsafe fn prefix_xor_clmul(x: u64) -> u64 {
    let product = _mm_clmulepi64_si128(_mm_set_epi64x(0, x as i64), _mm_set1_epi8(-1), 0);
    _mm_cvtsi128_si64(product) as u64
}
