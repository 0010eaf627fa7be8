//! 8-byte aligned byte storage for safe casting to wider pixel types.

/// A byte vector with guaranteed 8-byte alignment.
///
/// Host image rows are viewed as `&[u16]` (or wider) via `bytemuck::cast_slice`,
/// which requires the backing storage to be at least as aligned as the target
/// type. Backing the bytes with `u64` satisfies that for every pixel format.
#[derive(Clone, Debug, Default)]
pub struct AlignedBytes {
    /// Storage as u64 to guarantee 8-byte alignment.
    /// Length is in u64 units, actual byte length is stored separately.
    storage: Vec<u64>,
    /// Actual byte length (may be less than storage.len() * 8).
    len: usize,
}

impl AlignedBytes {
    /// Create a new aligned byte vector with the given length, initialized to zero.
    pub fn new_zeroed(len: usize) -> Self {
        let storage_len = len.div_ceil(8);
        Self {
            storage: vec![0u64; storage_len],
            len,
        }
    }

    /// Get the byte length.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get bytes as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.storage)[..self.len]
    }

    /// Get bytes as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut bytemuck::cast_slice_mut(&mut self.storage)[..len]
    }
}
