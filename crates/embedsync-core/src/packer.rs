//! Fixed-width binary packing of embedding vectors.
//!
//! Every vector of a run is stored as `width` little-endian f32 values. The
//! width is taken from the first vector packed (or preset) and every later
//! vector is checked against it.

use embedsync_types::error::PackError;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Packs embedding vectors into blobs of one fixed width.
#[derive(Debug, Clone, Default)]
pub struct BinaryPacker {
    width: Option<usize>,
}

impl BinaryPacker {
    /// A packer whose width is fixed by the first vector it sees.
    pub fn new() -> Self {
        Self::default()
    }

    /// A packer with a known width.
    pub fn with_width(width: usize) -> Self {
        Self { width: Some(width) }
    }

    /// The fixed width, once known.
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Pack one vector.
    ///
    /// Fails with [`PackError::DimensionMismatch`] if the vector's length
    /// differs from the fixed width; vectors are never truncated or padded.
    pub fn pack(&mut self, vector: &[f32]) -> Result<Vec<u8>, PackError> {
        if vector.is_empty() {
            return Err(PackError::EmptyVector);
        }
        let width = *self.width.get_or_insert(vector.len());
        if vector.len() != width {
            return Err(PackError::DimensionMismatch {
                expected: width,
                actual: vector.len(),
            });
        }

        let mut blob = Vec::with_capacity(width * F32_BYTES);
        for value in vector {
            blob.extend_from_slice(&value.to_le_bytes());
        }
        Ok(blob)
    }
}

/// Decode a blob produced by [`BinaryPacker::pack`].
pub fn unpack(blob: &[u8]) -> Result<Vec<f32>, PackError> {
    if blob.len() % F32_BYTES != 0 {
        return Err(PackError::MisalignedBlob(blob.len()));
    }
    Ok(blob
        .chunks_exact(F32_BYTES)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
