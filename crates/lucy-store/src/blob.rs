//! Little-endian `f32` blob codec for stored embeddings.

use crate::errors::{Result, StoreError};

/// Convert an f32 slice to a byte blob for storage.
pub fn f32_slice_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a byte blob back to an f32 vector.
///
/// Fails with [`StoreError::Corrupt`] if the length is not a multiple of 4.
pub fn blob_to_f32_vec(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(StoreError::Corrupt(format!(
            "embedding blob of {} bytes is not a whole number of f32s",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_layout_is_little_endian() {
        assert_eq!(f32_slice_to_blob(&[1.0]), vec![0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn blob_roundtrip_preserves_bits() {
        let v = vec![0.1_f32, -2.5, f32::MIN_POSITIVE, 0.0];
        assert_eq!(blob_to_f32_vec(&f32_slice_to_blob(&v)).unwrap(), v);
    }

    #[test]
    fn empty_blob_is_empty_vec() {
        assert!(blob_to_f32_vec(&[]).unwrap().is_empty());
    }

    #[test]
    fn truncated_blob_is_corrupt() {
        let err = blob_to_f32_vec(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
