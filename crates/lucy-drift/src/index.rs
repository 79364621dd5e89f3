//! Flat squared-Euclidean vector index.
//!
//! Exact brute-force scan over one contiguous buffer. Entry `i` is the
//! embedding of log entry `i`; ids are dense and never overwritten.

use lucy_embeddings::{EmbeddingError, squared_euclidean};

use crate::errors::{DriftError, Result};

/// A search hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Position of the matched entry.
    pub sequence_index: u64,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Append-only nearest-neighbour index.
#[derive(Clone, Debug)]
pub struct FlatL2Index {
    dims: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty index for `dims`-dimensional vectors.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            data: Vec::new(),
        }
    }

    /// Build an index from vectors in sequence order.
    pub fn from_vectors(dims: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dims);
        index.data.reserve(dims * vectors.len());
        for (seq, v) in (0_u64..).zip(vectors) {
            index.add(seq, v)?;
        }
        Ok(index)
    }

    /// Vector dimensions.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        if self.dims == 0 { 0 } else { self.data.len() / self.dims }
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Add the vector for `id`, which must equal [`Self::len`].
    pub fn add(&mut self, id: u64, vector: &[f32]) -> Result<()> {
        let next = self.len() as u64;
        if id != next {
            return Err(DriftError::IndexCorruption(format!(
                "add out of order: got id {id}, next id is {next}"
            )));
        }
        self.check_dims(vector)?;
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// The stored vector for `id`.
    pub fn vector(&self, id: u64) -> Option<&[f32]> {
        let i = usize::try_from(id).ok()?;
        if i >= self.len() {
            return None;
        }
        Some(&self.data[i * self.dims..(i + 1) * self.dims])
    }

    /// Up to `k` nearest entries, closest first, ties by lowest id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dims(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = (0_u64..)
            .zip(self.data.chunks_exact(self.dims))
            .map(|(sequence_index, v)| Neighbor {
                sequence_index,
                distance: squared_euclidean(query, v),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.sequence_index.cmp(&b.sequence_index))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Drop every entry at or after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len * self.dims);
    }

    fn check_dims(&self, v: &[f32]) -> Result<()> {
        if v.len() != self.dims {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dims,
                actual: v.len(),
            }
            .into());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
