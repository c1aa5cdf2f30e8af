//! Document removal and position compaction.
//!
//! Removing a document deletes its chunks from all three stores and shifts
//! every later chunk down, so positions stay dense. A single [`Compaction`]
//! plan (the removed set plus an old-to-new position map) is built once and
//! applied to the chunk store, the keyword index, the vector index and the
//! document map, which keeps all of them in agreement.

use super::RetrievalIndex;
use crate::embedding::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::search::types::{compact_in_place, Position};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Position remapping for one removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Compaction {
    /// Positions being deleted
    removed: HashSet<Position>,
    /// Old position -> new position, `None` for removed entries
    remap: Vec<Option<Position>>,
}

impl Compaction {
    /// Plan the removal of `removed` from a store of `len` entries.
    pub(crate) fn new(len: usize, removed: HashSet<Position>) -> Self {
        let mut next = 0;
        let remap = (0..len)
            .map(|old| {
                if removed.contains(&old) {
                    None
                } else {
                    next += 1;
                    Some(next - 1)
                }
            })
            .collect();
        Self { removed, remap }
    }

    pub(crate) fn removed(&self) -> &HashSet<Position> {
        &self.removed
    }

    /// New position of a surviving entry.
    ///
    /// # Panics
    /// If `old` was removed or is outside the planned store.
    pub(crate) fn new_position(&self, old: Position) -> Position {
        match self.remap.get(old) {
            Some(Some(new)) => *new,
            Some(None) => panic!(
                "index inconsistency: surviving document still references removed position {}",
                old
            ),
            None => panic!(
                "index inconsistency: position {} outside compaction plan of {}",
                old,
                self.remap.len()
            ),
        }
    }

    /// Number of entries left after the plan is applied.
    pub(crate) fn surviving(&self) -> usize {
        self.remap.len() - self.removed.len()
    }
}

impl<E: EmbeddingProvider> RetrievalIndex<E> {
    /// Remove every chunk of `doc_id`.
    ///
    /// Unknown ids are a no-op, so removal is idempotent. Positions of the
    /// remaining chunks are compacted, keeping their relative order.
    ///
    /// # Returns
    /// The number of chunks removed.
    #[instrument(skip_all, fields(doc_id = %doc_id))]
    pub fn remove_document(&mut self, doc_id: &str) -> Result<usize, RetrievalError> {
        let Some(positions) = self.doc_positions.remove(doc_id) else {
            debug!("Document not indexed, nothing to remove");
            return Ok(0);
        };
        self.doc_order.retain(|id| id != doc_id);

        let removed = positions.len();
        let plan = Compaction::new(self.chunks.len(), positions.into_iter().collect());
        self.apply_compaction(&plan);

        self.debug_assert_consistent();
        info!(
            removed,
            total_chunks = self.chunks.len(),
            "Removed document"
        );
        Ok(removed)
    }

    /// Like [`remove_document`](Self::remove_document), but unknown ids are
    /// an error.
    ///
    /// # Errors
    /// `RetrievalError::UnknownDocument` if `doc_id` has no chunks.
    pub fn try_remove_document(&mut self, doc_id: &str) -> Result<usize, RetrievalError> {
        if !self.doc_positions.contains_key(doc_id) {
            return Err(RetrievalError::UnknownDocument(doc_id.to_string()));
        }
        self.remove_document(doc_id)
    }

    fn apply_compaction(&mut self, plan: &Compaction) {
        compact_in_place(&mut self.chunks, plan.removed());
        self.keyword_index.remove_at(plan.removed());
        self.vector_index.remove_at(plan.removed());

        for positions in self.doc_positions.values_mut() {
            for position in positions.iter_mut() {
                *position = plan.new_position(*position);
            }
        }

        debug_assert_eq!(self.chunks.len(), plan.surviving());
    }
}
