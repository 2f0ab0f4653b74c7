//! Negotiation failures.

use std::fmt;

use blockflow_core::BlockId;

/// Why a property negotiation did not produce a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NegotiationError<T: fmt::Debug + fmt::Display> {
    /// Two blocks report different non-null values.
    ///
    /// `reference_*` is the first block (in discovery order) that reported a
    /// value, `conflicting_*` the first one that disagreed with it.
    #[error(
        "property conflict: block '{reference_block}' specifies {reference_value}, \
         block '{conflicting_block}' specifies {conflicting_value}"
    )]
    PropertyConflict {
        reference_block: String,
        reference_id: BlockId,
        reference_value: T,
        conflicting_block: String,
        conflicting_id: BlockId,
        conflicting_value: T,
    },

    /// The underlying search hit its round limit and the negotiator was
    /// configured not to trust a partial result.
    #[error("block search truncated after {rounds} rounds; negotiation would be incomplete")]
    SearchTruncated { rounds: usize },
}

impl<T: fmt::Debug + fmt::Display> NegotiationError<T> {
    /// Unique ids of the two disagreeing blocks, reference first.
    pub fn conflicting_blocks(&self) -> Option<(&str, &str)> {
        match self {
            NegotiationError::PropertyConflict {
                reference_block,
                conflicting_block,
                ..
            } => Some((reference_block, conflicting_block)),
            NegotiationError::SearchTruncated { .. } => None,
        }
    }
}
