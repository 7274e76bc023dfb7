//! Top-level module for the n-gram language model system.
//!
//! This module provides a chained n-gram text generator, including:
//! - Fixed-order n-gram models (`NGramModel`)
//! - The unigram leaf distribution (`UnigramModel`)
//! - The indexed chain of models down to order 1 (`ModelChain`)
//! - Internal per-history candidate tables (`Context`)

/// Indexed chain of models from a top order down to the unigram leaf.
///
/// Exposes chain training, level inspection, token sequence generation
/// with an explicit randomness source, and a serializable summary.
pub mod model_chain;

/// Fixed-order n-gram model (`n >= 2`).
///
/// Handles window counting, conditional next-token probabilities,
/// probabilistic sequence generation, and model merging.
pub mod ngram_model;

/// Unigram leaf model.
///
/// A normalized frequency distribution over single tokens, sampled
/// independently with replacement.
pub mod unigram_model;

/// Internal representation of a single conditioning context (history).
///
/// Tracks next-token counts and supports weighted random sampling.
/// This module is not exposed publicly.
mod context;
