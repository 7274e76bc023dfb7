//! N-gram-based text generation library.
//!
//! This crate provides a statistical language model system including:
//! - Word-level n-gram models with conditional probability tables
//! - An indexed chain of models from a top order down to the unigram leaf
//! - Token sequence generation with an explicit, seedable randomness source
//! - Corpus preparation (boilerplate stripping, tokenization) and I/O helpers
//!
//! Models are trained once from a token corpus and never mutated afterwards;
//! generation is a pure read over the trained tables.

/// Core n-gram models and generation logic.
///
/// This module exposes the model chain interface while keeping
/// internal candidate-table representations private.
pub mod model;

/// Corpus preparation: paragraph-aware tokenization and boilerplate stripping.
pub mod corpus;

/// I/O utilities (corpus file loading, directory listing).
pub mod io;
