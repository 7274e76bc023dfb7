use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ngram_model::NGramModel;
use super::unigram_model::UnigramModel;

/// Chain of n-gram models from a top order down to the unigram leaf.
///
/// A chain of order `N` holds exactly `N` levels: fixed-order
/// [`NGramModel`]s for orders `N` down to 2, stored highest first, then the
/// [`UnigramModel`] leaf. The chain is built iteratively and every level is
/// trained from the same corpus, independently of the other levels.
///
/// Generation reads only the highest-order table and stops on the first
/// unseen history; the lower-order levels stay available for inspection
/// through [`ModelChain::level`] and [`ModelChain::unigram`].
///
/// # Invariants
/// - `order` is always >= 1
/// - `levels` holds orders `order, order - 1, .., 2` in that order
/// - All levels are immutable once the chain is trained
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ModelChain {
	/// Order of the highest level.
	order: usize,

	/// Fixed-order models, highest order first (empty when `order` is 1).
	levels: Vec<NGramModel>,

	/// The order-1 leaf.
	unigram: UnigramModel,
}

/// Serializable description of one trained level.
#[derive(Serialize, Clone, Debug)]
pub struct LevelSummary {
	pub order: usize,
	/// Windows consumed during training (total tokens for the unigram leaf).
	pub windows: usize,
	/// Distinct histories (distinct tokens for the unigram leaf).
	pub contexts: usize,
}

/// Serializable description of a trained chain.
#[derive(Serialize, Clone, Debug)]
pub struct ModelSummary {
	pub order: usize,
	pub vocabulary: usize,
	pub levels: Vec<LevelSummary>,
}

impl ModelChain {
	/// Trains a chain of the given order over a token corpus.
	///
	/// Levels are built iteratively from the top order down to 2, then the
	/// unigram leaf. An order of 1 is a valid chain consisting of the leaf
	/// alone. A corpus shorter than a level's order leaves that level empty;
	/// this is a valid degenerate state, not an error.
	///
	/// # Errors
	/// Returns an error if `order` is 0.
	pub fn train(order: usize, corpus: &[String]) -> Result<Self, String> {
		if order == 0 {
			return Err("order must be >= 1".to_owned());
		}

		let mut levels = Vec::with_capacity(order - 1);
		for n in (2..=order).rev() {
			levels.push(NGramModel::train(n, corpus)?);
		}

		Ok(Self { order, levels, unigram: UnigramModel::train(corpus) })
	}

	/// Order of the highest level.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Returns the fixed-order level of order `n` (2 <= n <= order).
	pub fn level(&self, n: usize) -> Option<&NGramModel> {
		if n < 2 || n > self.order {
			return None;
		}
		self.levels.get(self.order - n)
	}

	/// Returns the unigram leaf.
	pub fn unigram(&self) -> &UnigramModel {
		&self.unigram
	}

	/// Generates up to `count` tokens from the highest-order level.
	///
	/// For an order-1 chain the leaf samples directly. Tokens are joined
	/// with single spaces; `sample(0, ..)` returns an empty string.
	pub fn sample<R: Rng>(&self, count: usize, rng: &mut R) -> String {
		match self.levels.first() {
			Some(top) => top.sample(count, rng),
			None => self.unigram.sample(count, rng),
		}
	}

	/// Describes the trained chain, one entry per level down to the leaf.
	pub fn summary(&self) -> ModelSummary {
		let mut levels: Vec<LevelSummary> = self
			.levels
			.iter()
			.map(|model| LevelSummary {
				order: model.order(),
				windows: model.window_count(),
				contexts: model.context_count(),
			})
			.collect();
		levels.push(LevelSummary {
			order: 1,
			windows: self.unigram.total(),
			contexts: self.unigram.vocabulary_size(),
		});

		ModelSummary {
			order: self.order,
			vocabulary: self.unigram.vocabulary_size(),
			levels,
		}
	}
}
