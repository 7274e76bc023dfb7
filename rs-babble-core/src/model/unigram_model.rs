use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::corpus::{START_TOKEN, STOP_TOKEN};

/// Leaf model of the chain: a probability distribution over single tokens.
///
/// Counts every token of the corpus and normalizes by the total count.
/// Sampling draws tokens independently, with replacement.
///
/// # Invariants
/// - `total` equals the sum of all counts and is always > 0
/// - The probability distribution sums to 1 over the observed vocabulary
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UnigramModel {
	/// Occurrence count per distinct token.
	counts: HashMap<String, usize>,
	/// Total number of observed tokens.
	total: usize,
}

impl UnigramModel {
	/// Trains a unigram distribution over the whole corpus.
	///
	/// An empty corpus trains as if it were exactly the paragraph marker
	/// pair `[START_TOKEN, STOP_TOKEN]`, so the distribution is always
	/// valid and the total is never zero.
	pub fn train(corpus: &[String]) -> Self {
		let mut model = Self { counts: HashMap::new(), total: 0 };

		if corpus.is_empty() {
			model.observe(START_TOKEN);
			model.observe(STOP_TOKEN);
		} else {
			for token in corpus {
				model.observe(token);
			}
		}

		model
	}

	fn observe(&mut self, token: &str) {
		*self.counts.entry(token.to_owned()).or_insert(0) += 1;
		self.total += 1;
	}

	/// Total number of observed tokens.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct tokens in the distribution.
	pub fn vocabulary_size(&self) -> usize {
		self.counts.len()
	}

	/// Iterates over the distribution as `(token, probability)` pairs.
	pub fn probabilities(&self) -> impl Iterator<Item = (&str, f64)> {
		let total = self.total as f64;
		self.counts
			.iter()
			.map(move |(token, occurrence)| (token.as_str(), *occurrence as f64 / total))
	}

	/// Draws one token, weighted by occurrence count.
	fn draw<R: Rng>(&self, rng: &mut R) -> Option<String> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);

		let mut fallback: Option<&String> = None;
		for (token, occurrence) in &self.counts {
			if r < *occurrence {
				return Some(token.clone());
			}
			r -= occurrence;
			fallback = Some(token);
		}

		// Unreachable while `total` matches the count sum, kept for safety.
		fallback.cloned()
	}

	/// Draws `count` tokens independently and joins them with single spaces.
	///
	/// `sample(0, ..)` returns an empty string.
	pub fn sample<R: Rng>(&self, count: usize, rng: &mut R) -> String {
		let mut output = Vec::with_capacity(count);
		for _ in 0..count {
			match self.draw(rng) {
				Some(token) => output.push(token),
				None => break,
			}
		}
		output.join(" ")
	}

	/// Merges another unigram model into this one, summing counts.
	pub fn merge(&mut self, other: &Self) {
		for (token, occurrence) in &other.counts {
			*self.counts.entry(token.clone()).or_insert(0) += *occurrence;
		}
		self.total += other.total;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn corpus(tokens: &[&str]) -> Vec<String> {
		tokens.iter().map(|t| (*t).to_owned()).collect()
	}

	#[test]
	fn distribution_sums_to_one() {
		let model = UnigramModel::train(&corpus(&["a", "b", "a", "c", "a"]));
		let sum: f64 = model.probabilities().map(|(_, p)| p).sum();
		assert!((sum - 1.0).abs() < 1e-9);
		assert_eq!(model.vocabulary_size(), 3);
		assert_eq!(model.total(), 5);
	}

	#[test]
	fn empty_corpus_degrades_to_marker_pair() {
		let model = UnigramModel::train(&[]);
		assert_eq!(model.total(), 2);
		assert_eq!(model.vocabulary_size(), 2);
		let sum: f64 = model.probabilities().map(|(_, p)| p).sum();
		assert!((sum - 1.0).abs() < 1e-9);
	}

	#[test]
	fn single_token_vocabulary_repeats_regardless_of_seed() {
		let model = UnigramModel::train(&corpus(&["word", "word", "word"]));
		for seed in [0, 1, 42] {
			let mut rng = StdRng::seed_from_u64(seed);
			assert_eq!(model.sample(4, &mut rng), "word word word word");
		}
	}

	#[test]
	fn zero_length_sample_is_empty() {
		let model = UnigramModel::train(&corpus(&["a", "b"]));
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(model.sample(0, &mut rng), "");
	}

	#[test]
	fn merge_sums_counts() {
		let mut left = UnigramModel::train(&corpus(&["a", "b"]));
		let right = UnigramModel::train(&corpus(&["b", "c"]));
		left.merge(&right);

		assert_eq!(left.total(), 4);
		assert_eq!(left.vocabulary_size(), 3);
		let probabilities: HashMap<String, f64> =
			left.probabilities().map(|(t, p)| (t.to_owned(), p)).collect();
		assert_eq!(probabilities["b"], 0.5);
	}
}
