use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::Context;
use crate::corpus::{START_TOKEN, STOP_TOKEN};

/// Window-start ranges per worker thread scale with the CPU count.
const CHUNK_FACTOR: usize = 8;

/// Below this many windows, counting runs inline instead of on threads.
const MIN_PARALLEL_WINDOWS: usize = 4096;

/// Fixed-order n-gram model over word tokens.
///
/// The `NGramModel` stores one [`Context`] per distinct history of `n-1`
/// tokens and allows probabilistic generation of token sequences based on
/// the windows observed during training.
///
/// # Responsibilities
/// - Count every contiguous window of `n` tokens in a corpus
/// - Expose conditional probabilities of next tokens given a history
/// - Generate a token sequence by walking forward from a paragraph start
/// - Merge with another n-gram model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 2
/// - Each context in `contexts` corresponds to a unique history of `n-1` tokens
/// - All transition occurrence counts are >= 1
/// - `windows` counts every window consumed during training (a corpus of
///   length `L` contributes `L - n + 1` windows)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// The order of the model (number of tokens in the n-gram)
	n: usize, // must be >= 2

	/// Mapping from a history (length n-1) to its candidate table
	contexts: HashMap<Vec<String>, Context>,

	/// Number of windows consumed during training
	windows: usize,
}

impl NGramModel {
	/// Creates a new empty n-gram model of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub fn new(n: usize) -> Result<Self, String> {
		if n < 2 {
			return Err("n must be >= 2".to_owned());
		}
		Ok(Self { n, contexts: HashMap::new(), windows: 0 })
	}

	/// Trains an n-gram model of order `n` over a token corpus.
	///
	/// Slides a window of width `n` across the corpus with stride 1 and
	/// counts, for each window, the n-gram and its history. A corpus
	/// shorter than `n` yields a valid empty model.
	///
	/// Large corpora are counted on worker threads: the window-start range
	/// is split into chunks overlapping by `n - 1` tokens so no boundary
	/// window is lost, and the partial models are merged. The merged
	/// counts are identical to sequential counting.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub fn train(n: usize, corpus: &[String]) -> Result<Self, String> {
		let mut model = Self::new(n)?;
		if corpus.len() < n {
			return Ok(model);
		}

		let windows = corpus.len() - n + 1;
		if windows < MIN_PARALLEL_WINDOWS {
			model.ingest(corpus);
			return Ok(model);
		}

		let chunks = num_cpus::get() * CHUNK_FACTOR;
		let chunk_size = (windows + chunks - 1) / chunks;

		let (tx, rx) = mpsc::channel();
		let mut start = 0;
		while start < windows {
			let end = (start + chunk_size).min(windows);
			// Overlap by n-1 tokens so boundary windows are kept
			let slab: Vec<String> = corpus[start..end + n - 1].to_vec();
			let tx = tx.clone();

			thread::spawn(move || {
				// Cannot fail, n was validated above
				let mut partial = Self::new(n).unwrap();
				partial.ingest(&slab);
				tx.send(partial).expect("Failed to send from thread");
			});

			start = end;
		}
		drop(tx);

		for partial in rx.iter() {
			model.merge(&partial)?;
		}

		Ok(model)
	}

	/// Counts every window of the given token slice into this model.
	fn ingest(&mut self, tokens: &[String]) {
		if tokens.len() < self.n {
			return;
		}

		// For each n-gram window
		for window in tokens.windows(self.n) {
			let history = &window[..self.n - 1];
			let next_token = &window[self.n - 1];

			// Get or create the candidate table for this history
			let context = self
				.contexts
				.entry(history.to_vec())
				.or_insert_with(|| Context::new(history));
			context.add_transition(next_token);
			self.windows += 1;
		}
	}

	/// Returns the order of the model.
	pub fn order(&self) -> usize {
		self.n
	}

	/// Number of windows consumed during training.
	pub fn window_count(&self) -> usize {
		self.windows
	}

	/// Number of distinct histories observed during training.
	pub fn context_count(&self) -> usize {
		self.contexts.len()
	}

	/// Iterates over every history observed during training.
	pub fn histories(&self) -> impl Iterator<Item = &[String]> {
		self.contexts.keys().map(|history| history.as_slice())
	}

	/// Returns the candidates for a history as `(token, probability)` pairs.
	///
	/// The probability of a candidate is the count of its n-gram divided by
	/// the count of the history; over one history the pairs sum to 1.
	/// Returns `None` if the history was never observed.
	pub fn conditional_probabilities(&self, history: &[String]) -> Option<Vec<(String, f64)>> {
		self.contexts
			.get(history)
			.map(|context| context.candidates().map(|(t, p)| (t.to_owned(), p)).collect())
	}

	/// Generates up to `max_tokens` tokens by walking the model forward.
	///
	/// Starts from a single [`START_TOKEN`]; at each step the trailing
	/// `min(n - 1, generated so far)` tokens form the lookup history, and
	/// the next token is drawn from that history's candidates, weighted by
	/// conditional probability. An unseen history appends a [`STOP_TOKEN`]
	/// and stops the walk; this is the normal termination signal, not an
	/// error. The initial start marker is excluded from the result and the
	/// remaining tokens are joined with single spaces.
	pub fn sample<R: Rng>(&self, max_tokens: usize, rng: &mut R) -> String {
		let mut output: Vec<String> = vec![START_TOKEN.to_owned()];

		for _ in 0..max_tokens {
			let history_len = (self.n - 1).min(output.len());
			let history = &output[output.len() - history_len..];

			match self.contexts.get(history).and_then(|context| context.draw(rng)) {
				Some(token) => output.push(token),
				None => {
					output.push(STOP_TOKEN.to_owned());
					break;
				}
			}
		}

		output[1..].join(" ")
	}

	/// Merges another n-gram model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n`.
	/// - Occurrence counts for matching histories and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.n != other.n {
			return Err("N mismatch".to_owned());
		}

		for (history, context) in &other.contexts {
			if let Some(existing) = self.contexts.get_mut(history) {
				existing.merge(context)?;
			} else {
				self.contexts.insert(history.clone(), context.clone());
			}
		}
		self.windows += other.windows;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::tokenize;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn corpus(tokens: &[&str]) -> Vec<String> {
		tokens.iter().map(|t| (*t).to_owned()).collect()
	}

	fn sorted(mut pairs: Vec<(String, f64)>) -> Vec<(String, f64)> {
		pairs.sort_by(|a, b| a.0.cmp(&b.0));
		pairs
	}

	#[test]
	fn order_below_two_is_rejected() {
		assert!(NGramModel::new(0).is_err());
		assert!(NGramModel::new(1).is_err());
		assert!(NGramModel::new(2).is_ok());
	}

	#[test]
	fn training_produces_one_window_per_position() {
		let tokens = tokenize("the cat sat on the mat.");
		// [start, the, cat, sat, on, the, mat, ., stop]
		assert_eq!(tokens.len(), 9);
		let model = NGramModel::train(3, &tokens).unwrap();
		assert_eq!(model.window_count(), tokens.len() - 3 + 1);
	}

	#[test]
	fn corpus_shorter_than_order_is_a_valid_empty_model() {
		let model = NGramModel::train(4, &corpus(&["a", "b"])).unwrap();
		assert_eq!(model.window_count(), 0);
		assert_eq!(model.context_count(), 0);

		// Sampling from an empty model terminates immediately with a stop marker
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(model.sample(10, &mut rng), STOP_TOKEN);
	}

	#[test]
	fn probabilities_per_history_sum_to_one() {
		let tokens = tokenize(
			"the cat sat on the mat. the dog sat on the rug.\n\nthe cat ran.",
		);
		for n in [2, 3] {
			let model = NGramModel::train(n, &tokens).unwrap();
			assert!(model.context_count() > 0);
			for history in model.histories() {
				let candidates = model.conditional_probabilities(history).unwrap();
				let sum: f64 = candidates.iter().map(|(_, p)| p).sum();
				assert!((sum - 1.0).abs() < 1e-9, "history {history:?} sums to {sum}");
			}
		}
	}

	#[test]
	fn conditional_probabilities_match_counts() {
		// Windows: (a b), (b a), (a b), (b c)
		let model = NGramModel::train(2, &corpus(&["a", "b", "a", "b", "c"])).unwrap();
		let candidates = sorted(model.conditional_probabilities(&corpus(&["b"])).unwrap());
		assert_eq!(candidates, vec![("a".to_owned(), 0.5), ("c".to_owned(), 0.5)]);
		assert_eq!(model.conditional_probabilities(&corpus(&["z"])), None);
	}

	#[test]
	fn sampling_walks_the_training_chain() {
		// A corpus with no repeated history is a deterministic walk
		let tokens = tokenize("aa bb cc");
		let model = NGramModel::train(2, &tokens).unwrap();
		let mut rng = StdRng::seed_from_u64(99);
		let expected = format!("aa bb cc {} {}", STOP_TOKEN, STOP_TOKEN);
		assert_eq!(model.sample(10, &mut rng), expected);
	}

	#[test]
	fn unseen_history_terminates_generation() {
		let tokens = tokenize("one two three");
		let model = NGramModel::train(2, &tokens).unwrap();
		let vocabulary: Vec<String> = tokens.clone();

		let mut rng = StdRng::seed_from_u64(3);
		let generated = model.sample(50, &mut rng);
		let emitted: Vec<&str> = generated.split(' ').collect();

		// Every emitted token was observed, and the walk stops at the first
		// history with no candidates instead of inventing one.
		for token in &emitted {
			assert!(vocabulary.iter().any(|t| t == token), "unexpected token {token:?}");
		}
		assert_eq!(*emitted.last().unwrap(), STOP_TOKEN);
	}

	#[test]
	fn seeded_sampling_is_deterministic() {
		let tokens = tokenize(
			"the cat sat on the mat. the dog sat on the rug. the cat ran away.",
		);
		let model = NGramModel::train(3, &tokens).unwrap();

		let mut first_rng = StdRng::seed_from_u64(1234);
		let mut second_rng = StdRng::seed_from_u64(1234);
		assert_eq!(model.sample(30, &mut first_rng), model.sample(30, &mut second_rng));
	}

	#[test]
	fn zero_length_sample_is_empty() {
		let model = NGramModel::train(2, &tokenize("a b c")).unwrap();
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(model.sample(0, &mut rng), "");
	}

	#[test]
	fn merge_matches_sequential_counting() {
		let tokens = corpus(&["a", "b", "c", "a", "b", "d", "a", "b", "c", "e", "a", "b"]);
		let mut full = NGramModel::new(2).unwrap();
		full.ingest(&tokens);

		// Window starts 0..6 on the left, 6..11 on the right (overlap n-1 = 1)
		let mut left = NGramModel::new(2).unwrap();
		left.ingest(&tokens[..7]);
		let mut right = NGramModel::new(2).unwrap();
		right.ingest(&tokens[6..]);
		left.merge(&right).unwrap();

		assert_eq!(left.window_count(), full.window_count());
		assert_eq!(left.context_count(), full.context_count());
		for history in full.histories() {
			assert_eq!(
				sorted(left.conditional_probabilities(history).unwrap()),
				sorted(full.conditional_probabilities(history).unwrap()),
			);
		}
	}

	#[test]
	fn merge_rejects_order_mismatch() {
		let mut left = NGramModel::new(2).unwrap();
		let right = NGramModel::new(3).unwrap();
		assert!(left.merge(&right).is_err());
	}

	#[test]
	fn parallel_counting_matches_sequential_counting() {
		// Large enough to cross the threading threshold
		let pattern = ["a", "b", "c", "d", "e"];
		let tokens: Vec<String> = pattern
			.iter()
			.cycle()
			.take(MIN_PARALLEL_WINDOWS + 1000)
			.map(|t| (*t).to_owned())
			.collect();

		let parallel = NGramModel::train(2, &tokens).unwrap();
		let mut sequential = NGramModel::new(2).unwrap();
		sequential.ingest(&tokens);

		assert_eq!(parallel.window_count(), tokens.len() - 1);
		assert_eq!(parallel.window_count(), sequential.window_count());
		assert_eq!(parallel.context_count(), sequential.context_count());
		for history in sequential.histories() {
			assert_eq!(
				sorted(parallel.conditional_probabilities(history).unwrap()),
				sorted(sequential.conditional_probabilities(history).unwrap()),
			);
		}
	}
}
