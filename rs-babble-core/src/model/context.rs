use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

/// Candidate table for a single conditioning context.
///
/// A `Context` corresponds to a fixed history of `n-1` tokens and stores
/// every next token observed after this history, with its occurrence count.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations. The conditional probability
/// of a next token is its count divided by the history total, and the
/// history total always equals the sum of the outgoing counts, so the
/// probabilities over one history sum to exactly 1.
///
/// ## Responsibilities:
/// - Accumulate next-token occurrences during training
/// - Expose the conditional probability of each candidate
/// - Draw the next token using weighted random sampling
/// - Merge with another context having the same history (partial models)
///
/// ## Invariants
/// - All transitions belong to the same `history`
/// - Each transition occurrence count is strictly positive
/// - `total` equals the sum of all transition counts
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Context {
	/// Identifier of the context (the n-1 token history).
	history: Vec<String>,
	/// Next tokens indexed by value; each entry counts how many windows
	/// produced this history followed by this token.
	transitions: HashMap<String, usize>,
	/// Occurrence count of the history itself.
	total: usize,
}

impl Context {
	/// Creates a new empty context for the given history.
	pub fn new(history: &[String]) -> Self {
		Self {
			history: history.to_vec(),
			transitions: HashMap::new(),
			total: 0,
		}
	}

	/// Records one occurrence of `next_token` after this history.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next_token: &str) {
		*self.transitions.entry(next_token.to_owned()).or_insert(0) += 1;
		self.total += 1;
	}

	/// Occurrence count of the history (sum of all candidate counts).
	pub fn total(&self) -> usize {
		self.total
	}

	/// Iterates over candidates as `(token, conditional probability)` pairs.
	pub fn candidates(&self) -> impl Iterator<Item = (&str, f64)> {
		let total = self.total as f64;
		self.transitions
			.iter()
			.map(move |(token, occurrence)| (token.as_str(), *occurrence as f64 / total))
	}

	/// Draws the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count, which is exactly its conditional probability
	/// given this history.
	///
	/// Returns `None` if the context has no transitions.
	pub fn draw<R: Rng>(&self, rng: &mut R) -> Option<String> {
		if self.total == 0 {
			return None;
		}

		// Randomly select a bucket by cumulative subtraction
		let mut r = rng.random_range(0..self.total);

		let mut fallback: Option<&String> = None;
		for (token, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(token.clone());
			}
			r -= occurrence;
			fallback = Some(token);
		}

		// Unreachable while `total` matches the transition sum, kept for safety.
		fallback.cloned()
	}

	/// Merges another context into this one.
	///
	/// Both contexts must represent the same history.
	/// Transition occurrence counts are summed.
	///
	/// This method is intended for combining partial models counted
	/// over separate window ranges of the same corpus.
	///
	/// # Errors
	/// Returns an error if the histories do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.history != other.history {
			return Err("History mismatch".to_owned());
		}

		for (token, occurrence) in &other.transitions {
			*self.transitions.entry(token.clone()).or_insert(0) += *occurrence;
		}
		self.total += other.total;

		Ok(())
	}
}
