use std::sync::OnceLock;

use regex::Regex;

/// Marker token inserted before the content of each paragraph.
pub const START_TOKEN: &str = "\u{0002}";

/// Marker token inserted after the content of each paragraph.
pub const STOP_TOKEN: &str = "\u{0003}";

/// Literal opening a Project Gutenberg preamble boundary.
const START_MARKER: &str = "*** START OF";

/// Literal opening a Project Gutenberg postamble boundary.
const END_MARKER: &str = "*** END OF";

fn paragraph_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	// Should not panic, the pattern is a literal
	PATTERN.get_or_init(|| Regex::new(r"\n{2,}").unwrap())
}

fn token_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	// Should not panic, the pattern is a literal
	PATTERN.get_or_init(|| Regex::new(r"\w+|[^\w\s]").unwrap())
}

/// Extracts the body of a raw book text.
///
/// Line endings are normalized (`\r\n` becomes `\n`), then the text between
/// the end of the first `*** START OF` marker and the start of the first
/// `*** END OF` marker is retained verbatim.
///
/// # Notes
/// - If either marker is absent, the full (normalized) text is returned.
/// - Markers appearing in reverse order degrade to an empty body.
pub fn extract_body(raw: &str) -> String {
	let text = raw.replace("\r\n", "\n");

	if let (Some(start), Some(end)) = (text.find(START_MARKER), text.find(END_MARKER)) {
		return text
			.get(start + START_MARKER.len()..end)
			.unwrap_or_default()
			.to_owned();
	}

	text
}

/// Splits a text into an ordered token sequence with paragraph markers.
///
/// Paragraphs are blocks separated by two-or-more consecutive newlines.
/// Each non-blank paragraph is wrapped with [`START_TOKEN`] before and
/// [`STOP_TOKEN`] after its content tokens. Within a paragraph a token is
/// either a maximal run of word characters or a single non-word,
/// non-whitespace character, matched left to right.
///
/// An empty or whitespace-only input yields exactly `[START_TOKEN, STOP_TOKEN]`.
pub fn tokenize(text: &str) -> Vec<String> {
	let text = text.trim();
	if text.is_empty() {
		return vec![START_TOKEN.to_owned(), STOP_TOKEN.to_owned()];
	}

	let mut tokens = Vec::new();
	for paragraph in paragraph_pattern().split(text) {
		if paragraph.trim().is_empty() {
			continue;
		}
		tokens.push(START_TOKEN.to_owned());
		for token in token_pattern().find_iter(paragraph) {
			tokens.push(token.as_str().to_owned());
		}
		tokens.push(STOP_TOKEN.to_owned());
	}
	tokens
}
