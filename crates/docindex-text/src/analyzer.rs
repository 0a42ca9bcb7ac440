use tantivy::tokenizer::TextAnalyzer;

use docindex_core::traits::Analyzer;

use crate::tantivy_utils::{build_text_analyzer, tokenize};

/// Unigram + bigram term extraction over case-folded tokens.
///
/// Bigrams join adjacent tokens with a single space. A pair of identical
/// tokens ("very very") does not form a bigram.
#[derive(Clone)]
pub struct TermAnalyzer {
	inner: TextAnalyzer,
}

impl Default for TermAnalyzer {
	fn default() -> Self { Self { inner: build_text_analyzer() } }
}

impl TermAnalyzer {
	pub fn tokens(&self, text: &str) -> Vec<String> { tokenize(&self.inner, text) }
}

impl Analyzer for TermAnalyzer {
	fn terms(&self, text: &str) -> Vec<String> {
		let tokens = self.tokens(text);
		let mut terms = Vec::with_capacity(tokens.len() * 2);
		for pair in tokens.windows(2) {
			if pair[0] != pair[1] { terms.push(format!("{} {}", pair[0], pair[1])); }
		}
		terms.extend(tokens);
		terms
	}
}
