use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Shortest token kept, in characters.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Alphanumeric word runs, lowercased. No stop words: common words are
/// down-weighted by IDF instead.
pub fn build_text_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.build()
}

pub fn tokenize(analyzer: &TextAnalyzer, text: &str) -> Vec<String> {
	let mut analyzer = analyzer.clone();
	let mut stream = analyzer.token_stream(text);
	let mut tokens = Vec::new();
	while stream.advance() {
		let token = &stream.token().text;
		if token.chars().count() >= MIN_TOKEN_CHARS { tokens.push(token.clone()); }
	}
	tokens
}
