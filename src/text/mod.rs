// Text normalization — cleaning rewrites and token filtering.

pub mod clean;
pub mod tokenize;

pub use clean::TextCleaner;
pub use tokenize::Tokenizer;
