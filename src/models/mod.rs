pub mod candle;
pub mod generation;
pub mod tokenizer;
pub mod toy;

pub use candle::{CandleLanguageModel, ForwardWeights};
pub use tokenizer::HfTokenizer;
pub use toy::{ToyModel, WordTokenizer};

/// A causal language model seen from the outside: given the tokens so far,
/// score every vocabulary entry as the next token.
///
/// Implementations are read-only from the caller's point of view and must
/// be safe to call from several generation calls at once.
pub trait LanguageModel: Send + Sync {
    /// Unnormalized next-token logits, one per vocabulary entry.
    fn next_token_logits(&self, context: &[u32]) -> anyhow::Result<Vec<f32>>;

    /// Token that ends a sequence naturally, if the model has one.
    fn eos_token_id(&self) -> Option<u32>;

    fn name(&self) -> &str;
}

/// Text to token ids and back.
pub trait TextTokenizer: Send + Sync {
    fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>>;

    fn decode(&self, tokens: &[u32]) -> anyhow::Result<String>;
}

impl<T: LanguageModel + ?Sized> LanguageModel for std::sync::Arc<T> {
    fn next_token_logits(&self, context: &[u32]) -> anyhow::Result<Vec<f32>> {
        (**self).next_token_logits(context)
    }

    fn eos_token_id(&self) -> Option<u32> {
        (**self).eos_token_id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: TextTokenizer + ?Sized> TextTokenizer for std::sync::Arc<T> {
    fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        (**self).encode(text)
    }

    fn decode(&self, tokens: &[u32]) -> anyhow::Result<String> {
        (**self).decode(tokens)
    }
}
