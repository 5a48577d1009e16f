use std::path::Path;

use super::TextTokenizer;

/// [`TextTokenizer`] backed by a Hugging Face `tokenizer.json`.
#[derive(Clone)]
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    pub fn new(inner: tokenizers::Tokenizer) -> Self {
        Self { inner }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(anyhow::Error::msg)?;
        Ok(Self { inner })
    }

    /// Downloads (or reuses the cached copy of) a tokenizer from the Hub.
    pub fn from_hub(repo: &str, filename: &str) -> anyhow::Result<Self> {
        let tokenizer_path = {
            let api = hf_hub::api::sync::Api::new()?;
            let api = api.model(repo.to_string());
            api.get(filename)?
        };
        tracing::debug!(repo, filename, path = %tokenizer_path.display(), "loaded tokenizer");
        Self::from_file(tokenizer_path)
    }

    /// Id of `token` in the vocabulary, special tokens included.
    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.inner.get_vocab(true).get(token).copied()
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(anyhow::Error::msg)?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, tokens: &[u32]) -> anyhow::Result<String> {
        self.inner
            .decode(tokens, true)
            .map_err(|e| anyhow::anyhow!("Failed to decode generated tokens: {}", e))
    }
}
