//! A small deterministic language model and word-level tokenizer.
//!
//! Useful wherever a real model is unavailable or unwanted: tests, demos,
//! and dry runs of an experiment grid. Logits are a pure function of the
//! last two context tokens, so every run with the same seed reproduces.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHasher};

use super::{LanguageModel, TextTokenizer};

pub const EOS_TOKEN: &str = "<eos>";
pub const UNK_TOKEN: &str = "<unk>";

const PUNCTUATION: &[&str] = &[".", ",", "!", "?", ":", ";"];
const SENTENCE_ENDERS: &[&str] = &[".", "!", "?"];

const FANTASY_VOCABULARY: &[&str] = &[
    EOS_TOKEN, UNK_TOKEN, ".", ",", "!", "?", ":", ";",
    // function words
    "the", "a", "of", "and", "to", "in", "with", "from", "beyond", "beneath", "who", "that",
    "must", "will", "was", "is", "his", "her", "their", "an", "once", "never", "before",
    // names
    "Aldric", "Elowen", "Thorne", "Mirelle", "Kaelith", "Brannoc", "Sylvara", "Dorwin",
    "Isolde", "Varek", "Ysolde", "Garrick",
    // creatures and people
    "dragon", "wyrm", "lich", "giant", "goblin", "witch", "knight", "ranger", "oracle",
    "king", "queen", "spirits", "elves", "dwarves", "wanderer", "guardian",
    // places
    "kingdom", "forest", "mountains", "citadel", "ruins", "tower", "sea", "valley",
    "crypt", "realm", "gate", "throne", "shadowfen", "Eldoria", "Karak",
    // items
    "sword", "amulet", "crown", "staff", "ring", "blade", "tome", "chalice", "shield",
    "relic", "gem", "lantern",
    // qualities
    "ancient", "cursed", "forgotten", "silver", "golden", "burning", "frozen", "hidden",
    "sacred", "shattered", "eternal", "lost", "dark", "radiant",
    // verbs
    "find", "defeat", "restore", "protect", "seek", "awaken", "banish", "forge",
    "reclaim", "guard", "slay", "unite", "betrayed", "sealed", "forged", "whispers",
    "sleeps", "rose", "fell", "holds", "grants",
    // prompt words
    "fantasy", "character", "name", "world", "hero", "magical", "item", "called", "tells",
    "tell", "legends",
    // misc nouns
    "legend", "prophecy", "power", "fire", "storm", "night", "blood", "stars", "war",
    "magic", "secret", "oath", "light", "souls",
];

/// Whitespace tokenizer over a fixed word list.
///
/// Trailing punctuation is split into its own token. Unknown words map to
/// [`UNK_TOKEN`], and decoding skips both special tokens.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    words: Vec<String>,
    index: FxHashMap<String, u32>,
    eos: u32,
    unk: u32,
}

impl WordTokenizer {
    pub fn new(words: &[&str]) -> anyhow::Result<Self> {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        let index: FxHashMap<String, u32> = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u32))
            .collect();
        let eos = *index
            .get(EOS_TOKEN)
            .ok_or_else(|| anyhow::anyhow!("vocabulary is missing {EOS_TOKEN}"))?;
        let unk = *index
            .get(UNK_TOKEN)
            .ok_or_else(|| anyhow::anyhow!("vocabulary is missing {UNK_TOKEN}"))?;
        Ok(Self {
            words,
            index,
            eos,
            unk,
        })
    }

    /// Tokenizer over the built-in fantasy word list.
    pub fn fantasy() -> Self {
        let words: Vec<String> = FANTASY_VOCABULARY.iter().map(|w| w.to_string()).collect();
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u32))
            .collect();
        // The built-in list opens with EOS then UNK.
        Self {
            words,
            index,
            eos: 0,
            unk: 1,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.words.len()
    }

    pub fn token_id(&self, word: &str) -> Option<u32> {
        self.index.get(word).copied()
    }

    pub fn eos_id(&self) -> u32 {
        self.eos
    }

    pub fn unk_id(&self) -> u32 {
        self.unk
    }

    fn lookup(&self, word: &str) -> u32 {
        self.index
            .get(word)
            .or_else(|| self.index.get(&word.to_lowercase()))
            .copied()
            .unwrap_or(self.unk)
    }
}

impl TextTokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> anyhow::Result<Vec<u32>> {
        let mut ids = Vec::new();
        for piece in text.split_whitespace() {
            let word = piece.trim_end_matches(|c: char| c.is_ascii_punctuation());
            if !word.is_empty() {
                ids.push(self.lookup(word));
            }
            for mark in piece[word.len()..].chars() {
                ids.push(self.lookup(mark.encode_utf8(&mut [0u8; 4])));
            }
        }
        Ok(ids)
    }

    fn decode(&self, tokens: &[u32]) -> anyhow::Result<String> {
        let mut out = String::new();
        let mut sentence_start = true;
        for &id in tokens {
            if id == self.eos || id == self.unk {
                continue;
            }
            let word = self
                .words
                .get(id as usize)
                .ok_or_else(|| anyhow::anyhow!("token id {id} outside vocabulary of {}", self.words.len()))?;
            if PUNCTUATION.contains(&word.as_str()) {
                out.push_str(word);
                sentence_start = SENTENCE_ENDERS.contains(&word.as_str());
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            if sentence_start {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            } else {
                out.push_str(word);
            }
            sentence_start = false;
        }
        Ok(out)
    }
}

/// Deterministic stand-in for a causal language model.
///
/// Logits for the next token are drawn from a generator seeded by the last
/// two context tokens. Structural rules keep output readable: no repeated
/// punctuation, EOS only right after a sentence ender, and a slight pull
/// toward ending sentences.
#[derive(Debug, Clone)]
pub struct ToyModel {
    vocab_size: usize,
    eos: u32,
    unk: u32,
    punctuation: Vec<u32>,
    sentence_enders: Vec<u32>,
}

impl ToyModel {
    /// Model over the same vocabulary as `tokenizer`.
    pub fn for_tokenizer(tokenizer: &WordTokenizer) -> Self {
        let ids = |marks: &[&str]| -> Vec<u32> {
            marks.iter().filter_map(|m| tokenizer.token_id(m)).collect()
        };
        Self {
            vocab_size: tokenizer.vocab_size(),
            eos: tokenizer.eos_id(),
            unk: tokenizer.unk_id(),
            punctuation: ids(PUNCTUATION),
            sentence_enders: ids(SENTENCE_ENDERS),
        }
    }

    /// The built-in fantasy model together with its tokenizer.
    pub fn fantasy() -> (Self, WordTokenizer) {
        let tokenizer = WordTokenizer::fantasy();
        (Self::for_tokenizer(&tokenizer), tokenizer)
    }
}

impl LanguageModel for ToyModel {
    fn next_token_logits(&self, context: &[u32]) -> anyhow::Result<Vec<f32>> {
        let prev = context.last().copied();
        let prev2 = context.len().checked_sub(2).map(|i| context[i]);

        let mut hasher = FxHasher::default();
        hasher.write_u64(prev2.map_or(u64::MAX, u64::from));
        hasher.write_u64(prev.map_or(u64::MAX, u64::from));
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        let after_punctuation = prev.map_or(true, |p| self.punctuation.contains(&p));
        let after_sentence_end = prev.is_some_and(|p| self.sentence_enders.contains(&p));

        let logits = (0..self.vocab_size as u32)
            .map(|id| {
                let base = rng.random::<f32>() * 6.0 - 3.0;
                if id == self.unk {
                    f32::NEG_INFINITY
                } else if id == self.eos {
                    if after_sentence_end {
                        base + 1.5
                    } else {
                        f32::NEG_INFINITY
                    }
                } else if self.punctuation.contains(&id) {
                    if after_punctuation {
                        f32::NEG_INFINITY
                    } else if self.sentence_enders.contains(&id) {
                        base + 0.5
                    } else {
                        base
                    }
                } else {
                    base
                }
            })
            .collect();
        Ok(logits)
    }

    fn eos_token_id(&self) -> Option<u32> {
        Some(self.eos)
    }

    fn name(&self) -> &str {
        "toy-fantasy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_splits_trailing_punctuation() -> anyhow::Result<()> {
        let tokenizer = WordTokenizer::fantasy();
        let ids = tokenizer.encode("the dragon sleeps.")?;
        assert_eq!(ids.len(), 4);
        assert_eq!(Some(ids[3]), tokenizer.token_id("."));
        Ok(())
    }

    #[test]
    fn unknown_words_map_to_unk() -> anyhow::Result<()> {
        let tokenizer = WordTokenizer::fantasy();
        let ids = tokenizer.encode("zxqv")?;
        assert_eq!(ids, vec![tokenizer.unk_id()]);
        Ok(())
    }

    #[test]
    fn decode_capitalizes_sentences_and_attaches_punctuation() -> anyhow::Result<()> {
        let tokenizer = WordTokenizer::fantasy();
        let ids = tokenizer.encode("the dragon sleeps. the king fell")?;
        assert_eq!(
            tokenizer.decode(&ids)?,
            "The dragon sleeps. The king fell"
        );
        Ok(())
    }

    #[test]
    fn decode_rejects_out_of_range_ids() {
        let tokenizer = WordTokenizer::fantasy();
        assert!(tokenizer.decode(&[10_000]).is_err());
    }

    #[test]
    fn custom_vocabulary_requires_specials() {
        assert!(WordTokenizer::new(&["a", "b"]).is_err());
        assert!(WordTokenizer::new(&[EOS_TOKEN, UNK_TOKEN, "a"]).is_ok());
    }

    #[test]
    fn logits_are_deterministic_per_context() -> anyhow::Result<()> {
        let (model, _) = ToyModel::fantasy();
        let a = model.next_token_logits(&[8, 40])?;
        let b = model.next_token_logits(&[3, 8, 40])?;
        assert_eq!(a, b);
        assert_ne!(a, model.next_token_logits(&[8, 41])?);
        Ok(())
    }

    #[test]
    fn structural_rules_hold() -> anyhow::Result<()> {
        let (model, tokenizer) = ToyModel::fantasy();
        let period = tokenizer.token_id(".").unwrap_or_default();
        let dragon = tokenizer.token_id("dragon").unwrap_or_default();

        let after_word = model.next_token_logits(&[dragon])?;
        assert_eq!(after_word[tokenizer.eos_id() as usize], f32::NEG_INFINITY);
        assert_eq!(after_word[tokenizer.unk_id() as usize], f32::NEG_INFINITY);

        let after_period = model.next_token_logits(&[dragon, period])?;
        assert!(after_period[tokenizer.eos_id() as usize].is_finite());
        assert_eq!(after_period[period as usize], f32::NEG_INFINITY);
        Ok(())
    }
}
