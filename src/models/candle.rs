use std::sync::{Mutex, PoisonError};

use candle_core::{DType, Device, Tensor};

use super::LanguageModel;

/// Weights that support the forward pass used for generation.
///
/// Implemented for whatever candle model a host loads (quantized GGUF
/// weights and the like); `start_pos` is the offset of `input` in the
/// sequence.
pub trait ForwardWeights: Send {
    fn forward(&mut self, input: &Tensor, start_pos: usize) -> candle_core::Result<Tensor>;
}

/// [`LanguageModel`] over candle weights.
///
/// The whole context is re-run from position 0 on every call, so the model
/// carries no state from one call to the next. Forward passes are
/// serialized behind a mutex since candle models take `&mut self`.
pub struct CandleLanguageModel<W: ForwardWeights> {
    weights: Mutex<W>,
    device: Device,
    eos_token_id: Option<u32>,
    name: String,
}

impl<W: ForwardWeights> CandleLanguageModel<W> {
    pub fn new(name: impl Into<String>, weights: W, device: Device, eos_token_id: Option<u32>) -> Self {
        Self {
            weights: Mutex::new(weights),
            device,
            eos_token_id,
            name: name.into(),
        }
    }
}

impl<W: ForwardWeights> LanguageModel for CandleLanguageModel<W> {
    fn next_token_logits(&self, context: &[u32]) -> anyhow::Result<Vec<f32>> {
        if context.is_empty() {
            anyhow::bail!("cannot run a forward pass over an empty context");
        }
        let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
        let logits = {
            let mut weights = self.weights.lock().unwrap_or_else(PoisonError::into_inner);
            weights.forward(&input, 0)?
        };
        let logits = logits.squeeze(0)?;
        // Some models return logits for every position, others only the last.
        let logits = if logits.rank() == 2 {
            let last = logits.dim(0)? - 1;
            logits.get(last)?
        } else {
            logits
        };
        Ok(logits.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }

    fn eos_token_id(&self) -> Option<u32> {
        self.eos_token_id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
