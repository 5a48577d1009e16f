use anyhow::bail;

use super::params::DecodingParameters;
use super::seed::ScopedRng;

/// Turns raw next-token logits into one sampled token id.
///
/// Steps run in a fixed order: temperature scaling, softmax, top-k,
/// renormalize, top-p, renormalize, sample. Candidates are ordered by
/// descending probability with ties broken by ascending token id, so the
/// whole pipeline is a pure function of (logits, parameters, rng state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogitsProcessor {
    temperature: f64,
    top_k: usize,
    top_p: f64,
}

impl LogitsProcessor {
    pub fn new(temperature: f64, top_k: usize, top_p: f64) -> Self {
        Self {
            temperature,
            top_k,
            top_p,
        }
    }

    pub fn from_params(params: &DecodingParameters) -> Self {
        Self::new(params.temperature, params.top_k, params.top_p)
    }

    /// The renormalized distribution that survives filtering.
    pub fn candidates(&self, logits: &[f32]) -> anyhow::Result<Vec<(u32, f64)>> {
        let finite: Vec<(u32, f64)> = logits
            .iter()
            .enumerate()
            .filter(|(_, logit)| logit.is_finite())
            .map(|(id, &logit)| (id as u32, f64::from(logit)))
            .collect();
        if finite.is_empty() {
            bail!(
                "model returned no finite logits over a vocabulary of {}",
                logits.len()
            );
        }

        let max = finite
            .iter()
            .map(|&(_, l)| l)
            .fold(f64::NEG_INFINITY, f64::max);
        // Shift before scaling: (l - max) <= 0, so the quotient never
        // overflows however small the temperature is.
        let mut probs: Vec<(u32, f64)> = finite
            .into_iter()
            .map(|(id, l)| (id, ((l - max) / self.temperature).exp()))
            .collect();
        normalize(&mut probs);

        probs.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        probs.truncate(self.top_k.max(1));
        normalize(&mut probs);

        let mut cumulative = 0.0;
        let mut keep = probs.len();
        for (i, &(_, p)) in probs.iter().enumerate() {
            cumulative += p;
            // Tolerance keeps top_p = 1.0 from dropping tail tokens to rounding.
            if cumulative >= self.top_p - 1e-12 {
                keep = i + 1;
                break;
            }
        }
        probs.truncate(keep);
        normalize(&mut probs);

        Ok(probs)
    }

    pub fn sample(&self, logits: &[f32], rng: &mut ScopedRng) -> anyhow::Result<u32> {
        let candidates = self.candidates(logits)?;
        let u = rng.next_unit();
        let mut acc = 0.0;
        for &(id, p) in &candidates {
            acc += p;
            if u < acc {
                return Ok(id);
            }
        }
        // Rounding can leave the total a hair under 1.
        match candidates.last() {
            Some(&(id, _)) => Ok(id),
            None => bail!("no candidate tokens left after filtering"),
        }
    }
}

fn normalize(probs: &mut [(u32, f64)]) {
    let total: f64 = probs.iter().map(|&(_, p)| p).sum();
    if total > 0.0 {
        for (_, p) in probs.iter_mut() {
            *p /= total;
        }
    }
}
