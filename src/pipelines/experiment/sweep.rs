use serde::{Deserialize, Serialize};

use crate::core::{GenerationError, Result};
use crate::models::generation::DecodingParameters;

/// A decoding field a sweep can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Prompt,
    Temperature,
    TopK,
    TopP,
    Seed,
    MaxLength,
}

impl Parameter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Temperature => "temperature",
            Self::TopK => "top_k",
            Self::TopP => "top_p",
            Self::Seed => "seed",
            Self::MaxLength => "max_length",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate value for a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(u64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<u64> for ParameterValue {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for ParameterValue {
    fn from(v: usize) -> Self {
        Self::Int(v as u64)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One parameter setting within a combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariedParameter {
    pub name: Parameter,
    pub value: ParameterValue,
}

/// Ordered declaration of which parameters to vary and over which values.
///
/// Combinations enumerate first-axis-major: the first declared parameter
/// changes slowest, the last fastest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sweep {
    axes: Vec<(Parameter, Vec<ParameterValue>)>,
}

impl Sweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vary `parameter` over `values`. Declaring a parameter again replaces
    /// its values but keeps its original position.
    pub fn vary<V: Into<ParameterValue>>(
        mut self,
        parameter: Parameter,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<ParameterValue> = values.into_iter().map(Into::into).collect();
        match self.axes.iter_mut().find(|(p, _)| *p == parameter) {
            Some((_, existing)) => *existing = values,
            None => self.axes.push((parameter, values)),
        }
        self
    }

    pub fn temperatures(self, values: impl IntoIterator<Item = f64>) -> Self {
        self.vary(Parameter::Temperature, values)
    }

    pub fn top_ks(self, values: impl IntoIterator<Item = usize>) -> Self {
        self.vary(Parameter::TopK, values)
    }

    pub fn top_ps(self, values: impl IntoIterator<Item = f64>) -> Self {
        self.vary(Parameter::TopP, values)
    }

    pub fn seeds(self, values: impl IntoIterator<Item = u64>) -> Self {
        self.vary(Parameter::Seed, values)
    }

    pub fn max_lengths(self, values: impl IntoIterator<Item = usize>) -> Self {
        self.vary(Parameter::MaxLength, values)
    }

    pub fn prompts<S: Into<String>>(self, values: impl IntoIterator<Item = S>) -> Self {
        self.vary(Parameter::Prompt, values.into_iter().map(Into::<String>::into))
    }

    pub fn axes(&self) -> &[(Parameter, Vec<ParameterValue>)] {
        &self.axes
    }

    /// Number of combinations: the product of every axis length, so one
    /// for an empty sweep and zero if any axis is empty.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|(_, values)| values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product of all axes in enumeration order.
    pub fn combinations(&self) -> Vec<Vec<VariedParameter>> {
        let mut combos: Vec<Vec<VariedParameter>> = vec![Vec::new()];
        for (name, values) in &self.axes {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut extended = combo.clone();
                    extended.push(VariedParameter {
                        name: *name,
                        value: value.clone(),
                    });
                    next.push(extended);
                }
            }
            combos = next;
        }
        combos
    }
}

/// Write one varied value into `params`.
///
/// A value of the wrong shape for its parameter (text for a temperature,
/// a fraction for top-k) fails as an invalid parameter. Range checks are
/// left to [`DecodingParameters::validate`].
pub fn apply(varied: &VariedParameter, params: &mut DecodingParameters) -> Result<()> {
    let field = varied.name.as_str();
    let mismatch = |expected: &str| {
        GenerationError::invalid(field, format!("expected {expected}, got {}", varied.value))
    };
    match (varied.name, &varied.value) {
        (Parameter::Prompt, ParameterValue::Text(prompt)) => params.prompt.clone_from(prompt),
        (Parameter::Prompt, _) => return Err(mismatch("text")),
        (Parameter::Temperature, value) => {
            params.temperature = as_float(value).ok_or_else(|| mismatch("a number"))?
        }
        (Parameter::TopP, value) => {
            params.top_p = as_float(value).ok_or_else(|| mismatch("a number"))?
        }
        (Parameter::TopK, ParameterValue::Int(v)) => {
            params.top_k = usize::try_from(*v).map_err(|_| mismatch("an integer that fits usize"))?
        }
        (Parameter::MaxLength, ParameterValue::Int(v)) => {
            params.max_length =
                usize::try_from(*v).map_err(|_| mismatch("an integer that fits usize"))?
        }
        (Parameter::Seed, ParameterValue::Int(v)) => params.seed = Some(*v),
        (Parameter::TopK | Parameter::MaxLength | Parameter::Seed, _) => {
            return Err(mismatch("an integer"))
        }
    }
    Ok(())
}

fn as_float(value: &ParameterValue) -> Option<f64> {
    match value {
        ParameterValue::Float(v) => Some(*v),
        ParameterValue::Int(v) => Some(*v as f64),
        ParameterValue::Text(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_first_parameter_major() {
        let sweep = Sweep::new()
            .temperatures([0.5, 1.0])
            .seeds([1u64, 2, 3]);
        assert_eq!(sweep.len(), 6);

        let combos = sweep.combinations();
        let flat: Vec<(String, String)> = combos
            .iter()
            .map(|c| (c[0].value.to_string(), c[1].value.to_string()))
            .collect();
        assert_eq!(
            flat,
            [
                ("0.5", "1"),
                ("0.5", "2"),
                ("0.5", "3"),
                ("1", "1"),
                ("1", "2"),
                ("1", "3"),
            ]
            .map(|(a, b)| (a.to_string(), b.to_string()))
        );
    }

    #[test]
    fn empty_sweep_has_one_combination() {
        let sweep = Sweep::new();
        assert_eq!(sweep.len(), 1);
        assert_eq!(sweep.combinations(), vec![Vec::new()]);
    }

    #[test]
    fn empty_axis_has_no_combinations() {
        let sweep = Sweep::new().temperatures([0.5]).seeds([]);
        assert!(sweep.is_empty());
        assert!(sweep.combinations().is_empty());
    }

    #[test]
    fn redeclaring_replaces_in_place() {
        let sweep = Sweep::new()
            .temperatures([0.5])
            .seeds([1u64])
            .temperatures([0.9, 1.2]);
        assert_eq!(sweep.axes()[0].0, Parameter::Temperature);
        assert_eq!(sweep.axes()[0].1.len(), 2);
        assert_eq!(sweep.axes().len(), 2);
    }

    #[test]
    fn apply_writes_matching_field() -> anyhow::Result<()> {
        let mut params = DecodingParameters::new("x");
        apply(
            &VariedParameter {
                name: Parameter::TopK,
                value: ParameterValue::Int(7),
            },
            &mut params,
        )?;
        apply(
            &VariedParameter {
                name: Parameter::Temperature,
                value: ParameterValue::Int(1),
            },
            &mut params,
        )?;
        assert_eq!(params.top_k, 7);
        assert_eq!(params.temperature, 1.0);
        Ok(())
    }

    #[test]
    fn apply_rejects_wrong_shape() {
        let mut params = DecodingParameters::new("x");
        let err = apply(
            &VariedParameter {
                name: Parameter::TopK,
                value: ParameterValue::Float(0.5),
            },
            &mut params,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("top_k"));

        let err = apply(
            &VariedParameter {
                name: Parameter::Temperature,
                value: "hot".into(),
            },
            &mut params,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("temperature"));
    }

    #[test]
    fn values_serialize_untagged() -> anyhow::Result<()> {
        let json = serde_json::to_string(&vec![
            ParameterValue::Float(0.5),
            ParameterValue::Int(3),
            ParameterValue::Text("a hero".into()),
        ])?;
        assert_eq!(json, r#"[0.5,3,"a hero"]"#);
        Ok(())
    }
}
