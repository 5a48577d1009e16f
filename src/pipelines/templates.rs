use serde::{Deserialize, Serialize};

use crate::core::GeneratorConfig;
use crate::models::generation::{DecodingParameters, ParameterOverrides};

/// Kind of text a generation call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Name,
    Quest,
    Item,
    Lore,
    /// Raw caller prompt, no template.
    Custom,
}

/// Prompt and per-type defaults for one content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTemplate {
    /// Empty for [`ContentType::Custom`]; the caller supplies the prompt.
    pub prompt: &'static str,
    /// Token budget for this kind of text. `None` falls back to the
    /// generator default.
    pub max_length: Option<usize>,
}

const NAME: ContentTemplate = ContentTemplate {
    prompt: "A fantasy character name: ",
    max_length: Some(20),
};

const QUEST: ContentTemplate = ContentTemplate {
    prompt: "In a fantasy world, a hero must ",
    max_length: Some(80),
};

const ITEM: ContentTemplate = ContentTemplate {
    prompt: "A magical item called ",
    max_length: Some(60),
};

const LORE: ContentTemplate = ContentTemplate {
    prompt: "Ancient legend tells of ",
    max_length: Some(100),
};

const CUSTOM: ContentTemplate = ContentTemplate {
    prompt: "",
    max_length: None,
};

impl ContentType {
    /// The four templated types, in story field order.
    pub const TEMPLATED: [ContentType; 4] = [Self::Name, Self::Quest, Self::Item, Self::Lore];

    pub fn template(self) -> &'static ContentTemplate {
        match self {
            Self::Name => &NAME,
            Self::Quest => &QUEST,
            Self::Item => &ITEM,
            Self::Lore => &LORE,
            Self::Custom => &CUSTOM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Quest => "quest",
            Self::Item => "item",
            Self::Lore => "lore",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "quest" => Ok(Self::Quest),
            "item" => Ok(Self::Item),
            "lore" => Ok(Self::Lore),
            "custom" => Ok(Self::Custom),
            other => anyhow::bail!("unknown content type '{other}'"),
        }
    }
}

/// Merge a type's template with caller overrides.
///
/// Precedence, lowest first: generator config defaults, template defaults,
/// caller overrides. The result is not validated here; a custom request
/// without a prompt comes back with an empty prompt and fails validation
/// when generated.
pub fn build(
    content_type: ContentType,
    overrides: &ParameterOverrides,
    config: &GeneratorConfig,
) -> DecodingParameters {
    let template = content_type.template();
    let mut params = DecodingParameters {
        prompt: template.prompt.to_string(),
        temperature: config.default_temperature,
        top_k: config.default_top_k,
        top_p: config.default_top_p,
        seed: None,
        max_length: template.max_length.unwrap_or(config.default_max_length),
    };
    params.apply(overrides);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_use_type_prompts() {
        let config = GeneratorConfig::default();
        let params = build(ContentType::Quest, &ParameterOverrides::new(), &config);
        assert_eq!(params.prompt, "In a fantasy world, a hero must ");
        assert_eq!(params.max_length, 80);
        assert_eq!(params.temperature, config.default_temperature);
        assert_eq!(params.seed, None);
    }

    #[test]
    fn overrides_win_field_by_field() {
        let config = GeneratorConfig::default();
        let overrides = ParameterOverrides::new().max_length(12).seed(5);
        let params = build(ContentType::Lore, &overrides, &config);
        assert_eq!(params.prompt, "Ancient legend tells of ");
        assert_eq!(params.max_length, 12);
        assert_eq!(params.seed, Some(5));
        assert_eq!(params.top_k, config.default_top_k);
    }

    #[test]
    fn custom_without_prompt_fails_validation() {
        let config = GeneratorConfig::default();
        let params = build(ContentType::Custom, &ParameterOverrides::new(), &config);
        assert_eq!(params.max_length, config.default_max_length);
        let err = params.validate(config.max_length_ceiling).unwrap_err();
        assert_eq!(err.field(), Some("prompt"));
    }

    #[test]
    fn content_type_parses_case_insensitively() -> anyhow::Result<()> {
        assert_eq!("Lore".parse::<ContentType>()?, ContentType::Lore);
        assert!("poem".parse::<ContentType>().is_err());
        Ok(())
    }
}
