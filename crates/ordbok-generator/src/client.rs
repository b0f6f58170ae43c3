use std::sync::Arc;

use ordbok_core::{EntrySource, LookupError, sanitize_entry};
use ordbok_types::{
    AdjectiveForms, ChapterContent, Definitions, ExampleSentence, Gender, HelperMode,
    HelperResult, Inflections, LexicalEntry, NounForms, VerbForms,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::prompt::LanguageProfile;
use crate::response::parse_payload;
use crate::retry::{RetryPolicy, is_rate_limited, with_retry_when};
use crate::{GenerateError, GenerateRequest, Generator};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Generate(#[from] GenerateError),

    #[error("Could not read response: {0}")]
    Parse(String),

    #[error("Nothing to show")]
    Empty,
}

impl ClientError {
    /// Only generator failures can carry a rate-limit signal; parse errors
    /// quote payload positions and text that may contain "429"
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Generate(e) => is_rate_limited(&e.to_string()),
            Self::Parse(_) | Self::Empty => false,
        }
    }
}

/// Lookups, text help and chapter summaries on top of a [`Generator`]
pub struct GeneratorClient<G> {
    generator: G,
    profile: Arc<dyn LanguageProfile>,
    retry: RetryPolicy,
    temperature: f32,
}

impl<G: Generator> GeneratorClient<G> {
    pub fn new(generator: G, profile: Arc<dyn LanguageProfile>) -> Self {
        Self {
            generator,
            profile,
            retry: RetryPolicy::default(),
            temperature: 0.0,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn profile(&self) -> &dyn LanguageProfile {
        self.profile.as_ref()
    }

    /// Every sense of `word`, sanitized, with secondary glosses in `target_language`
    pub async fn lookup(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<Vec<LexicalEntry>, ClientError> {
        let request = GenerateRequest {
            system_instruction: self.profile.lookup_instruction(),
            prompt: self.profile.lookup_prompt(word, target_language),
            response_schema: Some(self.profile.entry_schema()),
            temperature: self.temperature,
        };
        let request = &request;

        tracing::debug!(
            "Looking up {} '{}' for {}",
            self.profile.language_name(),
            word,
            target_language
        );

        with_retry_when(&self.retry, ClientError::is_rate_limited, || async move {
            let raw = self.call(request).await?;
            parse_entries(&raw, word, target_language)
        })
        .await
    }

    pub async fn text_help(
        &self,
        text: &str,
        mode: HelperMode,
        target_language: &str,
    ) -> Result<HelperResult, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::Empty);
        }

        let request = GenerateRequest {
            system_instruction: self.profile.helper_instruction(mode, target_language),
            prompt: text.to_string(),
            response_schema: Some(self.profile.helper_schema()),
            temperature: self.temperature,
        };
        let request = &request;

        with_retry_when(&self.retry, ClientError::is_rate_limited, || async move {
            let raw = self.call(request).await?;
            parse_helper(&raw)
        })
        .await
    }

    pub async fn chapter(
        &self,
        number: u32,
        title: &str,
        target_language: &str,
    ) -> Result<ChapterContent, ClientError> {
        let request = GenerateRequest {
            system_instruction: self.profile.chapter_instruction(),
            prompt: self.profile.chapter_prompt(number, title, target_language),
            response_schema: None,
            temperature: self.temperature,
        };
        let request = &request;

        with_retry_when(&self.retry, ClientError::is_rate_limited, || async move {
            let raw = self.call(request).await?;
            parse_chapter(&raw, number, title)
        })
        .await
    }

    async fn call(&self, request: &GenerateRequest) -> Result<String, ClientError> {
        let raw = self.generator.generate(request).await?;
        if raw.trim().is_empty() {
            return Err(GenerateError::EmptyResponse.into());
        }
        Ok(raw)
    }
}

#[async_trait::async_trait]
impl<G: Generator> EntrySource for GeneratorClient<G> {
    async fn fetch_entries(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<Vec<LexicalEntry>, LookupError> {
        self.lookup(word, target_language).await.map_err(|e| {
            tracing::warn!("Lookup of '{}' failed: {}", word, e);
            LookupError::failed(e.to_string())
        })
    }
}

/// Entries from a lookup payload: an array, an object wrapping one, or a
/// single entry object
pub fn parse_entries(
    raw: &str,
    requested_word: &str,
    target_language: &str,
) -> Result<Vec<LexicalEntry>, ClientError> {
    let payload = parse_payload(raw).map_err(ClientError::Parse)?;

    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let wrapped = ["entries", "results", "words"]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                });
            match wrapped {
                Some(items) => items,
                None => vec![Value::Object(map)],
            }
        }
        other => {
            return Err(ClientError::Parse(format!(
                "expected entries, found {other}"
            )));
        }
    };

    let total = items.len();
    let entries: Vec<LexicalEntry> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawEntry>(item) {
            Ok(raw) => Some(raw.into_entry(requested_word, target_language)),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect();

    if total > 0 && entries.is_empty() {
        return Err(ClientError::Parse("no readable entries".to_string()));
    }

    Ok(entries)
}

fn parse_helper(raw: &str) -> Result<HelperResult, ClientError> {
    let payload = parse_payload(raw).map_err(ClientError::Parse)?;
    let helper: RawHelper =
        serde_json::from_value(payload).map_err(|e| ClientError::Parse(e.to_string()))?;

    let output = helper.output.unwrap_or_default().trim().to_string();
    if output.is_empty() {
        return Err(ClientError::Empty);
    }

    Ok(HelperResult {
        output,
        explanation: helper.explanation.unwrap_or_default().trim().to_string(),
    })
}

fn parse_chapter(raw: &str, number: u32, title: &str) -> Result<ChapterContent, ClientError> {
    let payload = parse_payload(raw).map_err(ClientError::Parse)?;
    let mut chapter: ChapterContent =
        serde_json::from_value(payload).map_err(|e| ClientError::Parse(e.to_string()))?;

    if chapter.chapter_number == 0 {
        chapter.chapter_number = number;
    }
    if chapter.title.trim().is_empty() {
        chapter.title = title.to_string();
    }

    Ok(chapter)
}

/// Text from whatever scalar the generator put in a string slot
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Strings from an array, or a comma separated string
fn loose_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_text).collect(),
        Value::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => Vec::new(),
    })
}

/// Readable items of an array; anything else is empty
fn loose_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn loose_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHelper {
    #[serde(deserialize_with = "loose_text")]
    output: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    explanation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEntry {
    #[serde(deserialize_with = "loose_text")]
    word: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    ipa: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    gender: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    part_of_speech: Option<String>,
    #[serde(deserialize_with = "loose_object")]
    definitions: Option<RawDefinitions>,
    #[serde(deserialize_with = "loose_vec")]
    examples: Vec<RawExample>,
    #[serde(deserialize_with = "loose_list")]
    compounds: Vec<String>,
    #[serde(deserialize_with = "loose_object")]
    inflections: Option<RawInflections>,
    #[serde(deserialize_with = "loose_text")]
    grammar_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefinitions {
    #[serde(deserialize_with = "loose_text")]
    english: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    secondary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawExample {
    #[serde(deserialize_with = "loose_text")]
    swedish: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    english: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    secondary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawInflections {
    #[serde(deserialize_with = "loose_object")]
    noun: Option<RawNoun>,
    #[serde(deserialize_with = "loose_object")]
    verb: Option<RawVerb>,
    #[serde(deserialize_with = "loose_object")]
    adjective: Option<RawAdjective>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawNoun {
    #[serde(deserialize_with = "loose_text")]
    indefinite_singular: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    definite_singular: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    indefinite_plural: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    definite_plural: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVerb {
    #[serde(deserialize_with = "loose_text")]
    imperative: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    infinitive: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    present: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    past: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    supine: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAdjective {
    #[serde(deserialize_with = "loose_text")]
    positive: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    comparative: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    superlative: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    indefinite_en: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    indefinite_ett: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    indefinite_plural: Option<String>,
    #[serde(deserialize_with = "loose_text")]
    definite: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Noun,
    Verb,
    Adjective,
}

impl RawInflections {
    fn present(&self) -> Vec<Branch> {
        let mut branches = Vec::new();
        if self.noun.is_some() {
            branches.push(Branch::Noun);
        }
        if self.verb.is_some() {
            branches.push(Branch::Verb);
        }
        if self.adjective.is_some() {
            branches.push(Branch::Adjective);
        }
        branches
    }

    /// Keep the one branch that matches the grammatical class
    fn select(self, class: &str) -> Option<Inflections> {
        let class = class.to_lowercase();
        let tokens: Vec<&str> = class
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| !t.is_empty())
            .collect();

        let named = if tokens.iter().any(|t| *t == "adjective" || *t == "adj") {
            Some(Branch::Adjective)
        } else if tokens.contains(&"noun") {
            Some(Branch::Noun)
        } else if tokens.contains(&"verb") {
            Some(Branch::Verb)
        } else {
            None
        };

        let branch = match (named, self.present().as_slice()) {
            (Some(branch), _) => branch,
            (None, [only]) => *only,
            (None, _) => return None,
        };

        match branch {
            Branch::Noun => self.noun.map(|n| {
                Inflections::Noun(NounForms {
                    indefinite_singular: n.indefinite_singular.unwrap_or_default(),
                    definite_singular: n.definite_singular.unwrap_or_default(),
                    indefinite_plural: n.indefinite_plural.unwrap_or_default(),
                    definite_plural: n.definite_plural.unwrap_or_default(),
                })
            }),
            Branch::Verb => self.verb.map(|v| {
                Inflections::Verb(VerbForms {
                    imperative: v.imperative.unwrap_or_default(),
                    infinitive: v.infinitive.unwrap_or_default(),
                    present: v.present.unwrap_or_default(),
                    past: v.past.unwrap_or_default(),
                    supine: v.supine.unwrap_or_default(),
                })
            }),
            Branch::Adjective => self.adjective.map(|a| {
                Inflections::Adjective(AdjectiveForms {
                    positive: a.positive.unwrap_or_default(),
                    comparative: a.comparative.unwrap_or_default(),
                    superlative: a.superlative.unwrap_or_default(),
                    indefinite_en: a.indefinite_en.unwrap_or_default(),
                    indefinite_ett: a.indefinite_ett.unwrap_or_default(),
                    indefinite_plural: a.indefinite_plural.unwrap_or_default(),
                    definite: a.definite.unwrap_or_default(),
                })
            }),
        }
    }
}

impl RawEntry {
    fn into_entry(self, requested_word: &str, target_language: &str) -> LexicalEntry {
        let word = self
            .word
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| requested_word.trim().to_string());
        let class = self.part_of_speech.unwrap_or_default();
        let definitions = self.definitions.unwrap_or_default();

        let entry = LexicalEntry {
            word,
            phonetic_form: self.ipa.unwrap_or_default(),
            gender_class: Gender::parse(self.gender.as_deref().unwrap_or_default()),
            inflections: self.inflections.and_then(|i| i.select(&class)),
            grammatical_class: class,
            definitions: Definitions {
                primary: definitions.english.unwrap_or_default(),
                secondary: definitions.secondary.unwrap_or_default(),
            },
            examples: self
                .examples
                .into_iter()
                .map(|e| ExampleSentence {
                    source: e.swedish.unwrap_or_default(),
                    primary: e.english.unwrap_or_default(),
                    secondary: e.secondary.unwrap_or_default(),
                })
                .collect(),
            compound_forms: self.compounds,
            grammar_note: self.grammar_notes,
            target_language: target_language.to_string(),
        };

        sanitize_entry(entry)
    }
}
