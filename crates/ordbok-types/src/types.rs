use serde::{Deserialize, Deserializer, Serialize};

/// Grammatical gender of a Swedish noun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Gender {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "ett")]
    Ett,
    #[default]
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Gender::parse(&tag))
    }
}

impl Gender {
    /// Parse a generator-provided gender tag. Anything unknown is not applicable.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "en" => Gender::En,
            "ett" => Gender::Ett,
            _ => Gender::NotApplicable,
        }
    }

    pub fn article(&self) -> Option<&'static str> {
        match self {
            Gender::En => Some("en"),
            Gender::Ett => Some("ett"),
            Gender::NotApplicable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    /// English gloss
    #[serde(rename = "english")]
    pub primary: String,
    /// Gloss in the target language
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    #[serde(rename = "swedish")]
    pub source: String,
    #[serde(rename = "english")]
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NounForms {
    pub indefinite_singular: String,
    pub definite_singular: String,
    pub indefinite_plural: String,
    pub definite_plural: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerbForms {
    pub imperative: String,
    pub infinitive: String,
    pub present: String,
    pub past: String,
    pub supine: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjectiveForms {
    pub positive: String,
    pub comparative: String,
    pub superlative: String,
    pub indefinite_en: String,
    pub indefinite_ett: String,
    pub indefinite_plural: String,
    pub definite: String,
}

/// Inflection table, one branch per grammatical class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Inflections {
    Noun(NounForms),
    Verb(VerbForms),
    Adjective(AdjectiveForms),
}

/// One sense of one word, translated into one target language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicalEntry {
    pub word: String,
    #[serde(rename = "ipa", default)]
    pub phonetic_form: String,
    #[serde(rename = "gender", default)]
    pub gender_class: Gender,
    #[serde(rename = "partOfSpeech", default)]
    pub grammatical_class: String,
    pub definitions: Definitions,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
    #[serde(rename = "compounds", default)]
    pub compound_forms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflections: Option<Inflections>,
    #[serde(rename = "grammarNotes", default, skip_serializing_if = "Option::is_none")]
    pub grammar_note: Option<String>,
    #[serde(default)]
    pub target_language: String,
}

impl LexicalEntry {
    /// Grammatical class, lowercased for comparisons
    pub fn class_key(&self) -> String {
        self.grammatical_class.to_lowercase()
    }

    /// Uniqueness key within the saved-word set
    pub fn saved_key(&self) -> (String, String) {
        (self.word.to_lowercase(), self.class_key())
    }

    pub fn is_noun(&self) -> bool {
        self.class_key().contains("noun")
    }
}

/// A lookup history entry: one sense plus the moment it was looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub entry: LexicalEntry,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub observed_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperMode {
    Translate,
    Correct,
    Compose,
    Read,
}

impl HelperMode {
    pub fn parse(mode: &str) -> Option<Self> {
        match mode.trim().to_lowercase().as_str() {
            "translate" => Some(HelperMode::Translate),
            "correct" => Some(HelperMode::Correct),
            "compose" => Some(HelperMode::Compose),
            "read" => Some(HelperMode::Read),
            _ => None,
        }
    }
}

/// Separator the generator uses between sentences in read mode
pub const SENTENCE_SEPARATOR: &str = "|||";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperResult {
    pub output: String,
    pub explanation: String,
}

impl HelperResult {
    /// Sentences of a read-mode output, blank pieces dropped
    pub fn sentences(&self) -> Vec<&str> {
        self.output
            .split(SENTENCE_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarPoint {
    pub topic: String,
    #[serde(default)]
    pub explanation_sv: String,
    #[serde(default)]
    pub explanation_en: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub swedish: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    #[serde(default)]
    pub chapter_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary_sv: String,
    #[serde(default)]
    pub summary_en: String,
    #[serde(default)]
    pub grammar: Vec<GrammarPoint>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Look up a word in the active target language
    Lookup(String),
    SetLanguage(String),
    SelectSense(usize),
    ToggleSaved,
    ShowRecent,
    ShowResults {
        entries: Vec<LexicalEntry>,
        selected: usize,
        saved: bool,
        from_cache: bool,
    },
    ShowRecentWords(Vec<(String, Option<String>)>),
    StatusUpdate(String),
    LookupFailed(String),
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_json() -> &'static str {
        r#"{
            "word": "regel",
            "ipa": "ˈreːɡɛl",
            "gender": "en",
            "partOfSpeech": "noun",
            "definitions": { "english": "rule", "secondary": "regla" },
            "examples": [{ "swedish": "Det är en regel.", "english": "It is a rule.", "secondary": "Es una regla." }],
            "compounds": ["regelbok"],
            "inflections": { "noun": {
                "indefiniteSingular": "regel", "definiteSingular": "regeln",
                "indefinitePlural": "regler", "definitePlural": "reglerna" } },
            "targetLanguage": "Spanish"
        }"#
    }

    #[test]
    fn entry_reads_original_field_names() {
        let entry: LexicalEntry = serde_json::from_str(entry_json()).unwrap();
        assert_eq!(entry.gender_class, Gender::En);
        assert_eq!(entry.definitions.primary, "rule");
        assert_eq!(entry.examples[0].source, "Det är en regel.");
        assert!(matches!(entry.inflections, Some(Inflections::Noun(ref n)) if n.definite_plural == "reglerna"));
        assert_eq!(entry.grammar_note, None);
    }

    #[test]
    fn history_record_flattens_entry() {
        let mut value: serde_json::Value = serde_json::from_str(entry_json()).unwrap();
        value["timestamp"] = serde_json::json!(1_700_000_000_000u64);
        let record: HistoryRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.observed_at, 1_700_000_000_000);
        assert_eq!(record.entry.word, "regel");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["timestamp"], 1_700_000_000_000u64);
        assert_eq!(back["partOfSpeech"], "noun");
    }

    #[test]
    fn unknown_gender_is_not_applicable() {
        assert_eq!(Gender::parse("Ett "), Gender::Ett);
        assert_eq!(Gender::parse("common"), Gender::NotApplicable);
        let g: Gender = serde_json::from_str("\"neuter\"").unwrap();
        assert_eq!(g, Gender::NotApplicable);
    }

    #[test]
    fn read_mode_sentences_skip_blanks() {
        let result = HelperResult {
            output: "Hej. ||| Jag heter Anna.|||  |||".into(),
            explanation: String::new(),
        };
        assert_eq!(result.sentences(), vec!["Hej.", "Jag heter Anna."]);
    }
}
