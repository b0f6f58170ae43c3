use ordbok_generator::LanguageProfile;
use ordbok_types::HelperMode;
use serde_json::{Value, json};

/// Prompts for a Swedish learner's dictionary
#[derive(Debug, Clone, Copy, Default)]
pub struct SwedishProfile;

impl SwedishProfile {
    pub fn new() -> Self {
        Self
    }
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn object(fields: &[&str], required: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|field| (field.to_string(), string()))
        .collect();

    let mut schema = json!({ "type": "OBJECT", "properties": properties });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

impl LanguageProfile for SwedishProfile {
    fn language_name(&self) -> &str {
        "Swedish"
    }

    fn speech_locale(&self) -> &str {
        "sv-SE"
    }

    fn lookup_instruction(&self) -> String {
        "You are a Swedish-English dictionary. Provide concise entries, one per sense. \
         NO conversational text. Strictly follow the JSON schema. IMPORTANT: JSON values \
         must contain ONLY the word or form, NOT the key name or labels like 'Singular: word'. \
         IPA is phonetic only. Inflections are single words. Fill only the inflection \
         branch that matches the part of speech."
            .to_string()
    }

    fn lookup_prompt(&self, word: &str, target_language: &str) -> String {
        format!("Entry for: \"{}\". Translate secondary to {}.", word.trim(), target_language)
    }

    fn entry_schema(&self) -> Value {
        let noun = [
            "indefiniteSingular",
            "definiteSingular",
            "indefinitePlural",
            "definitePlural",
        ];
        let verb = ["imperative", "infinitive", "present", "past", "supine"];
        let adjective = [
            "positive",
            "comparative",
            "superlative",
            "indefiniteEn",
            "indefiniteEtt",
            "indefinitePlural",
            "definite",
        ];

        let item = json!({
            "type": "OBJECT",
            "properties": {
                "word": string(),
                "ipa": string(),
                "gender": { "type": "STRING", "enum": ["en", "ett", "n/a"] },
                "partOfSpeech": string(),
                "definitions": object(&["english", "secondary"], &["english", "secondary"]),
                "examples": {
                    "type": "ARRAY",
                    "items": object(
                        &["swedish", "english", "secondary"],
                        &["swedish", "english", "secondary"]
                    )
                },
                "compounds": { "type": "ARRAY", "items": string() },
                "inflections": {
                    "type": "OBJECT",
                    "properties": {
                        "noun": object(&noun, &noun),
                        "verb": object(&verb, &[]),
                        "adjective": object(&adjective, &[])
                    }
                },
                "grammarNotes": string()
            },
            "required": ["word", "ipa", "gender", "partOfSpeech", "definitions", "examples", "compounds"]
        });

        json!({ "type": "ARRAY", "items": item })
    }

    fn helper_instruction(&self, mode: HelperMode, target_language: &str) -> String {
        let task = match mode {
            HelperMode::Translate => format!("Translate to English and {target_language}."),
            HelperMode::Correct => format!(
                "Correct the Swedish text and explain the grammar in English and {target_language}."
            ),
            HelperMode::Compose => format!(
                "Write a Swedish paragraph about the topic. Provide English and {target_language} translations."
            ),
            HelperMode::Read => {
                "Break the text into sentences for text-to-speech using ||| as the separator."
                    .to_string()
            }
        };

        format!(
            "You are a Swedish tutor. {task} Strictly JSON output with 'output' and 'explanation' keys."
        )
    }

    fn chapter_instruction(&self) -> String {
        "You are a Swedish teacher. Summarize chapters from Rivstart A1+A2. Provide vocabulary \
         with English and secondary translations. Answer with one JSON object with the keys \
         chapterNumber, title, summarySv, summaryEn, grammar (array of {topic, explanationSv, \
         explanationEn}) and vocabulary (array of {swedish, english, secondary})."
            .to_string()
    }

    fn chapter_prompt(&self, number: u32, title: &str, target_language: &str) -> String {
        format!("Rivstart Chapter {number}: {title}. Secondary lang: {target_language}.")
    }
}
