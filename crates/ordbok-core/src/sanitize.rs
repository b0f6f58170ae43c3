//! Cleanup of generator-provided text fields.
//!
//! The generator is asked for bare values but regularly leaks schema keys
//! (`indefiniteSingular: regel`), adds notes in parentheses or brackets and
//! uses semicolons as separators. Every leaf string of an entry goes through
//! [`sanitize`] before the entry is cached or stored.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use ordbok_types::{Inflections, LexicalEntry};
use regex::Regex;

/// Shown in place of a value the generator did not provide
pub const PLACEHOLDER: &str = "—";

/// Leaked keys look like camelCase schema names
static LEAKED_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+[A-Z][A-Za-z]*$").expect("leaked key regex"));

static META_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\(note:.*?\)",
        r"(?i)\(see.*?\)",
        r"(?i)\(.*?form.*?\)",
        r"(?i)\bLightspeed\b",
        r"\[.*?\]",
        r";",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("meta regex"))
    .collect()
});

const MAX_KEY_LEN: usize = 32;

/// Clean one generator value. Never fails; empty input yields [`PLACEHOLDER`].
pub fn sanitize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return PLACEHOLDER.to_string();
    };

    let mut clean = strip_key_prefix(raw).to_string();
    for re in META_RES.iter() {
        clean = re.replace_all(&clean, "").into_owned();
    }

    let clean = clean.trim();
    if clean.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        clean.to_string()
    }
}

/// Same as [`sanitize`] for a value that is always present
pub fn sanitize_str(raw: &str) -> String {
    sanitize(Some(raw))
}

pub fn is_placeholder(value: &str) -> bool {
    value == PLACEHOLDER
}

fn strip_key_prefix(value: &str) -> &str {
    let segments = top_level_segments(value);
    if segments.len() < 2 {
        return value;
    }

    if is_leaked_key(segments[0].trim()) {
        segments[1]
    } else {
        segments[segments.len() - 1]
    }
}

/// Split on colons that are not inside a parenthetical or bracketed aside
fn top_level_segments(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);

    segments
}

fn is_leaked_key(head: &str) -> bool {
    head.len() > 3 && head.len() <= MAX_KEY_LEN && LEAKED_KEY_RE.is_match(head)
}

/// Sanitize every text leaf of an entry. Gender and target language are
/// structural and left untouched.
pub fn sanitize_entry(entry: LexicalEntry) -> LexicalEntry {
    let LexicalEntry {
        word,
        phonetic_form,
        gender_class,
        grammatical_class,
        mut definitions,
        mut examples,
        compound_forms,
        inflections,
        grammar_note,
        target_language,
    } = entry;

    definitions.primary = sanitize_str(&definitions.primary);
    definitions.secondary = sanitize_str(&definitions.secondary);

    for example in &mut examples {
        example.source = sanitize_str(&example.source);
        example.primary = sanitize_str(&example.primary);
        example.secondary = sanitize_str(&example.secondary);
    }

    let mut seen = HashSet::new();
    let compound_forms = compound_forms
        .iter()
        .map(|c| sanitize_str(c))
        .filter(|c| !is_placeholder(c) && seen.insert(c.to_lowercase()))
        .collect();

    let grammar_note = grammar_note
        .map(|note| sanitize_str(&note))
        .filter(|note| !is_placeholder(note));

    LexicalEntry {
        word: sanitize_str(&word),
        phonetic_form: sanitize_str(&phonetic_form),
        gender_class,
        grammatical_class: sanitize_str(&grammatical_class),
        definitions,
        examples,
        compound_forms,
        inflections: inflections.map(sanitize_inflections),
        grammar_note,
        target_language,
    }
}

fn sanitize_inflections(inflections: Inflections) -> Inflections {
    match inflections {
        Inflections::Noun(mut forms) => {
            for form in [
                &mut forms.indefinite_singular,
                &mut forms.definite_singular,
                &mut forms.indefinite_plural,
                &mut forms.definite_plural,
            ] {
                *form = sanitize_str(form);
            }
            Inflections::Noun(forms)
        }
        Inflections::Verb(mut forms) => {
            for form in [
                &mut forms.imperative,
                &mut forms.infinitive,
                &mut forms.present,
                &mut forms.past,
                &mut forms.supine,
            ] {
                *form = sanitize_str(form);
            }
            Inflections::Verb(forms)
        }
        Inflections::Adjective(mut forms) => {
            for form in [
                &mut forms.positive,
                &mut forms.comparative,
                &mut forms.superlative,
                &mut forms.indefinite_en,
                &mut forms.indefinite_ett,
                &mut forms.indefinite_plural,
                &mut forms.definite,
            ] {
                *form = sanitize_str(form);
            }
            Inflections::Adjective(forms)
        }
    }
}

/// Headline for an entry. Nouns prefer the indefinite singular with its
/// article ("en regel") so a plural headword is not shown as the base form.
pub fn display_title(entry: &LexicalEntry) -> String {
    let base = match (&entry.inflections, entry.is_noun()) {
        (Some(Inflections::Noun(forms)), true) if !is_placeholder(&forms.indefinite_singular) => {
            sanitize_str(&forms.indefinite_singular)
        }
        _ => sanitize_str(&entry.word),
    };

    match (entry.is_noun(), entry.gender_class.article()) {
        (true, Some(article)) => format!("{article} {base}"),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordbok_types::{Definitions, ExampleSentence, Gender, NounForms};

    #[test]
    fn missing_or_blank_values_become_placeholder() {
        assert_eq!(sanitize(None), PLACEHOLDER);
        assert_eq!(sanitize(Some("")), PLACEHOLDER);
        assert_eq!(sanitize(Some("   ")), PLACEHOLDER);
        assert_eq!(sanitize(Some("[only a note]")), PLACEHOLDER);
        assert_eq!(sanitize(Some(";;")), PLACEHOLDER);
    }

    #[test]
    fn leaked_schema_key_is_dropped() {
        assert_eq!(sanitize_str("indefiniteSingular: regel"), "regel");
        assert_eq!(sanitize_str("definitePlural:reglerna"), "reglerna");
    }

    #[test]
    fn short_prefix_falls_back_to_last_segment() {
        assert_eq!(sanitize_str("en: bil"), "bil");
        assert_eq!(sanitize_str("Plural: form: bilar"), "bilar");
    }

    #[test]
    fn leaked_key_keeps_segment_after_first_colon() {
        assert_eq!(sanitize_str("presentTense: springer: springde"), "springer");
    }

    #[test]
    fn meta_commentary_is_removed() {
        assert_eq!(sanitize_str("springa (Note: irregular)"), "springa");
        assert_eq!(sanitize_str("hus [pl. hus]"), "hus");
        assert_eq!(sanitize_str("sprang (see springa)"), "sprang");
        assert_eq!(sanitize_str("sprungit (supine form)"), "sprungit");
        assert_eq!(sanitize_str("Lightspeed bil"), "bil");
        assert_eq!(sanitize_str("bil; vagn"), "bil vagn");
    }

    #[test]
    fn ordinary_text_is_untouched() {
        assert_eq!(sanitize_str("  Jag springer varje dag.  "), "Jag springer varje dag.");
        assert_eq!(sanitize_str("ˈbiːl"), "ˈbiːl");
    }

    #[test]
    fn sanitize_is_deterministic() {
        let input = "indefinitePlural: regler (Note: irregular) [x]";
        assert_eq!(sanitize_str(input), sanitize_str(input));
        assert_eq!(sanitize_str(input), "regler");
    }

    fn noun_entry() -> LexicalEntry {
        LexicalEntry {
            word: "regler".into(),
            phonetic_form: "".into(),
            gender_class: Gender::En,
            grammatical_class: "Noun".into(),
            definitions: Definitions {
                primary: "rule (Note: countable)".into(),
                secondary: "".into(),
            },
            examples: vec![ExampleSentence {
                source: "swedish: Det är en regel.".into(),
                primary: "It is a rule.".into(),
                secondary: "Es una regla;".into(),
            }],
            compound_forms: vec!["regelbok".into(), "Regelbok".into(), "".into()],
            inflections: Some(Inflections::Noun(NounForms {
                indefinite_singular: "indefiniteSingular: regel".into(),
                definite_singular: "regeln".into(),
                indefinite_plural: "regler".into(),
                definite_plural: "reglerna [plural]".into(),
            })),
            grammar_note: Some("[none]".into()),
            target_language: "Spanish".into(),
        }
    }

    #[test]
    fn entry_leaves_are_all_sanitized() {
        let clean = sanitize_entry(noun_entry());

        assert_eq!(clean.phonetic_form, PLACEHOLDER);
        assert_eq!(clean.definitions.primary, "rule");
        assert_eq!(clean.definitions.secondary, PLACEHOLDER);
        assert_eq!(clean.examples[0].source, "Det är en regel.");
        assert_eq!(clean.examples[0].secondary, "Es una regla");
        assert_eq!(clean.compound_forms, vec!["regelbok".to_string()]);
        assert_eq!(clean.grammar_note, None);
        assert_eq!(clean.target_language, "Spanish");
        match clean.inflections {
            Some(Inflections::Noun(forms)) => {
                assert_eq!(forms.indefinite_singular, "regel");
                assert_eq!(forms.definite_plural, "reglerna");
            }
            other => panic!("unexpected inflections: {other:?}"),
        }
    }

    #[test]
    fn noun_title_uses_singular_with_article() {
        let clean = sanitize_entry(noun_entry());
        assert_eq!(display_title(&clean), "en regel");

        let mut verb = clean.clone();
        verb.grammatical_class = "verb".into();
        verb.word = "springa".into();
        verb.inflections = None;
        assert_eq!(display_title(&verb), "springa");
    }
}
