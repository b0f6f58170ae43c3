use std::fmt::Write as _;

use kanal::AsyncReceiver;
use ordbok_config::lookup::language_label;
use ordbok_core::display_title;
use ordbok_types::{
    AppEvent, ChapterContent, HelperMode, HelperResult, HistoryRecord, Inflections, LanguageOption,
    LexicalEntry,
};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Print app output until the session quits or is cancelled
pub async fn ui_loop<W>(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    mut out: W,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let event = tokio::select! {
            event = app_to_ui_rx.recv() => event?,
            _ = cancel.cancelled() => break,
        };

        let text = match event {
            AppEvent::ShowResults {
                entries,
                selected,
                saved,
                from_cache,
            } => render_results(&entries, selected, saved, from_cache),
            AppEvent::ShowRecentWords(words) => render_recent(&words),
            AppEvent::StatusUpdate(status) => format!("{status}\n"),
            AppEvent::LookupFailed(message) => format!("Error: {message}\n"),
            AppEvent::Quit => break,
            _ => continue,
        };

        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
    }

    Ok(())
}

/// Every sense as a numbered list, with the selected one in full
pub fn render_results(
    entries: &[LexicalEntry],
    selected: usize,
    saved: bool,
    from_cache: bool,
) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let mut out = String::new();
    if entries.len() > 1 {
        for (i, entry) in entries.iter().enumerate() {
            let marker = if i == selected { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{marker} {}. {} ({})",
                i + 1,
                display_title(entry),
                entry.grammatical_class
            );
        }
        out.push('\n');
    }

    if let Some(entry) = entries.get(selected) {
        out.push_str(&render_entry(entry));
    }

    let mut flags = Vec::new();
    if saved {
        flags.push("saved");
    }
    if from_cache {
        flags.push("cached");
    }
    if !flags.is_empty() {
        let _ = writeln!(out, "[{}]", flags.join(", "));
    }

    out
}

pub fn render_entry(entry: &LexicalEntry) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}  /{}/  {}",
        display_title(entry),
        entry.phonetic_form,
        entry.grammatical_class
    );
    let _ = writeln!(out, "  English: {}", entry.definitions.primary);
    let _ = writeln!(
        out,
        "  {}: {}",
        language_label(&entry.target_language),
        entry.definitions.secondary
    );

    match &entry.inflections {
        Some(Inflections::Noun(n)) => {
            let _ = writeln!(
                out,
                "  Forms: {} | {} | {} | {}",
                n.indefinite_singular, n.definite_singular, n.indefinite_plural, n.definite_plural
            );
        }
        Some(Inflections::Verb(v)) => {
            let _ = writeln!(
                out,
                "  Forms: {} | {} | {} | {} | {}",
                v.imperative, v.infinitive, v.present, v.past, v.supine
            );
        }
        Some(Inflections::Adjective(a)) => {
            let _ = writeln!(
                out,
                "  Forms: {} | {} | {}  ({} | {} | {} | {})",
                a.positive,
                a.comparative,
                a.superlative,
                a.indefinite_en,
                a.indefinite_ett,
                a.indefinite_plural,
                a.definite
            );
        }
        None => {}
    }

    for example in &entry.examples {
        let _ = writeln!(out, "  * {}", example.source);
        let _ = writeln!(out, "    {} / {}", example.primary, example.secondary);
    }

    if !entry.compound_forms.is_empty() {
        let _ = writeln!(out, "  Compounds: {}", entry.compound_forms.join(", "));
    }

    if let Some(note) = &entry.grammar_note {
        let _ = writeln!(out, "  Note: {note}");
    }

    out
}

pub fn render_recent(words: &[(String, Option<String>)]) -> String {
    if words.is_empty() {
        return "No recent words.\n".to_string();
    }

    let mut out = String::from("Recent:\n");
    for (word, language) in words {
        match language {
            Some(language) => {
                let short: String = language.chars().take(3).collect();
                let _ = writeln!(out, "  {word} ({short})");
            }
            None => {
                let _ = writeln!(out, "  {word}");
            }
        }
    }
    out
}

pub fn render_languages(languages: &[LanguageOption], current: &str) -> String {
    let mut out = String::new();
    for language in languages {
        let marker = if language.code == current { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {:<22}{}", language.code, language.label);
    }
    out
}

pub fn render_history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "History is empty.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{}  {} ({}) -> {}",
            display_title(&record.entry),
            record.entry.definitions.primary,
            record.entry.grammatical_class,
            record.entry.target_language
        );
    }
    out
}

pub fn render_saved(entries: &[LexicalEntry]) -> String {
    if entries.is_empty() {
        return "No saved words.\n".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            format!(
                "{}  {} / {}\n",
                display_title(entry),
                entry.definitions.primary,
                entry.definitions.secondary
            )
        })
        .collect()
}

pub fn render_helper(result: &HelperResult, mode: HelperMode) -> String {
    let mut out = String::new();

    if mode == HelperMode::Read {
        for (i, sentence) in result.sentences().iter().enumerate() {
            let _ = writeln!(out, "{}. {sentence}", i + 1);
        }
    } else {
        let _ = writeln!(out, "{}", result.output);
    }

    if !result.explanation.is_empty() {
        let _ = writeln!(out, "\n{}", result.explanation);
    }
    out
}

pub fn render_chapter(chapter: &ChapterContent) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Chapter {}: {}", chapter.chapter_number, chapter.title);
    let _ = writeln!(out, "\n{}\n{}", chapter.summary_sv, chapter.summary_en);

    if !chapter.grammar.is_empty() {
        let _ = writeln!(out, "\nGrammar:");
        for point in &chapter.grammar {
            let _ = writeln!(out, "  {}: {}", point.topic, point.explanation_en);
        }
    }

    if !chapter.vocabulary.is_empty() {
        let _ = writeln!(out, "\nVocabulary:");
        for item in &chapter.vocabulary {
            let _ = writeln!(out, "  {}  {} / {}", item.swedish, item.english, item.secondary);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use ordbok_types::{Definitions, Gender, NounForms};

    use super::*;

    fn entry(word: &str) -> LexicalEntry {
        LexicalEntry {
            word: word.into(),
            phonetic_form: "ˈreːɡɛl".into(),
            gender_class: Gender::En,
            grammatical_class: "noun".into(),
            definitions: Definitions {
                primary: "rule".into(),
                secondary: "regla".into(),
            },
            examples: vec![],
            compound_forms: vec!["regelbok".into()],
            inflections: Some(Inflections::Noun(NounForms {
                indefinite_singular: "regel".into(),
                definite_singular: "regeln".into(),
                indefinite_plural: "regler".into(),
                definite_plural: "reglerna".into(),
            })),
            grammar_note: None,
            target_language: "Spanish".into(),
        }
    }

    #[test]
    fn selected_sense_is_marked_and_expanded() {
        let text = render_results(&[entry("regler"), entry("regel")], 1, true, false);

        assert!(text.contains("> 2. en regel (noun)"));
        assert!(text.contains("Spanish (Español): regla"));
        assert!(text.contains("regel | regeln | regler | reglerna"));
        assert!(text.ends_with("[saved]\n"));
    }

    #[test]
    fn recent_words_show_language_prefix() {
        let text = render_recent(&[("bil".into(), Some("Spanish".into())), ("hus".into(), None)]);
        assert_eq!(text, "Recent:\n  bil (Spa)\n  hus\n");
    }

    #[test]
    fn current_language_is_marked() {
        let languages = [
            LanguageOption {
                code: "Spanish".into(),
                label: "Spanish (Español)".into(),
            },
            LanguageOption {
                code: "German".into(),
                label: "German (Deutsch)".into(),
            },
        ];
        let text = render_languages(&languages, "German");
        assert!(text.starts_with("  Spanish "));
        assert!(text.contains("* German"));
        assert!(text.ends_with("German (Deutsch)\n"));
    }

    #[test]
    fn read_mode_lists_sentences() {
        let result = HelperResult {
            output: "Hej.|||Hur mår du?".into(),
            explanation: String::new(),
        };
        assert_eq!(render_helper(&result, HelperMode::Read), "1. Hej.\n2. Hur mår du?\n");
    }
}
