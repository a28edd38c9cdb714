//! LLM translation suggestions: prompt construction and response parsing.
//!
//! Source terms are sent as enumerated lines, `<n>|<term>`, and the model
//! answers with `<n>|<translation>[|<translation2>]`. Lines that do not
//! follow that shape are skipped.

use std::collections::HashMap;
use std::fmt::Write;

use termset_client::traits::LlmClient;
use termset_core::result::AppResult;
use termset_entity::translation_set::TranslationSet;

fn response_format(language: &str, dual: bool) -> String {
    if dual {
        format!(
            "For each term provided, return the term number and the top two {language} translations.\n\
             Use the exact formatting below:\n\
             <term number>|<translation1>|<translation2>"
        )
    } else {
        format!(
            "For each term provided, return the term number and the {language} translation.\n\
             Use the exact formatting below:\n\
             <term number>|<translation>"
        )
    }
}

fn guidelines(dual: bool) -> String {
    let count = if dual { "two translations" } else { "one translation" };
    format!(
        "Guidelines:\n\
         - Provide {count} after each line number. If a translation cannot be found output the line number and pipe but leave the translation blank.\n\
         - Preserve the original order of the lines; do not reorder, group, or summarize them.\n\
         - Preserve all modifiers, qualifiers, any body location descriptors.\n\
         - Keep output terse, limited to the requested direct translations in plain text."
    )
}

fn golden_examples(set: &TranslationSet) -> String {
    let mut out = String::new();
    let examples = set
        .ai_golden_set
        .iter()
        .filter_map(|ex| ex.source_term().map(|term| (term, ex.translation.as_str())));
    for (n, (term, translation)) in examples.enumerate() {
        let _ = writeln!(out, "{}|{} → {}", n + 1, term, translation);
    }
    out
}

/// Build the suggestion prompt for `sources`.
pub fn build_prompt(set: &TranslationSet, sources: &[String], dual: bool) -> String {
    let language = set.language_code.as_deref().unwrap_or_default();
    let mut terms = String::new();
    for (n, term) in sources.iter().enumerate() {
        let _ = writeln!(terms, "{}|{}", n + 1, term);
    }

    format!(
        "Translate the following clinical terminology terms from English to {language}.\n\
         {}\n\
         {}\n\
         {}\n\
         Examples:\n\
         {}\n\
         English terms:\n\
         {}\n",
        response_format(language, dual),
        guidelines(dual),
        set.ai_language_advice.as_deref().unwrap_or_default(),
        golden_examples(set),
        terms,
    )
}

/// Map each source term to its ranked suggestions.
///
/// Code fences around the answer are ignored. A line is used only when its
/// first field is a line number referencing `sources`; blank suggestions are
/// dropped and terms with none are left out.
pub fn parse_response(sources: &[String], response: &str) -> HashMap<String, Vec<String>> {
    let cleaned = response.replace("```json", "").replace("```", "");
    let mut suggestions = HashMap::new();

    for line in cleaned.lines() {
        if !line.contains('|') {
            continue;
        }
        let mut fields = line.split('|');
        let number = fields.next().unwrap_or_default().trim();
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            tracing::debug!("Skipping suggestion line without a term number: {}", line);
            continue;
        }
        let Some(source) = number
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| sources.get(i))
        else {
            tracing::debug!("Skipping suggestion line with unknown term number: {}", line);
            continue;
        };

        let ranked: Vec<String> = fields
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !ranked.is_empty() {
            suggestions.insert(source.clone(), ranked);
        }
    }
    suggestions
}

/// Ask the LLM for suggestions for `sources`.
pub async fn suggest_translations(
    llm: &dyn LlmClient,
    set: &TranslationSet,
    sources: &[String],
    dual: bool,
    fast: bool,
) -> AppResult<HashMap<String, Vec<String>>> {
    let prompt = build_prompt(set, sources, dual);
    let response = llm.chat(&prompt, fast).await?;
    let parsed = parse_response(sources, &response);
    tracing::debug!(
        "LLM suggested translations for {}/{} terms",
        parsed.len(),
        sources.len()
    );
    Ok(parsed)
}
