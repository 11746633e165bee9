//! System instruction construction for the tutor.

/// Tutor persona and answer-shape policy sent with every provider call.
pub const BASE_INSTRUCTION: &str = "You are a patient QA and programming tutor for software testers. \
When the user asks for code, reply with complete, runnable code in a fenced code block first, \
then explain it in two to four short lines. \
For conceptual questions, give a short practical summary followed by concrete examples.";

/// Keyword table for language detection. Order is the tie-break: the first
/// entry whose keyword occurs in the prompt wins.
const LANGUAGE_KEYWORDS: &[(&str, &str)] = &[
    ("python", "Python"),
    ("c++", "C++"),
    ("cpp", "C++"),
    ("javascript", "JavaScript"),
    ("js", "JavaScript"),
    ("html", "HTML"),
    ("sql", "SQL"),
    ("c program", "C"),
    ("java", "Java"),
];

/// Canonical name of the first language mentioned in `prompt`.
pub fn detect_language(prompt: &str) -> Option<&'static str> {
    let lowered = prompt.to_lowercase();
    LANGUAGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, language)| *language)
}

/// Build the system instruction for `prompt`.
///
/// A caller override is placed before the base policy, never instead of it.
pub fn compose(prompt: &str, override_instruction: Option<&str>) -> String {
    let mut instruction = String::from(BASE_INSTRUCTION);

    if let Some(language) = detect_language(prompt) {
        instruction.push_str(&format!(
            "\nFocus on producing valid, idiomatic {} examples.",
            language
        ));
    }

    match override_instruction.map(str::trim).filter(|s| !s.is_empty()) {
        Some(extra) => format!("{}\n{}", extra, instruction),
        None => instruction,
    }
}
