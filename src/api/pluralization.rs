//! Resource name pluralization
//!
//! Resource kinds are lowerCamelCase (`activityType`); only the last word is
//! pluralized (`activityTypes`). English irregulars are applied first, then
//! the CRM's own override table, since the API does not always follow English
//! (`persons`, not `people`).

/// English irregular plurals, matched on the last word
const IRREGULAR_PLURALS: &[(&str, &str)] = &[("person", "people"), ("child", "children")];

/// Endpoint names that differ from the English plural
const ENTITY_NAME_OVERRIDES: &[(&str, &str)] = &[("people", "persons")];

/// Endpoint name for a resource kind
pub fn entity_name(kind_name: &str) -> String {
    let plural = pluralize(kind_name);
    ENTITY_NAME_OVERRIDES
        .iter()
        .find(|(from, _)| *from == plural)
        .map(|(_, to)| to.to_string())
        .unwrap_or(plural)
}

/// Convert a lowerCamelCase name to plural form using English grammar rules
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return name.to_string();
    }

    let (head, word) = split_last_word(name);
    let lower = word.to_lowercase();

    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(singular, _)| *singular == lower) {
        return format!("{}{}", head, match_case(word, plural));
    }

    // Words ending in 's', 'sh', 'ch', 'x', 'z' -> add 'es'
    if lower.ends_with('s') || lower.ends_with("sh") || lower.ends_with("ch") || lower.ends_with('x') || lower.ends_with('z') {
        return format!("{}es", name);
    }

    // Words ending in consonant + 'y' -> change 'y' to 'ies'
    if lower.ends_with('y') && lower.len() > 1 && !ends_with_vowel(&lower[..lower.len() - 1]) {
        return format!("{}ies", &name[..name.len() - 1]);
    }

    // Default: add 's'
    format!("{}s", name)
}

/// Split `activityType` into (`activity`, `Type`)
fn split_last_word(name: &str) -> (&str, &str) {
    match name.char_indices().rev().find(|(_, c)| c.is_uppercase()) {
        Some((idx, _)) => name.split_at(idx),
        None => ("", name),
    }
}

fn match_case(original: &str, plural: &str) -> String {
    let mut chars = plural.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(p)) if first.is_uppercase() => {
            p.to_uppercase().chain(chars).collect()
        }
        _ => plural.to_string(),
    }
}

fn ends_with_vowel(s: &str) -> bool {
    s.chars().last().is_some_and(|c| "aeiou".contains(c))
}
