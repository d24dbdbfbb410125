//! Template and field analysis.
//!
//! Card generation is driven entirely by the question format of each
//! template. Standard models emit one card per template whose referenced
//! fields are all non-empty; cloze models derive card ordinals from the
//! numbered `{{cN::..}}` markers inside the referenced field values.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::NoteType;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static LEGACY_CLOZE_RE: OnceLock<Regex> = OnceLock::new();
static CLOZE_MARKER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{([^{}]+?)\}\}").expect("valid regex"))
}

fn legacy_cloze_re() -> &'static Regex {
    LEGACY_CLOZE_RE.get_or_init(|| Regex::new(r"<%cloze:([^%>]+?)%>").expect("valid regex"))
}

fn cloze_marker_re() -> &'static Regex {
    CLOZE_MARKER_RE.get_or_init(|| Regex::new(r"\{\{c(\d+)::").expect("valid regex"))
}

/// Field names referenced by a question format: `{{Field}}`, filtered forms
/// like `{{type:Field}}` and `{{hint:Field}}`, and section markers
/// `{{#Field}}` / `{{/Field}}`. `FrontSide` is rendering state, not a field.
pub(crate) fn field_refs(format: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for cap in placeholder_re().captures_iter(format) {
        let inner = cap[1].trim();
        let name = match inner.chars().next() {
            Some('#') | Some('/') | Some('^') => inner[1..].trim(),
            _ => inner.rsplit(':').next().unwrap_or(inner).trim(),
        };
        if name.is_empty() || name == "FrontSide" {
            continue;
        }
        if !refs.iter().any(|r| r == name) {
            refs.push(name.to_string());
        }
    }
    refs
}

/// Field names referenced through a cloze filter, in either the
/// `{{cloze:Field}}` form or the legacy `<%cloze:Field%>` syntax.
pub(crate) fn cloze_field_refs(format: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for cap in placeholder_re().captures_iter(format) {
        let inner = cap[1].trim();
        let mut segments: Vec<&str> = inner.split(':').map(str::trim).collect();
        let name = match segments.pop() {
            Some(name) => name,
            None => continue,
        };
        if !segments.iter().any(|s| *s == "cloze") || name.is_empty() {
            continue;
        }
        if !refs.iter().any(|r| r == name) {
            refs.push(name.to_string());
        }
    }
    for cap in legacy_cloze_re().captures_iter(format) {
        let name = cap[1].trim();
        if !name.is_empty() && !refs.iter().any(|r| r == name) {
            refs.push(name.to_string());
        }
    }
    refs
}

/// Card ordinals implied by the `{{cN::..}}` markers in one field value:
/// `N-1` for every `N >= 1` found.
pub(crate) fn cloze_ordinals(value: &str) -> BTreeSet<i64> {
    let mut ordinals = BTreeSet::new();
    for cap in cloze_marker_re().captures_iter(value) {
        let n: i64 = cap[1].parse().unwrap_or(0);
        if n >= 1 {
            ordinals.insert(n - 1);
        }
    }
    ordinals
}

/// Expand one note's field values into the card ordinals to emit.
///
/// Standard models: one card per template whose referenced fields all resolve
/// to non-empty values; an empty or unknown referenced field suppresses the
/// template without error. Cloze models: the union of cloze ordinals across
/// the fields referenced by the first template, defaulting to a single card
/// with ordinal 0 when no markers are present.
pub(crate) fn card_ordinals(note_type: &NoteType, values: &[String]) -> Vec<i64> {
    let position = |name: &str| note_type.flds.iter().position(|f| f.name == name);

    if note_type.is_cloze() {
        let mut ordinals = BTreeSet::new();
        if let Some(template) = note_type.tmpls.first() {
            for name in cloze_field_refs(&template.qfmt) {
                if let Some(pos) = position(&name) {
                    if let Some(value) = values.get(pos) {
                        ordinals.extend(cloze_ordinals(value));
                    }
                }
            }
        }
        if ordinals.is_empty() {
            vec![0]
        } else {
            ordinals.into_iter().collect()
        }
    } else {
        let mut out = Vec::new();
        'templates: for (index, template) in note_type.tmpls.iter().enumerate() {
            for name in field_refs(&template.qfmt) {
                let filled = position(&name)
                    .and_then(|pos| values.get(pos))
                    .map(|value| !value.is_empty())
                    .unwrap_or(false);
                if !filled {
                    continue 'templates;
                }
            }
            out.push(index as i64);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Template};

    fn standard(templates: Vec<Template>) -> NoteType {
        NoteType::new(
            1,
            "Standard",
            1,
            vec![Field::new("Front"), Field::new("Back")],
            templates,
        )
    }

    #[test]
    fn field_refs_cover_all_placeholder_forms() {
        let refs = field_refs("{{type:Front}} {{#Hint}}{{hint:Hint}}{{/Hint}} {{Back}}");
        assert_eq!(refs, vec!["Front", "Hint", "Back"]);
    }

    #[test]
    fn front_side_is_not_a_field() {
        assert!(field_refs("{{FrontSide}}").is_empty());
    }

    #[test]
    fn cloze_refs_accept_both_syntaxes() {
        assert_eq!(cloze_field_refs("{{cloze:Text}}"), vec!["Text"]);
        assert_eq!(cloze_field_refs("<%cloze:Text%>"), vec!["Text"]);
        assert!(cloze_field_refs("{{Text}}").is_empty());
    }

    #[test]
    fn cloze_markers_produce_zero_based_ordinals() {
        let ords = cloze_ordinals("{{c1::foo}} and {{c3::bar}} and {{c1::baz}}");
        assert_eq!(ords.into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert!(cloze_ordinals("no markers here").is_empty());
        assert!(cloze_ordinals("{{c0::ignored}}").is_empty());
    }

    #[test]
    fn empty_referenced_field_suppresses_template() {
        let model = standard(vec![
            Template::new("Card 1", "{{Front}}", "{{Back}}"),
            Template::new("Card 2", "{{Back}}", "{{Front}}"),
        ]);
        let values = vec!["front".to_string(), String::new()];
        assert_eq!(card_ordinals(&model, &values), vec![0]);
    }

    #[test]
    fn unknown_referenced_field_suppresses_template() {
        let model = standard(vec![Template::new("Card 1", "{{Missing}}", "{{Back}}")]);
        let values = vec!["front".to_string(), "back".to_string()];
        assert!(card_ordinals(&model, &values).is_empty());
    }

    #[test]
    fn cloze_expansion_unions_marker_ordinals() {
        let model = NoteType::new_cloze(
            1,
            "Cloze",
            1,
            vec![Field::new("Text")],
            vec![Template::new("Cloze", "{{cloze:Text}}", "{{cloze:Text}}")],
        );
        let values = vec!["{{c1::A}} {{c2::B}}".to_string()];
        assert_eq!(card_ordinals(&model, &values), vec![0, 1]);

        let plain = vec!["no markers".to_string()];
        assert_eq!(card_ordinals(&model, &plain), vec![0]);
    }
}
