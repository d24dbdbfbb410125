use serde::{Deserialize, Serialize};

/// Standard model type.
const KIND_STANDARD: i64 = 0;
/// Cloze-deletion model type.
const KIND_CLOZE: i64 = 1;

pub const DEFAULT_QUESTION_FORMAT: &str = "{{Front}}";
pub const DEFAULT_ANSWER_FORMAT: &str = "{{FrontSide}}\n\n<hr id=\"answer\">\n\n{{Back}}";
pub const DEFAULT_CSS: &str = ".card {\n font-family: arial;\n font-size: 20px;\n text-align: center;\n color: black;\n background-color: white;\n}\n";

/// A note type (model): the ordered fields and rendering templates shared by
/// a family of notes. Serializes into one entry of the collection's `models`
/// JSON blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteType {
    pub css: String,
    /// Deck that cards generated from this model are added to.
    pub did: i64,
    pub flds: Vec<Field>,
    pub id: i64,
    #[serde(rename = "latexPost")]
    pub latex_post: String,
    #[serde(rename = "latexPre")]
    pub latex_pre: String,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub name: String,
    /// Legacy card-generation requirements, kept for older importers.
    pub req: Vec<(i64, String, Vec<i64>)>,
    /// Index of the field used for sorting in the browser.
    pub sortf: i64,
    pub tags: Vec<String>,
    pub tmpls: Vec<Template>,
    /// 0 for standard models, 1 for cloze deletion.
    #[serde(rename = "type")]
    pub kind: i64,
    pub usn: i64,
    pub vers: Vec<i64>,
}

impl NoteType {
    /// Build a standard model. Field and template ordinals are assigned from
    /// their positions in the given lists.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        did: i64,
        fields: Vec<Field>,
        templates: Vec<Template>,
    ) -> Self {
        Self::with_kind(id, name, did, fields, templates, KIND_STANDARD)
    }

    /// Build a cloze-deletion model. Only the first template is consulted
    /// when cards are generated.
    pub fn new_cloze(
        id: i64,
        name: impl Into<String>,
        did: i64,
        fields: Vec<Field>,
        templates: Vec<Template>,
    ) -> Self {
        Self::with_kind(id, name, did, fields, templates, KIND_CLOZE)
    }

    fn with_kind(
        id: i64,
        name: impl Into<String>,
        did: i64,
        mut fields: Vec<Field>,
        mut templates: Vec<Template>,
        kind: i64,
    ) -> Self {
        for (ord, field) in fields.iter_mut().enumerate() {
            field.ord = ord as i64;
        }
        for (ord, template) in templates.iter_mut().enumerate() {
            template.ord = ord as i64;
        }
        Self {
            css: DEFAULT_CSS.to_string(),
            did,
            flds: fields,
            id,
            latex_post: "\\end{document}".to_string(),
            latex_pre: "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n".to_string(),
            modified: 0,
            name: name.into(),
            req: vec![(0, "all".to_string(), vec![0])],
            sortf: 0,
            tags: Vec::new(),
            tmpls: templates,
            kind,
            usn: 0,
            vers: Vec::new(),
        }
    }

    /// The two-field front/back model grafted into incremental sessions.
    pub fn basic(id: i64, name: impl Into<String>, did: i64, options: &NoteTypeOptions) -> Self {
        let mut model = Self::new(
            id,
            name,
            did,
            vec![Field::new("Front"), Field::new("Back")],
            vec![Template::new(
                "Card 1",
                &options.question_format,
                &options.answer_format,
            )],
        );
        model.css = options.css.clone();
        model
    }

    pub fn is_cloze(&self) -> bool {
        self.kind == KIND_CLOZE
    }
}

/// One field of a note type. Ordinal positions are referenced by template
/// placeholders, so field order is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub font: String,
    pub media: Vec<String>,
    pub name: String,
    pub ord: i64,
    pub rtl: bool,
    pub size: i64,
    pub sticky: bool,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            font: "Arial".to_string(),
            media: Vec::new(),
            name: name.into(),
            ord: 0,
            rtl: false,
            size: 20,
            sticky: false,
        }
    }

    pub fn rtl(mut self) -> Self {
        self.rtl = true;
        self
    }
}

/// One rendering template of a note type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Answer format.
    pub afmt: String,
    pub bafmt: String,
    pub bqfmt: String,
    /// Per-template deck override, null by default.
    pub did: Option<i64>,
    pub name: String,
    pub ord: i64,
    /// Question format; placeholders here decide whether a card is generated.
    pub qfmt: String,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        question_format: impl Into<String>,
        answer_format: impl Into<String>,
    ) -> Self {
        Self {
            afmt: answer_format.into(),
            bafmt: String::new(),
            bqfmt: String::new(),
            did: None,
            name: name.into(),
            ord: 0,
            qfmt: question_format.into(),
        }
    }
}

/// Rendering defaults applied when a session grafts its note type.
#[derive(Debug, Clone)]
pub struct NoteTypeOptions {
    pub question_format: String,
    pub answer_format: String,
    pub css: String,
}

impl Default for NoteTypeOptions {
    fn default() -> Self {
        Self {
            question_format: DEFAULT_QUESTION_FORMAT.to_string(),
            answer_format: DEFAULT_ANSWER_FORMAT.to_string(),
            css: DEFAULT_CSS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_list_positions() {
        let model = NoteType::new(
            1,
            "Vocab",
            1,
            vec![Field::new("Front"), Field::new("Back"), Field::new("Hint")],
            vec![
                Template::new("Card 1", "{{Front}}", "{{Back}}"),
                Template::new("Card 2", "{{Back}}", "{{Front}}"),
            ],
        );
        let field_ords: Vec<i64> = model.flds.iter().map(|f| f.ord).collect();
        assert_eq!(field_ords, vec![0, 1, 2]);
        let template_ords: Vec<i64> = model.tmpls.iter().map(|t| t.ord).collect();
        assert_eq!(template_ords, vec![0, 1]);
        assert!(!model.is_cloze());
    }

    #[test]
    fn model_serializes_with_wire_names() {
        let model = NoteType::new_cloze(
            7,
            "Cloze",
            1,
            vec![Field::new("Text")],
            vec![Template::new("Cloze", "{{cloze:Text}}", "{{cloze:Text}}")],
        );
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["latexPost"], "\\end{document}");
        assert_eq!(value["tmpls"][0]["did"], serde_json::Value::Null);
        assert_eq!(value["req"][0][1], "all");
    }
}
