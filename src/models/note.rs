/// Tag input for a note. An inline string is stored verbatim; a list is
/// normalized so the consuming application can run substring containment
/// queries against the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tags {
    Inline(String),
    List(Vec<String>),
}

impl Tags {
    /// The string stored in the `tags` column: inline values verbatim, lists
    /// underscore-escaped, space-joined and wrapped in single spaces. An
    /// empty list stores as the empty string.
    pub fn normalized(&self) -> String {
        match self {
            Tags::Inline(s) => s.clone(),
            Tags::List(tags) => {
                if tags.is_empty() {
                    String::new()
                } else {
                    let joined = tags
                        .iter()
                        .map(|tag| tag.replace(' ', "_"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!(" {} ", joined)
                }
            }
        }
    }
}

impl Default for Tags {
    fn default() -> Self {
        Tags::List(Vec::new())
    }
}

impl From<String> for Tags {
    fn from(value: String) -> Self {
        Tags::Inline(value)
    }
}

impl From<&str> for Tags {
    fn from(value: &str) -> Self {
        Tags::Inline(value.to_string())
    }
}

impl From<Vec<String>> for Tags {
    fn from(value: Vec<String>) -> Self {
        Tags::List(value)
    }
}

impl From<Vec<&str>> for Tags {
    fn from(value: Vec<&str>) -> Self {
        Tags::List(value.into_iter().map(str::to_string).collect())
    }
}

/// One note for bulk collection construction: ordered field values plus
/// optional tags. The guid is derived from the field content when absent,
/// and the id is allocated when absent or colliding.
#[derive(Debug, Clone, Default)]
pub struct Note {
    pub id: Option<i64>,
    pub guid: Option<String>,
    pub fields: Vec<String>,
    pub tags: Tags,
}

impl Note {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            guid: None,
            fields: fields.into_iter().map(Into::into).collect(),
            tags: Tags::default(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = tags.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_tags_are_stored_verbatim() {
        let tags = Tags::from("marked   verbatim ");
        assert_eq!(tags.normalized(), "marked   verbatim ");
    }

    #[test]
    fn tag_lists_are_escaped_and_wrapped() {
        let tags = Tags::from(vec!["a", "b", "multi word"]);
        assert_eq!(tags.normalized(), " a b multi_word ");
    }

    #[test]
    fn empty_tags_store_as_empty_string() {
        assert_eq!(Tags::default().normalized(), "");
        assert_eq!(Tags::List(Vec::new()).normalized(), "");
    }
}
