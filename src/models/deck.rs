use serde::{Deserialize, Serialize};

/// One deck entry in the collection's `decks` JSON blob.
///
/// The field set follows the consuming application's deck format; everything
/// except `id`, `name` and `desc` is emitted as a static default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    #[serde(rename = "extendRev")]
    pub extend_rev: i64,
    pub usn: i64,
    pub collapsed: bool,
    #[serde(rename = "newToday")]
    pub new_today: (i64, i64),
    #[serde(rename = "revToday")]
    pub rev_today: (i64, i64),
    #[serde(rename = "lrnToday")]
    pub lrn_today: (i64, i64),
    #[serde(rename = "timeToday")]
    pub time_today: (i64, i64),
    #[serde(rename = "dyn")]
    pub dynamic: i64,
    #[serde(rename = "extendNew")]
    pub extend_new: i64,
    /// Option group id, resolved against the `dconf` blob.
    pub conf: i64,
    pub id: i64,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub desc: String,
}

impl Deck {
    pub fn new(id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extend_rev: 50,
            usn: 0,
            collapsed: false,
            new_today: (0, 0),
            rev_today: (0, 0),
            lrn_today: (0, 0),
            time_today: (0, 0),
            dynamic: 0,
            extend_new: 10,
            conf: 1,
            id,
            modified: 0,
            desc: description.into(),
        }
    }
}
