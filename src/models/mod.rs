pub mod deck;
pub mod note;
pub mod note_type;

pub use deck::Deck;
pub use note::{Note, Tags};
pub use note_type::{Field, NoteType, NoteTypeOptions, Template};
