pub mod action;
pub mod answer;
pub mod edit;
pub mod loaders;
pub mod paragraph;

pub use action::{ActionKind, ActionRecord, SecondaryAction};
pub use answer::{flatten_answers, AnswerEntry, AnswerInput, FlatAnswer};
pub use edit::{EditOperation, TextStylePatch};
pub use loaders::{load_answers_file, load_format_config};
pub use paragraph::{
    BulletInfo, DocumentStructure, OutlineNode, ParagraphRecord, QuestionKind, RawParagraph,
};
