use super::document::{Document, Mark};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("position {0} is outside the document text")]
    OutOfRange(usize),

    #[error("range {0:?} crosses a block boundary")]
    CrossesBlocks(Range<usize>),

    #[error("range {0:?} ends before it starts")]
    Inverted(Range<usize>),

    #[error("inline text cannot contain line breaks")]
    MultilineText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    pub fn range(range: Range<usize>) -> Self {
        Self {
            from: range.start.min(range.end),
            to: range.start.max(range.end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    SetSelection(Selection),
    AddMark { range: Range<usize>, mark: Mark },
    RemoveMark { range: Range<usize>, mark: Mark },
    /// Typed input; continues the inclusive marks of the preceding character.
    InsertText { at: usize, text: String },
    /// Content replacement; the new text is unmarked.
    Replace { range: Range<usize>, text: String },
    SplitBlock { at: usize },
}

impl Step {
    fn changes_content(&self) -> bool {
        !matches!(self, Step::SetSelection(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    steps: Vec<Step>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn set_selection(self, selection: Selection) -> Self {
        self.step(Step::SetSelection(selection))
    }

    pub fn add_mark(self, range: Range<usize>, mark: Mark) -> Self {
        self.step(Step::AddMark { range, mark })
    }

    pub fn remove_mark(self, range: Range<usize>, mark: Mark) -> Self {
        self.step(Step::RemoveMark { range, mark })
    }

    pub fn insert_text(self, at: usize, text: &str) -> Self {
        self.step(Step::InsertText {
            at,
            text: text.to_string(),
        })
    }

    pub fn replace(self, range: Range<usize>, text: &str) -> Self {
        self.step(Step::Replace {
            range,
            text: text.to_string(),
        })
    }

    pub fn split_block(self, at: usize) -> Self {
        self.step(Step::SplitBlock { at })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step against copies of `doc` and `selection`. Nothing is
    /// written back unless all steps succeed.
    pub(crate) fn apply(
        &self,
        doc: &Document,
        selection: Selection,
    ) -> Result<Applied, EditError> {
        let mut next = doc.clone();
        let mut selection = selection;

        for step in &self.steps {
            match step {
                Step::SetSelection(sel) => {
                    for pos in [sel.from, sel.to] {
                        next.resolve(pos).ok_or(EditError::OutOfRange(pos))?;
                    }
                    selection = *sel;
                }
                Step::AddMark { range, mark } => next.add_mark(range.clone(), *mark)?,
                Step::RemoveMark { range, mark } => next.remove_mark(range.clone(), *mark)?,
                Step::InsertText { at, text } => {
                    next.insert_text(*at, text)?;
                    selection = Selection::cursor(at + text.chars().count());
                }
                Step::Replace { range, text } => {
                    next.replace(range.clone(), text)?;
                    selection = Selection::cursor(range.start + text.chars().count());
                }
                Step::SplitBlock { at } => {
                    next.split_block(*at)?;
                    // skip the closing and opening boundaries
                    selection = Selection::cursor(at + 2);
                }
            }
        }

        let changed = self.steps.iter().any(Step::changes_content) && next != *doc;
        Ok(Applied {
            doc: next,
            selection,
            changed,
        })
    }
}

pub(crate) struct Applied {
    pub doc: Document,
    pub selection: Selection,
    pub changed: bool,
}
