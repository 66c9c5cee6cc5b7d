use super::document::{Document, Mark};
use super::locator;
use super::session::Session;
use super::surface::EditingSurface;
use super::transaction::{EditError, Selection, Transaction};
use crate::checker::DictionaryStore;
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkAction {
    Apply,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEdit {
    pub range: Range<usize>,
    pub action: MarkAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoLanguage,
    CursorOutsideText,
    EmptyToken,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(Skip),
    Checked {
        token: String,
        range: Range<usize>,
        correct: bool,
        /// `None` when the marks already agree with the dictionary.
        edit: Option<MarkEdit>,
    },
}

/// Result of one update cycle: the mark change, if any, and the selection to
/// restore afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub outcome: SyncOutcome,
    pub selection: Selection,
}

impl SyncPlan {
    pub fn edit(&self) -> Option<&MarkEdit> {
        match &self.outcome {
            SyncOutcome::Checked { edit, .. } => edit.as_ref(),
            SyncOutcome::Skipped(_) => None,
        }
    }

    /// The mark change plus the selection restore, as one transaction.
    pub fn transaction(&self) -> Option<Transaction> {
        let edit = self.edit()?;
        let tx = match edit.action {
            MarkAction::Apply => Transaction::new().add_mark(edit.range.clone(), Mark::Error),
            MarkAction::Remove => Transaction::new().remove_mark(edit.range.clone(), Mark::Error),
        };
        Some(tx.set_selection(self.selection))
    }
}

/// Plan the mark change for the word at the start of `selection`. Marks on
/// other words are left as they are.
pub fn on_document_change(
    session: &Session,
    store: &DictionaryStore,
    doc: &Document,
    selection: Selection,
) -> SyncPlan {
    let outcome = check_current_word(session, store, doc, selection);
    SyncPlan { outcome, selection }
}

fn check_current_word(
    session: &Session,
    store: &DictionaryStore,
    doc: &Document,
    selection: Selection,
) -> SyncOutcome {
    let Some(language) = session.active_language(store) else {
        return SyncOutcome::Skipped(Skip::NoLanguage);
    };
    let Some(resolved) = doc.resolve(selection.from) else {
        return SyncOutcome::Skipped(Skip::CursorOutsideText);
    };
    let Some(block) = doc.block(resolved.block) else {
        return SyncOutcome::Skipped(Skip::CursorOutsideText);
    };

    let text = block.text();
    let Some((span, token)) = locator::current_word(&text, resolved.parent_offset) else {
        return SyncOutcome::Skipped(Skip::EmptyToken);
    };
    if store.should_ignore(&span.slice(&text)) || store.should_ignore(&token) {
        return SyncOutcome::Skipped(Skip::Ignored);
    }

    let range = span.to_absolute(resolved.block_start);
    let correct = match store.is_correct(&token, language) {
        Ok(correct) => correct,
        // active_language() guarantees a checker
        Err(_) => return SyncOutcome::Skipped(Skip::NoLanguage),
    };

    let edit = mark_edit(doc, range.clone(), correct);
    SyncOutcome::Checked {
        token,
        range,
        correct,
        edit,
    }
}

fn mark_edit(doc: &Document, range: Range<usize>, correct: bool) -> Option<MarkEdit> {
    let needed = if correct {
        doc.has_mark(range.clone(), Mark::Error).ok()?
    } else {
        !doc.is_fully_marked(range.clone(), Mark::Error).ok()?
    };

    needed.then(|| MarkEdit {
        range,
        action: if correct {
            MarkAction::Remove
        } else {
            MarkAction::Apply
        },
    })
}

pub fn synchronize<S: EditingSurface>(
    surface: &mut S,
    session: &Session,
    store: &DictionaryStore,
) -> Result<SyncPlan, EditError> {
    let plan = on_document_change(session, store, surface.document(), surface.selection());

    match &plan.outcome {
        SyncOutcome::Skipped(reason) => debug!(?reason, "spellcheck skipped"),
        SyncOutcome::Checked {
            token,
            correct,
            edit,
            ..
        } => debug!(%token, correct, changed = edit.is_some(), "spellcheck"),
    }

    if let Some(tx) = plan.transaction() {
        surface.dispatch(tx)?;
    }
    Ok(plan)
}
