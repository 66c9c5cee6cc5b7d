use crate::checker::DictionaryStore;
use crate::editor::{locator, overlay};
use crate::editor::{
    handle_context_menu, synchronize, EditError, EditingSurface, Editor, Listeners, Mark,
    OverlayController, OverlayRequest, PointerTarget, Session, Transaction,
};
use crate::SpellError;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Feed `text` into the editor one grapheme at a time, running the mark
/// synchronizer after every update like a live editor would.
/// Returns the number of update cycles.
pub fn type_text(
    editor: &mut Editor,
    session: &Session,
    store: &DictionaryStore,
    text: &str,
) -> Result<usize, EditError> {
    let mut cycles = 0;
    for grapheme in text.graphemes(true) {
        let at = editor.selection().from;
        let tx = match grapheme {
            "\n" | "\r\n" => Transaction::new().split_block(at),
            "\r" => continue,
            _ => Transaction::new().insert_text(at, grapheme),
        };
        editor.dispatch(tx)?;
        synchronize(editor, session, store)?;
        cycles += 1;
    }
    debug!(cycles, "replay finished");
    Ok(cycles)
}

/// Every flagged run, with suggestions from the active language.
pub fn collect_errors(editor: &Editor, session: &Session, store: &DictionaryStore) -> Vec<SpellError> {
    let doc = editor.document();
    let language = session.active_language(store);

    doc.marked_nodes(Mark::Error)
        .into_iter()
        .map(|node| {
            let suggestions = language
                .and_then(|language| {
                    store
                        .suggest(&locator::suggestion_query(&node.text), language)
                        .ok()
                })
                .unwrap_or_default();
            let (line, column) = doc
                .resolve(node.start)
                .map_or((1, 1), |resolved| (resolved.block + 1, resolved.parent_offset + 1));
            SpellError {
                word: node.text,
                line,
                column,
                start: node.start,
                end: node.end,
                suggestions,
            }
        })
        .collect()
}

/// Walk the flagged runs in order, opening the suggestion overlay over each
/// one the way a secondary click would. `pick` chooses a candidate or skips.
/// Returns the number of replacements.
pub fn fix_with<F>(
    editor: &mut Editor,
    session: &Session,
    store: &DictionaryStore,
    mut pick: F,
) -> Result<usize, EditError>
where
    F: FnMut(&OverlayRequest) -> Option<String>,
{
    let mut controller = OverlayController::new();
    let mut listeners = Listeners::new();
    let mut from = 0;
    let mut fixed = 0;

    loop {
        let next = editor
            .document()
            .marked_nodes(Mark::Error)
            .into_iter()
            .find(|node| node.start >= from);
        let Some(node) = next else {
            break;
        };
        from = node.end;

        let Some(at) = editor.coords_at_pos(node.start) else {
            continue;
        };
        if !handle_context_menu(&*editor, &mut controller, &mut listeners, session, store, at) {
            continue;
        }

        let choice = controller
            .current()
            .and_then(|overlay| pick(overlay.request()));
        match choice {
            Some(choice) => {
                if overlay::choose(editor, &mut controller, &mut listeners, &choice)? {
                    from = node.start + choice.chars().count();
                    fixed += 1;
                } else {
                    controller.pointer_down(&mut listeners, PointerTarget::Elsewhere);
                }
            }
            None => {
                controller.pointer_down(&mut listeners, PointerTarget::Elsewhere);
            }
        }
    }

    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(words: &str) -> (Session, DictionaryStore) {
        let mut store = DictionaryStore::new();
        store.load_wordlist("en", words).unwrap();
        let mut session = Session::new();
        session.dictionaries_loaded(&store, "en");
        (session, store)
    }

    #[test]
    fn test_typing_flags_misspelled_words() {
        let (session, store) = ready("the\nquick\nfox\njumps");
        let mut editor = Editor::default();
        type_text(&mut editor, &session, &store, "the quikc fox\njumsp over").unwrap();

        assert_eq!(editor.document().text(), "the quikc fox\njumsp over");
        let words: Vec<String> = collect_errors(&editor, &session, &store)
            .into_iter()
            .map(|e| e.word)
            .collect();
        assert_eq!(words, vec!["quikc", "jumsp", "over"]);
    }

    #[test]
    fn test_correct_prefixes_are_unflagged() {
        let (session, store) = ready("the\nthere");
        let mut editor = Editor::default();
        type_text(&mut editor, &session, &store, "there").unwrap();
        assert!(collect_errors(&editor, &session, &store).is_empty());
    }

    #[test]
    fn test_fix_with_first_candidate() {
        let (session, store) = ready("the\nquick\nfox\njumps");
        let mut editor = Editor::default();
        type_text(&mut editor, &session, &store, "the quikc fox jumsp").unwrap();

        let fixed = fix_with(&mut editor, &session, &store, |request| {
            request.suggestions.first().cloned()
        })
        .unwrap();

        assert_eq!(fixed, 2);
        assert_eq!(editor.document().text(), "the quick fox jumps");
        assert!(collect_errors(&editor, &session, &store).is_empty());
    }

    #[test]
    fn test_fix_skips_when_declined() {
        let (session, store) = ready("the");
        let mut editor = Editor::default();
        type_text(&mut editor, &session, &store, "the qwerty").unwrap();

        let fixed = fix_with(&mut editor, &session, &store, |_| None).unwrap();
        assert_eq!(fixed, 0);
        assert_eq!(collect_errors(&editor, &session, &store).len(), 1);
    }

    #[test]
    fn test_report_positions_are_block_local() {
        let (session, store) = ready("the\nfox");
        let mut editor = Editor::default();
        type_text(&mut editor, &session, &store, "the fox\nthe qwerty,").unwrap();

        let errors = collect_errors(&editor, &session, &store);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].word, "qwerty,");
        assert_eq!((errors[0].line, errors[0].column), (2, 5));
        assert_eq!(errors[0].start, 14);
    }

    #[test]
    fn test_report_suggestions_ignore_punctuation() {
        let (session, store) = ready("the\nfox");
        let mut editor = Editor::default();
        type_text(&mut editor, &session, &store, "the fxo,").unwrap();

        let errors = collect_errors(&editor, &session, &store);
        assert_eq!(errors[0].word, "fxo,");
        assert!(errors[0].suggestions.contains(&"fox".to_string()));
    }
}
