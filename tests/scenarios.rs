use livespell::editor::overlay::choose;
use livespell::editor::{
    handle_context_menu, synchronize, EditingSurface, Editor, Listeners, Mark, OverlayController,
    PointerTarget, Selection, Session, SyncOutcome, Transaction,
};
use livespell::{Checker, Config, Document, DictionaryStore};
use livespell::config::{DictionaryFormat, DictionarySource};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

/// Flags "qwerty" and offers fixed candidates for it.
struct FixedChecker;

impl Checker for FixedChecker {
    fn is_correct(&self, word: &str) -> bool {
        word != "qwerty"
    }

    fn suggest(&self, word: &str, limit: usize) -> Vec<String> {
        if word == "qwerty" {
            vec!["query".to_string(), "quarry".to_string()]
                .into_iter()
                .take(limit)
                .collect()
        } else {
            Vec::new()
        }
    }
}

fn english() -> (Session, DictionaryStore) {
    let mut store = DictionaryStore::new();
    store.register("en", Box::new(FixedChecker));
    let mut session = Session::new();
    assert!(session.dictionaries_loaded(&store, "en"));
    (session, store)
}

fn editor_at(text: &str, pos: usize) -> Editor {
    let mut editor = Editor::new(Document::from_text(text));
    editor
        .dispatch(Transaction::new().set_selection(Selection::cursor(pos)))
        .unwrap();
    editor
}

fn block_relative(editor: &Editor) -> Vec<(String, usize, usize)> {
    let doc = editor.document();
    doc.marked_nodes(Mark::Error)
        .into_iter()
        .map(|node| {
            let start = doc.resolve(node.start).unwrap().block_start;
            (node.text, node.start - start, node.end - start)
        })
        .collect()
}

#[test]
fn scenario_a_flags_current_word() {
    let (session, store) = english();
    // inside "qwerty"
    let mut editor = editor_at("The qwerty fox", 8);

    synchronize(&mut editor, &session, &store).unwrap();

    assert_eq!(block_relative(&editor), vec![("qwerty".to_string(), 4, 10)]);
    assert_eq!(editor.selection(), Selection::cursor(8));
}

#[test]
fn scenario_b_other_words_are_left_alone() {
    let (session, store) = english();
    let mut editor = editor_at("The qwerty fox", 8);
    synchronize(&mut editor, &session, &store).unwrap();

    editor
        .dispatch(Transaction::new().set_selection(Selection::cursor(14)))
        .unwrap();
    let plan = synchronize(&mut editor, &session, &store).unwrap();

    match plan.outcome {
        SyncOutcome::Checked {
            token, correct, edit, ..
        } => {
            assert_eq!(token, "fox");
            assert!(correct);
            assert!(edit.is_none());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(block_relative(&editor), vec![("qwerty".to_string(), 4, 10)]);
}

#[test]
fn scenario_c_overlay_replaces_flagged_run() {
    let (session, store) = english();
    let mut editor = editor_at("The qwerty fox", 8);
    synchronize(&mut editor, &session, &store).unwrap();

    let mut host = Listeners::new();
    let mut controller = OverlayController::new();
    let at = editor.coords_at_pos(7).unwrap();

    assert!(handle_context_menu(&editor, &mut controller, &mut host, &session, &store, at));
    let overlay = controller.current().unwrap();
    assert_eq!(overlay.candidates(), ["query", "quarry"]);
    assert_eq!(overlay.position(), at);
    assert_eq!(overlay.request().range, 5..11);

    assert!(choose(&mut editor, &mut controller, &mut host, "query").unwrap());
    assert_eq!(editor.document().text(), "The query fox");
    assert!(!controller.is_mounted());
    assert_eq!(host.active_count(), 0);
}

#[test]
fn scenario_d_plain_text_keeps_default_menu() {
    let (session, store) = english();
    let editor = editor_at("The qwerty fox", 8);

    let mut host = Listeners::new();
    let mut controller = OverlayController::new();
    let at = editor.coords_at_pos(12).unwrap();

    assert!(!handle_context_menu(&editor, &mut controller, &mut host, &session, &store, at));
    assert!(!controller.is_mounted());
    assert_eq!(host.active_count(), 0);
}

#[tokio::test]
async fn scenario_e_failed_language_is_a_noop() {
    let dir = tempdir().unwrap();
    let en = dir.path().join("en.txt");
    fs::write(&en, "the\nfox\n").unwrap();

    let mut dictionaries = BTreeMap::new();
    dictionaries.insert(
        "en".to_string(),
        DictionarySource {
            aff: String::new(),
            dic: en.display().to_string(),
            format: DictionaryFormat::Wordlist,
        },
    );
    dictionaries.insert(
        "fr".to_string(),
        DictionarySource {
            aff: dir.path().join("fr.aff").display().to_string(),
            dic: dir.path().join("fr.dic").display().to_string(),
            format: DictionaryFormat::Hunspell,
        },
    );
    let config = Config {
        dictionaries,
        cache: Some(false),
        ..Default::default()
    };

    let mut store = DictionaryStore::from_config(&config).unwrap();
    let report = livespell::dict::manager::load_dictionaries(&config, &mut store).await;
    assert_eq!(report.loaded, vec!["en".to_string()]);
    assert!(!store.contains("fr"));

    let mut session = Session::new();
    assert!(session.dictionaries_loaded(&store, "en"));
    assert!(session.select_language("fr"));

    let mut editor = editor_at("le renard qwerty", 14);
    let plan = synchronize(&mut editor, &session, &store).unwrap();
    assert_eq!(
        plan.outcome,
        SyncOutcome::Skipped(livespell::editor::sync::Skip::NoLanguage)
    );
    assert_eq!(editor.version(), 0);
}

#[test]
fn repeated_cycles_do_not_mutate() {
    let (session, store) = english();
    let mut editor = editor_at("The qwerty fox", 8);

    synchronize(&mut editor, &session, &store).unwrap();
    let version = editor.version();
    let doc = editor.document().clone();

    synchronize(&mut editor, &session, &store).unwrap();
    assert_eq!(editor.version(), version);
    assert_eq!(editor.document(), &doc);
}

#[test]
fn apply_then_remove_restores_document() {
    let mut editor = editor_at("The qwerty fox", 8);
    let original = editor.document().clone();

    editor
        .dispatch(Transaction::new().add_mark(5..11, Mark::Error))
        .unwrap();
    editor
        .dispatch(Transaction::new().remove_mark(5..11, Mark::Error))
        .unwrap();

    assert_eq!(editor.document(), &original);
}

#[test]
fn overlay_is_a_singleton() {
    let (session, store) = english();
    let mut editor = editor_at("qwerty and qwerty", 1);
    synchronize(&mut editor, &session, &store).unwrap();
    editor
        .dispatch(Transaction::new().set_selection(Selection::cursor(18)))
        .unwrap();
    synchronize(&mut editor, &session, &store).unwrap();
    assert_eq!(editor.document().marked_nodes(Mark::Error).len(), 2);

    let mut host = Listeners::new();
    let mut controller = OverlayController::new();
    let first = editor.coords_at_pos(2).unwrap();
    let second = editor.coords_at_pos(14).unwrap();

    assert!(handle_context_menu(&editor, &mut controller, &mut host, &session, &store, first));
    assert!(handle_context_menu(&editor, &mut controller, &mut host, &session, &store, second));

    assert_eq!(host.active_count(), 1);
    assert_eq!(controller.current().unwrap().request().range, 12..18);

    controller.pointer_down(&mut host, PointerTarget::Elsewhere);
    assert_eq!(host.active_count(), 0);
    assert_eq!(editor.document().text(), "qwerty and qwerty");
}
