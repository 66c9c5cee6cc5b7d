use super::document::{Document, Mark};
use super::layout::ScreenPoint;
use super::locator;
use super::session::Session;
use super::surface::EditingSurface;
use super::transaction::{EditError, Transaction};
use crate::checker::DictionaryStore;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub trait ListenerHost {
    fn add_outside_click_listener(&mut self) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);
}

#[derive(Debug, Default)]
pub struct Listeners {
    next: u64,
    active: HashSet<ListenerId>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl ListenerHost for Listeners {
    fn add_outside_click_listener(&mut self) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.active.insert(id);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if !self.active.remove(&id) {
            warn!(?id, "removing unknown listener");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRequest {
    pub range: Range<usize>,
    pub word: String,
    pub suggestions: Vec<String>,
    pub at: ScreenPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    PassThrough,
    Open(OverlayRequest),
}

impl PointerOutcome {
    pub fn suppresses_default(&self) -> bool {
        matches!(self, PointerOutcome::Open(_))
    }
}

/// Decide what a secondary click at `position` (already mapped from `at`) does.
pub fn on_pointer_action(
    session: &Session,
    store: &DictionaryStore,
    doc: &Document,
    position: Option<usize>,
    at: ScreenPoint,
) -> PointerOutcome {
    let Some(pos) = position else {
        return PointerOutcome::PassThrough;
    };
    let Some(node) = doc.mark_extent(pos, Mark::Error) else {
        return PointerOutcome::PassThrough;
    };
    let Some(language) = session.active_language(store) else {
        debug!("flagged text clicked without an active language");
        return PointerOutcome::PassThrough;
    };

    let query = locator::suggestion_query(&node.text);
    let suggestions = store.suggest(&query, language).unwrap_or_default();

    PointerOutcome::Open(OverlayRequest {
        range: node.range(),
        word: node.text.clone(),
        suggestions,
        at,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Overlay,
    Elsewhere,
}

#[derive(Debug)]
pub struct Overlay {
    request: OverlayRequest,
    listener: ListenerId,
}

impl Overlay {
    pub fn request(&self) -> &OverlayRequest {
        &self.request
    }

    pub fn candidates(&self) -> &[String] {
        &self.request.suggestions
    }

    pub fn position(&self) -> ScreenPoint {
        self.request.at
    }
}

/// At most one overlay is mounted, and each mounted overlay holds exactly
/// one outside-click listener.
#[derive(Debug, Default)]
pub struct OverlayController {
    current: Option<Overlay>,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.current.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    pub fn mount<H: ListenerHost>(&mut self, host: &mut H, request: OverlayRequest) -> &Overlay {
        self.dismiss(host);
        let listener = host.add_outside_click_listener();
        debug!(word = %request.word, candidates = request.suggestions.len(), "overlay mounted");
        self.current.insert(Overlay { request, listener })
    }

    /// Pick `choice` and unmount. Returns the replacement edit, or `None`
    /// (overlay kept) when nothing is mounted or `choice` is not a candidate.
    pub fn select<H: ListenerHost>(&mut self, host: &mut H, choice: &str) -> Option<Transaction> {
        let overlay = self.current.as_ref()?;
        if !overlay.candidates().iter().any(|c| c == choice) {
            return None;
        }
        let tx = Transaction::new().replace(overlay.request.range.clone(), choice);
        self.dismiss(host);
        Some(tx)
    }

    pub fn pointer_down<H: ListenerHost>(&mut self, host: &mut H, target: PointerTarget) -> bool {
        match target {
            PointerTarget::Overlay => false,
            PointerTarget::Elsewhere => self.dismiss(host),
        }
    }

    pub fn dismiss<H: ListenerHost>(&mut self, host: &mut H) -> bool {
        match self.current.take() {
            Some(overlay) => {
                host.remove_listener(overlay.listener);
                debug!(word = %overlay.request.word, "overlay dismissed");
                true
            }
            None => false,
        }
    }
}

/// Secondary-click adapter. Returns whether the default action was suppressed.
pub fn handle_context_menu<S: EditingSurface, H: ListenerHost>(
    surface: &S,
    controller: &mut OverlayController,
    host: &mut H,
    session: &Session,
    store: &DictionaryStore,
    at: ScreenPoint,
) -> bool {
    let position = surface.pos_at_coords(at);
    match on_pointer_action(session, store, surface.document(), position, at) {
        PointerOutcome::Open(request) => {
            controller.mount(host, request);
            true
        }
        PointerOutcome::PassThrough => false,
    }
}

pub fn choose<S: EditingSurface, H: ListenerHost>(
    surface: &mut S,
    controller: &mut OverlayController,
    host: &mut H,
    choice: &str,
) -> Result<bool, EditError> {
    match controller.select(host, choice) {
        Some(tx) => {
            surface.dispatch(tx)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::surface::Editor;

    fn request(word: &str) -> OverlayRequest {
        OverlayRequest {
            range: 5..11,
            word: word.to_string(),
            suggestions: vec!["query".to_string(), "quarry".to_string()],
            at: ScreenPoint::new(10.0, 20.0),
        }
    }

    #[test]
    fn test_listener_pairs_with_mount() {
        let mut host = Listeners::new();
        let mut controller = OverlayController::new();

        controller.mount(&mut host, request("qwerty"));
        controller.mount(&mut host, request("qwerty"));
        assert_eq!(host.active_count(), 1);

        assert!(controller.pointer_down(&mut host, PointerTarget::Elsewhere));
        assert!(!controller.is_mounted());
        assert_eq!(host.active_count(), 0);
        assert!(!controller.dismiss(&mut host));
    }

    #[test]
    fn test_click_on_overlay_keeps_it() {
        let mut host = Listeners::new();
        let mut controller = OverlayController::new();
        controller.mount(&mut host, request("qwerty"));

        assert!(!controller.pointer_down(&mut host, PointerTarget::Overlay));
        assert!(controller.is_mounted());
        assert_eq!(host.active_count(), 1);
    }

    #[test]
    fn test_select_unknown_candidate() {
        let mut host = Listeners::new();
        let mut controller = OverlayController::new();
        controller.mount(&mut host, request("qwerty"));

        assert!(controller.select(&mut host, "quiche").is_none());
        assert!(controller.is_mounted());

        let tx = controller.select(&mut host, "quarry").unwrap();
        assert_eq!(tx, Transaction::new().replace(5..11, "quarry"));
        assert!(!controller.is_mounted());
        assert_eq!(host.active_count(), 0);
    }

    #[test]
    fn test_pass_through_for_boundaries_and_plain_text() {
        let mut store = DictionaryStore::new();
        store.load_wordlist("en", "the").unwrap();
        let mut session = Session::new();
        session.dictionaries_loaded(&store, "en");
        let doc = Document::from_text("The fox\nnext");
        let at = ScreenPoint::new(0.0, 0.0);

        assert_eq!(on_pointer_action(&session, &store, &doc, None, at), PointerOutcome::PassThrough);
        // closing boundary of the first block
        assert_eq!(on_pointer_action(&session, &store, &doc, Some(9), at), PointerOutcome::PassThrough);
        assert_eq!(on_pointer_action(&session, &store, &doc, Some(2), at), PointerOutcome::PassThrough);
    }

    #[test]
    fn test_choose_replaces_run() {
        let mut store = DictionaryStore::new();
        store.load_wordlist("en", "the\nfox\nfix").unwrap();
        let mut session = Session::new();
        session.dictionaries_loaded(&store, "en");

        let mut editor = Editor::new(Document::from_text("The fxo."));
        editor
            .dispatch(Transaction::new().add_mark(5..9, Mark::Error))
            .unwrap();

        let mut host = Listeners::new();
        let mut controller = OverlayController::new();
        let at = editor.coords_at_pos(6).unwrap();
        assert!(handle_context_menu(&editor, &mut controller, &mut host, &session, &store, at));

        let overlay = controller.current().unwrap();
        assert_eq!(overlay.request().word, "fxo.");
        assert!(overlay.candidates().contains(&"fox".to_string()));

        assert!(choose(&mut editor, &mut controller, &mut host, "fox").unwrap());
        assert_eq!(editor.document().text(), "The fox");
        assert!(editor.document().marked_nodes(Mark::Error).is_empty());
        assert_eq!(host.active_count(), 0);
    }

    #[test]
    fn test_partly_bold_word_opens_whole_run() {
        let mut store = DictionaryStore::new();
        store.load_wordlist("en", "the\nquery\nfox").unwrap();
        let mut session = Session::new();
        session.dictionaries_loaded(&store, "en");

        let mut editor = Editor::new(Document::from_text("The qeury fox"));
        editor
            .dispatch(
                Transaction::new()
                    .add_mark(5..10, Mark::Error)
                    .add_mark(5..7, Mark::Bold),
            )
            .unwrap();

        let mut host = Listeners::new();
        let mut controller = OverlayController::new();
        let at = editor.coords_at_pos(8).unwrap();
        assert!(handle_context_menu(&editor, &mut controller, &mut host, &session, &store, at));

        let request = controller.current().unwrap().request().clone();
        assert_eq!(request.range, 5..10);
        assert_eq!(request.word, "qeury");
        assert!(request.suggestions.contains(&"query".to_string()));

        assert!(choose(&mut editor, &mut controller, &mut host, "query").unwrap());
        assert_eq!(editor.document().text(), "The query fox");
        assert!(editor.document().marked_nodes(Mark::Error).is_empty());
    }
}
