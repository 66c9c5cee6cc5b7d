use super::document::Document;
use super::layout::{GridLayout, ScreenPoint};
use super::transaction::{EditError, Selection, Transaction};
use tracing::trace;

pub trait EditingSurface {
    fn document(&self) -> &Document;

    fn selection(&self) -> Selection;

    /// Apply `tx` atomically. Observers only ever see the state before or after it.
    fn dispatch(&mut self, tx: Transaction) -> Result<(), EditError>;

    fn pos_at_coords(&self, point: ScreenPoint) -> Option<usize>;
}

#[derive(Debug, Clone)]
pub struct Editor {
    doc: Document,
    selection: Selection,
    layout: GridLayout,
    version: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            selection: Selection::cursor(1),
            layout: GridLayout::default(),
            version: 0,
        }
    }

    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Bumped once per dispatched transaction that changed text or marks.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn coords_at_pos(&self, pos: usize) -> Option<ScreenPoint> {
        self.layout.coords_at_pos(&self.doc, pos)
    }
}

impl EditingSurface for Editor {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn dispatch(&mut self, tx: Transaction) -> Result<(), EditError> {
        let applied = tx.apply(&self.doc, self.selection)?;
        if applied.changed {
            self.version += 1;
        }
        trace!(steps = tx.steps().len(), changed = applied.changed, version = self.version, "dispatched");
        self.doc = applied.doc;
        self.selection = applied.selection;
        Ok(())
    }

    fn pos_at_coords(&self, point: ScreenPoint) -> Option<usize> {
        self.layout.pos_at_coords(&self.doc, point)
    }
}
