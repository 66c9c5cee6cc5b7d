pub mod document;
pub mod layout;
pub mod locator;
pub mod overlay;
pub mod session;
pub mod surface;
pub mod sync;
pub mod transaction;

pub use document::{Block, Document, Mark, Run, TextNode};
pub use layout::{GridLayout, ScreenPoint};
pub use overlay::{
    handle_context_menu, on_pointer_action, Listeners, OverlayController, OverlayRequest,
    PointerOutcome, PointerTarget,
};
pub use session::{Session, UiState};
pub use surface::{EditingSurface, Editor};
pub use sync::{on_document_change, synchronize, MarkAction, MarkEdit, SyncOutcome, SyncPlan};
pub use transaction::{EditError, Selection, Transaction};
