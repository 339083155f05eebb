pub mod capture;
pub mod clipboard;
pub mod commands;
pub mod history;
pub mod session;
pub mod shortcuts;

pub use capture::CaptureBindings;
pub use clipboard::{Clipboard, PASTE_OFFSET};
pub use commands::{ChangeKind, Command, MERGE_WINDOW, MetaPatch};
pub use history::{CommandManager, DEFAULT_MAX_HISTORY, HistoryState};
pub use session::Session;
pub use shortcuts::{ShortcutAction, ShortcutMap};
