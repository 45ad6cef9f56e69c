//! Terminal-multiplexer environment detection and paste delivery.
//!
//! Covers sessions running inside a guest OS layer (Linux-in-Windows)
//! under a terminal multiplexer that does not expose standard focus/paste
//! primitives.

pub mod detect;
pub mod paste;
pub mod types;

pub use detect::{
    GUEST_KERNEL_INFO_PATH, MULTIPLEXER_PROCESS_NAMES, MultiplexerAdapter, TERMINAL_CONTEXT_TTL,
};
pub use paste::{MULTIPLEXER_PASTE_CHORD, STANDARD_PASTE_CHORD};
pub use types::TerminalContext;
