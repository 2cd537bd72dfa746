//! Source position tracking for the Petal template compiler.
//!
//! Every node the parser produces is annotated with a [`Span`]: a half-open
//! byte range into the original template text. [`LineIndex`] converts between
//! byte offsets and line/column positions, which is how foreign-parser
//! locations (reported as line/column) are mapped back into document offsets.

mod line_index;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
