//! Markdown ↔ block conversion.
//!
//! Everything here is pure and synchronous. [`parse`] turns a constrained
//! Markdown subset into [`Block`]s ready for upload; [`render_block`] turns
//! blocks read back from the store into Markdown-like text.

pub mod block;
pub mod chunker;
pub mod parser;
pub mod render;
pub mod rich_text;

pub use block::{Annotations, Block, HeadingLevel, RichSpan};
pub use chunker::{chunk, MAX_BLOCK_CHARS};
pub use parser::{classify, parse, LineKind};
pub use render::{render_block, render_document};
pub use rich_text::{to_markdown, tokenize};
