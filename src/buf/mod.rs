//! Byte arenas: the sliding-window buffer underneath the parsers and its
//! write-side inverse used to validate and reconstruct sequences.

pub mod decoder;
pub mod parser_buf;
pub mod types;

pub use decoder::{DecoderBuffer, DecoderConfig};
pub use parser_buf::{BufConfig, ParserBuffer};
pub use types::{GB, KB, MB, TAIL_MARGIN};
