mod stream;
mod table;

pub use stream::{ScanError, Token, TokenStream};
pub use table::{LexError, LexRule, LexTable, WHITESPACE, WHITESPACE_PATTERN};

// longest unconsumed-input preview carried by a scan failure
pub const PREVIEW_LEN: usize = 50;
