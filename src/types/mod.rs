mod document;
pub use document::*;

mod filter;
pub use filter::*;
