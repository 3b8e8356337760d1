pub mod reader;
pub mod record;

pub use record::{Dataset, Selection, WordRecord};
