pub mod selector;
pub mod summary;

pub use selector::WordSelector;
pub use summary::PracticeSummary;
