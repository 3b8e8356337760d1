pub mod practice;

pub use practice::{PracticeSession, RunConfig, SessionEvent};
