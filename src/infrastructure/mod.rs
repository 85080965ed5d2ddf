pub mod dom_executor;

pub use dom_executor::{DomExecutor, ElementProbe, FrameWait, SelectOutcome};
