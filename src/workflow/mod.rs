pub mod update_flow;

pub use update_flow::UpdateFlow;
