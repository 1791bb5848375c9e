pub mod run_summary;

pub use run_summary::RunSummary;
