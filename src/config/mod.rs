mod args;
mod types;

pub use args::Args;
pub use types::IssuanceSettings;
