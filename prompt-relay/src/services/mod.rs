pub mod prompt;
pub mod providers;

pub use providers::TextProvider;
