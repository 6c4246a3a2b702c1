pub mod condition;
pub mod defaults;
pub mod env;
pub mod error;
pub mod locate;
pub mod project;
pub mod resolve;
pub mod settings;
pub mod tree;
pub mod version;

pub use error::{Error, Result};
pub use project::{ProjectDetails, ProjectIdentity, ProjectSettings, SettingsResolver};
pub use settings::{CompilerSettings, SettingKey};
