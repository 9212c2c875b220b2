mod settings;

pub use settings::{
    AuthConfig, CompletionConfig, PublicSettings, SearchConfig, ServerConfig, Settings,
};
