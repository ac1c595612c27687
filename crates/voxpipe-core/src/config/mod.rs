//! Configuration — typed schema plus file/env loader.

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config};
pub use schema::{
    Config, PipelineConfig, ProviderConfig, ProvidersConfig, ResponseConfig, ResponseModels,
    ServerConfig, SynthesisSelection, TranscriptionSelection,
};
