pub mod chunk;
pub mod json_to_esm;
pub mod normalize_options;
pub mod tracing;
