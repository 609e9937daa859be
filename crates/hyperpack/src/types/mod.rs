pub mod bundle_output;
pub mod build_context;
pub mod instantiated_chunk;

use std::sync::Arc;

use hyperpack_common::{Module, ModuleIdx, NormalizedBundlerOptions};
use hyperpack_plugin::PluginDriver;
use hyperpack_resolver::Resolver;
use oxc_index::IndexVec;

pub type IndexModules = IndexVec<ModuleIdx, Module>;

pub type SharedOptions = Arc<NormalizedBundlerOptions>;
pub type SharedResolver = Arc<Resolver>;
pub type SharedPluginDriver = Arc<PluginDriver>;
