mod bundler_options;
mod chunk;
mod ecmascript;
mod module;
mod module_loader;
mod types;

pub use bundler_options::{
  BundlerOptions, Dialect, DynamicImportBoundary, SharedChunkTieBreak,
  filename_template::FilenameTemplate, input_item::InputItem,
  normalized_bundler_options::NormalizedBundlerOptions,
};

pub use crate::{
  chunk::{Chunk, ChunkKind},
  ecmascript::ecma_view::{EcmaView, EcmaViewMeta},
  module::{
    Module, external_module::ExternalModule, normal_module::NormalModule, wasm_module::WasmModule,
  },
  module_loader::{ModuleLoaderMsg, task_result::NormalModuleTaskResult},
  types::{
    entry_point::{EntryPoint, EntryPointKind},
    export_binding::{ExportBinding, ExportTarget},
    import_kind::ImportKind,
    import_record::{ImportRecord, ImportRecordMeta, RawImportRecord, ResolvedImportRecord},
    manifest::{MANIFEST_FILENAME, Manifest, ManifestChunk, ManifestChunkKind},
    module_id::ModuleId,
    named_import::{NamedImport, Specifier},
    output_asset::OutputAsset,
    raw_idx::{ChunkIdx, ImportRecordIdx, ModuleIdx, StmtInfoIdx},
    resolved_id::{ResolvedId, ResolvedKind},
    stmt_info::{DynamicImportSite, ImportRef, ImportRefKind, StmtInfo, StmtInfos, StmtKind},
    wasm::{SharedWasmProvider, WasmBinary, WasmProvider},
  },
};

/// Local bound to `export default <expression>` inside a module factory.
pub const DEFAULT_EXPORT_LOCAL: &str = "__hp_default";
