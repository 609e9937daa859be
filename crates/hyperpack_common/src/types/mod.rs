pub mod entry_point;
pub mod export_binding;
pub mod import_kind;
pub mod import_record;
pub mod manifest;
pub mod module_id;
pub mod named_import;
pub mod output_asset;
pub mod raw_idx;
pub mod resolved_id;
pub mod stmt_info;
pub mod wasm;
