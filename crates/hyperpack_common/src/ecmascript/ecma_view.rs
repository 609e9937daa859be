use arcstr::ArcStr;
use bitflags::bitflags;
use hyperpack_utils::{indexmap::FxIndexMap, rstr::Rstr};
use oxc_index::IndexVec;

use crate::{ExportBinding, ImportRecordIdx, NamedImport, ResolvedImportRecord, StmtInfos};

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct EcmaViewMeta: u8 {
        const INCLUDED = 1;
        const HAS_STAR_EXPORT = 1 << 1;
        /// Any top-level statement has observable effects.
        const HAS_SIDE_EFFECTS = 1 << 2;
        /// The namespace object escapes (`import * as ns` used as a value, dynamic import).
        const NAMESPACE_USED = 1 << 3;
    }
}

impl EcmaViewMeta {
  #[inline]
  pub fn is_included(&self) -> bool {
    self.contains(Self::INCLUDED)
  }

  #[inline]
  pub fn has_star_export(&self) -> bool {
    self.contains(Self::HAS_STAR_EXPORT)
  }

  #[inline]
  pub fn has_side_effects(&self) -> bool {
    self.contains(Self::HAS_SIDE_EFFECTS)
  }
}

#[derive(Debug, Clone)]
pub struct EcmaView {
  /// The source the spans below point into. For lowered or transformed modules this is the
  /// printed output, not the file contents.
  pub source: ArcStr,
  pub import_records: IndexVec<ImportRecordIdx, ResolvedImportRecord>,
  /// Keyed by local name.
  pub named_imports: FxIndexMap<Rstr, NamedImport>,
  /// Keyed by exported name. `export *` is kept in `import_records` only.
  pub named_exports: FxIndexMap<Rstr, ExportBinding>,
  pub stmt_infos: StmtInfos,
  pub meta: EcmaViewMeta,
  /// Filled by the tree-shaker, sorted.
  pub used_exports: Vec<Rstr>,
}
