use hyperpack_utils::rstr::Rstr;

use crate::{ImportRecordIdx, Specifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
  /// A top-level binding of the exporting module.
  Local(Rstr),
  /// `export { imported as exported } from '...'`, or an export list naming an import binding.
  ReExport { record_id: ImportRecordIdx, imported: Specifier },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBinding {
  pub exported: Rstr,
  pub target: ExportTarget,
}

impl ExportBinding {
  pub fn local(exported: Rstr, local: Rstr) -> Self {
    Self { exported, target: ExportTarget::Local(local) }
  }

  pub fn re_export(exported: Rstr, record_id: ImportRecordIdx, imported: Specifier) -> Self {
    Self { exported, target: ExportTarget::ReExport { record_id, imported } }
  }

  pub fn local_name(&self) -> Option<&Rstr> {
    match &self.target {
      ExportTarget::Local(local) => Some(local),
      ExportTarget::ReExport { .. } => None,
    }
  }
}
