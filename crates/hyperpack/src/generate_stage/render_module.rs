use std::{iter, path::Path};

use hyperpack_common::{
  ChunkIdx, DEFAULT_EXPORT_LOCAL, ExportTarget, ImportRecordIdx, ImportRefKind, Module,
  NormalModule, ResolvedImportRecord, Specifier, StmtInfo, StmtKind,
};
use hyperpack_error::{BuildResult, EmitError};
use hyperpack_sourcemap::SourceJoiner;
use hyperpack_utils::{
  concat_string,
  ecmascript::{js_string_literal, property_access_str},
};
use string_wizard::{MagicString, SourceMapOptions};
use sugar_path::SugarPath;

use crate::graph::ChunkGraph;

use super::GenerateStage;

/// Local holding the exports object of the target of `record_id`.
fn record_binding(record_id: ImportRecordIdx) -> String {
  concat_string!("__hp_m", itoa::Buffer::new().format(record_id.index()))
}

fn specifier_access(binding: String, imported: &Specifier) -> String {
  match imported {
    Specifier::Star => binding,
    Specifier::Literal(name) => property_access_str(&binding, name),
  }
}

fn emit_error(module: &NormalModule, message: String) -> EmitError {
  EmitError { module: module.stable_id.clone(), message }
}

impl GenerateStage<'_> {
  /// A live record must point at an included module.
  fn live_target<'m>(
    &'m self,
    module: &NormalModule,
    record: &ResolvedImportRecord,
  ) -> BuildResult<&'m Module> {
    let target = &self.link_output.modules[record.resolved_module()];
    if !record.is_live() || !target.is_included() {
      return Err(
        emit_error(
          module,
          format!(
            "{:?} resolves to {}, which was eliminated by tree-shaking but is still referenced",
            record.specifier.as_str(),
            target.stable_id()
          ),
        )
        .into(),
      );
    }
    Ok(target)
  }

  fn render_dynamic_import(
    &self,
    chunk_graph: &ChunkGraph,
    chunk_idx: ChunkIdx,
    module: &NormalModule,
    record: &ResolvedImportRecord,
  ) -> BuildResult<String> {
    let target = self.live_target(module, record)?;
    if let Module::External(external) = target {
      return Ok(concat_string!(
        "Promise.resolve().then(() => __hp.external(",
        js_string_literal(&external.name),
        "))"
      ));
    }

    let files = self
      .providing_chunk(chunk_graph, chunk_idx, module.idx, record.resolved_module())?
      .map(|provider| {
        chunk_graph
          .static_load_order(provider)
          .into_iter()
          .chain(iter::once(provider))
          .map(|idx| js_string_literal(chunk_graph.chunk_table[idx].filename()))
          .collect::<Vec<_>>()
      })
      .unwrap_or_default();

    Ok(concat_string!(
      "__hp.load([",
      files.join(", "),
      "]).then(() => __hp.require(",
      js_string_literal(target.stable_id()),
      "))"
    ))
  }

  fn render_import_ref(
    module: &NormalModule,
    local: &str,
    kind: ImportRefKind,
  ) -> BuildResult<Option<String>> {
    let Some(import) = module.named_imports.get(local) else {
      return Ok(None);
    };
    let record = &module.import_records[import.record_id];
    if !record.is_live() {
      return Err(
        emit_error(
          module,
          format!("{local} is referenced but its import of {:?} is not live", record.specifier.as_str()),
        )
        .into(),
      );
    }

    let access = specifier_access(record_binding(import.record_id), &import.imported);
    Ok(Some(match kind {
      ImportRefKind::Plain => access,
      ImportRefKind::Callee => concat_string!("(0, ", access, ")"),
      ImportRefKind::Shorthand => concat_string!(local, ": ", access),
    }))
  }

  fn render_stmt(
    &self,
    chunk_graph: &ChunkGraph,
    chunk_idx: ChunkIdx,
    module: &NormalModule,
    stmt: &StmtInfo,
    magic_string: &mut MagicString<'_>,
  ) -> BuildResult<()> {
    let (start, end) = (stmt.span.start as usize, stmt.span.end as usize);
    if start == end {
      return Ok(());
    }
    if !stmt.is_included {
      magic_string.remove(start, end);
      return Ok(());
    }

    match stmt.kind {
      StmtKind::Import | StmtKind::ExportFrom | StmtKind::ExportList => {
        magic_string.remove(start, end);
        return Ok(());
      }
      StmtKind::ExportDeclaration { declaration_start }
      | StmtKind::ExportDefaultDeclaration { declaration_start, anonymous: false } => {
        magic_string.remove(start, declaration_start as usize);
      }
      StmtKind::ExportDefaultDeclaration { declaration_start, anonymous: true } => {
        magic_string.update(start, declaration_start as usize, concat_string!("var ", DEFAULT_EXPORT_LOCAL, " = "));
        magic_string.append_left(end, ";");
      }
      StmtKind::ExportDefaultExpression { expression_start } => {
        magic_string.update(start, expression_start as usize, concat_string!("var ", DEFAULT_EXPORT_LOCAL, " = "));
        if !module.source[..end].ends_with(';') {
          magic_string.append_left(end, ";");
        }
      }
      StmtKind::Normal => {}
    }

    for import_ref in &stmt.import_refs {
      if let Some(replacement) = Self::render_import_ref(module, &import_ref.local, import_ref.kind)? {
        magic_string.update(import_ref.span.start as usize, import_ref.span.end as usize, replacement);
      }
    }

    for site in &stmt.dynamic_imports {
      let record = &module.import_records[site.record_id];
      let replacement = self.render_dynamic_import(chunk_graph, chunk_idx, module, record)?;
      magic_string.update(site.span.start as usize, site.span.end as usize, replacement);
    }

    Ok(())
  }

  /// `__hp.define(...)` for the used exports this module declares itself. Names provided
  /// through `export *` come from `__hp.star`.
  fn render_export_getters(&self, module: &NormalModule) -> BuildResult<Option<String>> {
    let mut getters = vec![];
    for name in &module.used_exports {
      let Some(binding) = module.named_exports.get(name) else {
        continue;
      };
      let value = match &binding.target {
        ExportTarget::Local(local) => local.to_string(),
        ExportTarget::ReExport { record_id, imported } => {
          self.live_target(module, &module.import_records[*record_id])?;
          specifier_access(record_binding(*record_id), imported)
        }
      };
      getters.push(concat_string!("  ", js_string_literal(name), ": () => ", value));
    }
    if getters.is_empty() {
      return Ok(None);
    }
    Ok(Some(concat_string!("__hp.define(__hp_exports, {\n", getters.join(",\n"), "\n});\n")))
  }

  /// `sources` entry of the module in the map of a chunk. Relative to the chunk's directory
  /// so the map keeps working wherever the output is served from.
  fn sourcemap_source(&self, chunk_graph: &ChunkGraph, chunk_idx: ChunkIdx, module: &NormalModule) -> String {
    let path = Path::new(&*module.id);
    if !path.is_absolute() {
      return module.stable_id.clone();
    }
    let chunk_path = self.options.out_dir().join(chunk_graph.chunk_table[chunk_idx].filename());
    let chunk_dir = chunk_path.parent().unwrap_or(&chunk_path);
    path.relative(chunk_dir).to_slash_lossy().into_owned()
  }

  /// Wraps the module in a registry factory keyed by its slot.
  pub(super) fn render_module(
    &self,
    chunk_graph: &ChunkGraph,
    chunk_idx: ChunkIdx,
    module: &NormalModule,
    joiner: &mut SourceJoiner,
  ) -> BuildResult<()> {
    let mut code = concat_string!(
      "__hp.register(",
      js_string_literal(&module.stable_id),
      ", function (__hp_exports, __hp) {\n"
    );

    if let Some(getters) = self.render_export_getters(module)? {
      code.push_str(&getters);
    }

    for (record_id, record) in module.import_records.iter_enumerated() {
      if !record.kind.is_static() || !record.is_live() {
        continue;
      }
      let target = self.live_target(module, record)?;
      let value = match target {
        Module::External(external) => {
          concat_string!("__hp.external(", js_string_literal(&external.name), ")")
        }
        Module::Normal(_) | Module::Wasm(_) => {
          // Fails when the target was never placed in a chunk.
          self.providing_chunk(chunk_graph, chunk_idx, module.idx, record.resolved_module())?;
          concat_string!("__hp.require(", js_string_literal(target.stable_id()), ")")
        }
      };
      let binding = record_binding(record_id);
      code.push_str(&concat_string!("var ", binding, " = ", value, ";\n"));
      if record.is_export_star() {
        code.push_str(&concat_string!("__hp.star(__hp_exports, ", binding, ");\n"));
      }
    }

    let mut magic_string = MagicString::new(module.source.as_str());
    for stmt in module.stmt_infos.iter() {
      self.render_stmt(chunk_graph, chunk_idx, module, stmt, &mut magic_string)?;
    }
    joiner.append_raw(&code);

    let body = magic_string.to_string();
    let start = body.len() - body.trim_start().len();
    let end = start + body.trim().len();
    if start < end {
      let map = self.options.sourcemap.then(|| {
        magic_string.source_map(SourceMapOptions {
          include_content: true,
          source: self.sourcemap_source(chunk_graph, chunk_idx, module).into(),
          ..SourceMapOptions::default()
        })
      });
      joiner.append_mapped(&body, start..end, map.as_ref());
      joiner.append_raw("\n");
    }
    joiner.append_raw("});\n");
    Ok(())
  }
}
