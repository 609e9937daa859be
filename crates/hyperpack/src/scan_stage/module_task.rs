use std::{path::Path, sync::Arc};

use arcstr::ArcStr;
use hyperpack_common::{
  Dialect, EcmaView, ExternalModule, Module, ModuleId, ModuleIdx, ModuleLoaderMsg,
  NormalModule, NormalModuleTaskResult, RawImportRecord, ResolvedId, ResolvedKind, WasmModule,
};
use hyperpack_ecmascript::{EcmaAst, EcmaCompiler};
use hyperpack_error::{BuildDiagnostic, BuildResult, ImportChain, ResolutionError};
use hyperpack_plugin::{HookLoadArgs, HookOutcome, HookResolveArgs, HookTransformArgs};
use hyperpack_utils::{path_ext::PathExt, sanitize_file_name::sanitize_file_name};
use oxc::span::SourceType;
use oxc_index::IndexVec;

use crate::utils::json_to_esm::json_to_esm;

use super::{
  ast_scanner::{AstScanner, ScanResult},
  task_context::TaskContext,
};

pub struct ModuleTask {
  ctx: Arc<TaskContext>,
  idx: ModuleIdx,
  resolved_id: ResolvedId,
  is_user_defined_entry: bool,
  /// Modules from the entry down to the importer of this one.
  importer_chain: ImportChain,
}

struct ModuleTaskOutput {
  result: NormalModuleTaskResult,
  children: Vec<ModuleTask>,
}

impl ModuleTask {
  pub fn new(
    ctx: Arc<TaskContext>,
    idx: ModuleIdx,
    resolved_id: ResolvedId,
    is_user_defined_entry: bool,
    importer_chain: ImportChain,
  ) -> Self {
    Self { ctx, idx, resolved_id, is_user_defined_entry, importer_chain }
  }

  pub fn run(self) -> impl std::future::Future<Output = ()> + Send {
    async move {
      if self.ctx.cancel.is_cancelled() {
        return;
      }

      let chain = self.importer_chain.extend(&self.resolved_id.debug_id(&self.ctx.options.cwd));
      match self.run_inner(&chain) {
        Ok(ModuleTaskOutput { result, children }) => {
          // The parent result must reach the loader before any child result, otherwise the
          // loader could count zero remaining tasks while children are still running.
          if self.ctx.tx.send(ModuleLoaderMsg::NormalModuleDone(result)).await.is_err() {
            return;
          }
          for child in children {
            tokio::spawn(child.run());
          }
        }
        Err(errs) => {
          let errs = errs.0.into_iter().map(|err| err.with_chain(&chain)).collect();
          let _ = self.ctx.tx.send(ModuleLoaderMsg::BuildErrors(errs)).await;
        }
      }
    }
  }

  fn run_inner(&self, chain: &ImportChain) -> BuildResult<ModuleTaskOutput> {
    let id = ModuleId::new(ArcStr::clone(&self.resolved_id.id));
    let stable_id = id.stabilize(&self.ctx.options.cwd);
    tracing::debug!(module = %stable_id, "loading");

    if matches!(self.resolved_id.kind, ResolvedKind::Wasm) {
      let module = self.load_wasm()?;
      return Ok(ModuleTaskOutput {
        result: NormalModuleTaskResult {
          module,
          externals: vec![],
          spawned: 0,
          warnings: vec![],
        },
        children: vec![],
      });
    }

    let mut source = self.load_source(&stable_id)?;
    if Path::new(&*id).extension().is_some_and(|ext| ext == "json") {
      source = json_to_esm(&stable_id, &source)?.into();
    }
    let ast = self.parse(&stable_id, source)?;
    let scoping = EcmaCompiler::scoping(&ast);
    let ScanResult { import_records, named_imports, named_exports, stmt_infos, meta, warnings } =
      AstScanner::new(&stable_id, &scoping).scan(ast.program());

    let mut externals = vec![];
    let mut children = vec![];
    let mut errors = vec![];
    let mut resolved_records = IndexVec::with_capacity(import_records.len());
    for record in import_records {
      let resolved = match self.resolve_dependency(&stable_id, &record) {
        Ok(resolved) => resolved,
        Err(err) => {
          errors.push(err);
          continue;
        }
      };

      let (idx, is_new) = self.ctx.claim(&resolved.id);
      if is_new {
        match resolved.kind {
          ResolvedKind::External => {
            externals.push(ExternalModule::new(idx, ArcStr::clone(&resolved.id)).into());
          }
          ResolvedKind::Normal | ResolvedKind::Wasm => {
            children.push(Self::new(Arc::clone(&self.ctx), idx, resolved, false, chain.clone()));
          }
        }
      }
      resolved_records.push(record.into_resolved(idx));
    }

    if !errors.is_empty() {
      return Err(errors.into());
    }

    let repr_name = sanitize_file_name(&Path::new(&*id).representative_file_name());
    let module = NormalModule {
      idx: self.idx,
      is_user_defined_entry: self.is_user_defined_entry,
      id,
      stable_id,
      repr_name,
      ecma_view: EcmaView {
        source: ArcStr::clone(ast.source()),
        import_records: resolved_records,
        named_imports,
        named_exports,
        stmt_infos,
        meta,
        used_exports: vec![],
      },
    };

    #[allow(clippy::cast_possible_truncation)]
    let spawned = children.len() as u32;
    Ok(ModuleTaskOutput {
      result: NormalModuleTaskResult { module: module.into(), externals, spawned, warnings },
      children,
    })
  }

  fn load_source(&self, stable_id: &str) -> BuildResult<ArcStr> {
    let args = HookLoadArgs { id: &self.resolved_id.id };
    if let HookOutcome::Override(source) = self.ctx.plugin_driver.load(&args)? {
      return Ok(source.into());
    }

    let source = self.ctx.fs.read_to_string(Path::new(self.resolved_id.id.as_str())).map_err(|err| {
      BuildDiagnostic::Other(anyhow::anyhow!("Could not load {stable_id}: {err}"))
    })?;
    Ok(source.into())
  }

  /// Parses in the configured dialect, then applies `on_transform`. Whenever the program was
  /// rewritten, it is printed and parsed again so spans index into `EcmaAst::source`.
  fn parse(&self, stable_id: &str, source: ArcStr) -> BuildResult<EcmaAst> {
    let source_type = match self.ctx.options.dialect {
      Dialect::Plain => SourceType::mjs(),
      Dialect::TypedSuperset => SourceType::ts(),
    };

    let mut ast = EcmaCompiler::parse(stable_id, source, source_type)?;
    let mut is_rewritten = false;
    if matches!(self.ctx.options.dialect, Dialect::TypedSuperset) {
      EcmaCompiler::strip_types(stable_id, &mut ast)?;
      is_rewritten = true;
    }

    if !self.ctx.plugin_driver.is_empty() {
      let outcome = ast.program.with_mut(|fields| {
        self.ctx.plugin_driver.transform(&mut HookTransformArgs {
          id: stable_id,
          allocator: fields.allocator,
          program: fields.program,
        })
      })?;
      is_rewritten |= outcome.is_override();
    }

    if is_rewritten {
      ast = EcmaCompiler::reparse(stable_id, &ast)?;
    }
    Ok(ast)
  }

  fn resolve_dependency(
    &self,
    stable_id: &str,
    record: &RawImportRecord,
  ) -> Result<ResolvedId, BuildDiagnostic> {
    let args = HookResolveArgs {
      specifier: &record.specifier,
      importer: Some(self.resolved_id.id.as_str()),
      kind: record.kind,
    };
    if let HookOutcome::Override(ret) = self.ctx.plugin_driver.resolve(&args)? {
      return Ok(if ret.external { ResolvedId::external(ret.id) } else { ResolvedId::normal(ret.id) });
    }

    self
      .ctx
      .resolver
      .resolve(Some(Path::new(self.resolved_id.id.as_str())), &record.specifier, false)
      .map_err(|kind| {
        ResolutionError {
          kind,
          specifier: record.specifier.to_string(),
          importer: Some(stable_id.to_string()),
          chain: ImportChain::default(),
        }
        .into()
      })
  }

  fn load_wasm(&self) -> BuildResult<Module> {
    let id = &self.resolved_id.id;
    let package = id.strip_prefix("wasm:").unwrap_or(id);
    let Some(provider) = &self.ctx.wasm_provider else {
      return Err(
        anyhow::anyhow!("Could not load {id}: no WebAssembly provider is configured").into(),
      );
    };
    let binary = provider
      .provide(package)
      .map_err(|err| err.context(format!("WebAssembly provider failed for {id}")))?;

    Ok(
      WasmModule {
        idx: self.idx,
        id: ArcStr::clone(id),
        bytes: binary.bytes,
        exports: binary.exports.iter().map(|name| name.as_str().into()).collect(),
        used_exports: vec![],
        is_included: false,
      }
      .into(),
    )
  }
}
