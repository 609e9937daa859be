use hyperpack_common::{
  EcmaViewMeta, EntryPoint, ExportTarget, ImportRecordIdx, ImportRecordMeta, Module, ModuleIdx,
  NormalModule, NormalizedBundlerOptions, Specifier, StmtInfoIdx,
};
use hyperpack_utils::{
  rayon::{IndexedParallelIterator, IntoParallelIterator, IntoParallelRefMutIterator, ParallelIterator},
  rstr::Rstr,
};
use oxc_index::IndexVec;
use rustc_hash::FxHashSet;

use super::determine_side_effects::determine_side_effects;
use crate::types::IndexModules;

/// Reachability of one module.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModuleUsage {
  pub included: bool,
  /// Indexed by `StmtInfoIdx`. Empty for externals and WebAssembly modules.
  pub stmts: Vec<bool>,
  /// Sorted.
  pub used_exports: Vec<Rstr>,
  pub namespace_used: bool,
  /// Import records the module must `require` at runtime, sorted.
  pub live_records: Vec<ImportRecordIdx>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageMarks {
  pub modules: IndexVec<ModuleIdx, ModuleUsage>,
}

impl UsageMarks {
  pub fn get(&self, idx: ModuleIdx) -> &ModuleUsage {
    &self.modules[idx]
  }
}

/// What a module learns about itself from other modules during one round.
enum Mark {
  Include,
  Namespace,
  Export(Rstr),
}

#[derive(Debug, Default)]
struct Inbound {
  include: bool,
  namespace: bool,
  exports: Vec<Rstr>,
}

impl Inbound {
  fn is_empty(&self) -> bool {
    !self.include && !self.namespace && self.exports.is_empty()
  }

  // Every mark implies inclusion.
  fn merge(&mut self, mark: Mark) {
    self.include = true;
    match mark {
      Mark::Include => {}
      Mark::Namespace => self.namespace = true,
      Mark::Export(name) => self.exports.push(name),
    }
  }
}

#[derive(Debug, Default)]
struct ModuleState {
  included: bool,
  namespace_used: bool,
  stmts: Vec<bool>,
  used_exports: FxHashSet<Rstr>,
  used_names: FxHashSet<Rstr>,
  live_records: FxHashSet<ImportRecordIdx>,
}

struct Context<'a> {
  modules: &'a IndexModules,
  side_effects: IndexVec<ModuleIdx, bool>,
  /// Names each module provides, `export *` included.
  provided: IndexVec<ModuleIdx, FxHashSet<Rstr>>,
  retain_side_effect_modules: bool,
}

/// Computes which modules, statements and exports are reachable from the entries and from
/// `retainExports`. The graph is only read, so running it on an already annotated graph
/// gives the same marks.
pub fn compute_usage_marks(
  modules: &IndexModules,
  entry_points: &[EntryPoint],
  options: &NormalizedBundlerOptions,
) -> UsageMarks {
  let ctx = Context {
    modules,
    side_effects: determine_side_effects(modules),
    provided: modules
      .iter()
      .map(|module| match module {
        Module::Normal(module) => module.exported_names(modules).into_iter().cloned().collect(),
        Module::Wasm(module) => module.exports.iter().cloned().collect(),
        Module::External(_) => FxHashSet::default(),
      })
      .collect(),
    retain_side_effect_modules: options.retain_side_effect_modules,
  };

  let empty_inbound = || modules.iter().map(|_| Inbound::default()).collect::<IndexVec<ModuleIdx, _>>();
  let mut pending = empty_inbound();
  for entry in entry_points {
    pending[entry.idx].merge(Mark::Namespace);
  }
  for (module_path, names) in &options.retain_exports {
    if let Some(module) = modules.iter().find(|module| module.stable_id() == module_path) {
      let inbound = &mut pending[module.idx()];
      inbound.merge(Mark::Include);
      inbound.exports.extend(names.iter().map(|name| Rstr::new(name)));
    }
  }

  let mut states = modules
    .iter()
    .map(|module| ModuleState {
      stmts: vec![false; module.as_normal().map_or(0, |module| module.stmt_infos.len())],
      ..ModuleState::default()
    })
    .collect::<IndexVec<ModuleIdx, _>>();

  let mut rounds = 0u32;
  while pending.iter().any(|inbound| !inbound.is_empty()) {
    rounds += 1;
    let work = std::mem::replace(&mut pending, empty_inbound());
    // Modules only touch their own state, marks for others are merged after the round.
    let outbound = states
      .raw
      .par_iter_mut()
      .zip(work.raw.into_par_iter())
      .enumerate()
      .map(|(idx, (state, inbound))| mark_module(&ctx, ModuleIdx::new(idx), state, inbound))
      .collect::<Vec<_>>();
    for (target, mark) in outbound.into_iter().flatten() {
      pending[target].merge(mark);
    }
  }
  tracing::trace!(rounds, "usage marks settled");

  UsageMarks {
    modules: states
      .into_iter()
      .map(|state| {
        let mut used_exports = state.used_exports.into_iter().collect::<Vec<_>>();
        used_exports.sort_unstable();
        let mut live_records = state.live_records.into_iter().collect::<Vec<_>>();
        live_records.sort_unstable();
        ModuleUsage {
          included: state.included,
          stmts: state.stmts,
          used_exports,
          namespace_used: state.namespace_used,
          live_records,
        }
      })
      .collect(),
  }
}

/// Writes `marks` into the modules: inclusion, statement inclusion, used exports and live
/// import records.
pub fn apply_usage_marks(modules: &mut IndexModules, marks: &UsageMarks) {
  for (module, usage) in modules.iter_mut().zip(marks.modules.iter()) {
    module.set_included(usage.included);
    match module {
      Module::Normal(module) => {
        module.meta.set(EcmaViewMeta::NAMESPACE_USED, usage.namespace_used);
        for (stmt, is_included) in module.stmt_infos.iter_mut().zip(&usage.stmts) {
          stmt.is_included = *is_included;
        }
        module.used_exports.clone_from(&usage.used_exports);
        for (record_id, record) in module.import_records.iter_mut_enumerated() {
          record.meta.set(ImportRecordMeta::IS_LIVE, usage.live_records.binary_search(&record_id).is_ok());
        }
      }
      Module::Wasm(module) => module.used_exports.clone_from(&usage.used_exports),
      Module::External(_) => {}
    }
  }
}

fn mark_module(
  ctx: &Context<'_>,
  idx: ModuleIdx,
  state: &mut ModuleState,
  inbound: Inbound,
) -> Vec<(ModuleIdx, Mark)> {
  if inbound.is_empty() {
    return vec![];
  }

  match &ctx.modules[idx] {
    Module::Normal(module) => {
      let mut marker = Marker { ctx, module, state, names: vec![], outbound: vec![] };
      marker.run(inbound);
      marker.outbound
    }
    Module::Wasm(module) => {
      state.included = true;
      if inbound.namespace {
        state.namespace_used = true;
        state.used_exports.extend(module.exports.iter().cloned());
      }
      state.used_exports.extend(inbound.exports.into_iter().filter(|name| module.exports.contains(name)));
      vec![]
    }
    Module::External(_) => {
      state.included = true;
      state.namespace_used |= inbound.namespace;
      state.used_exports.extend(inbound.exports);
      vec![]
    }
  }
}

struct Marker<'a, 'ctx> {
  ctx: &'a Context<'ctx>,
  module: &'a NormalModule,
  state: &'a mut ModuleState,
  /// Local names waiting to be marked used.
  names: Vec<Rstr>,
  outbound: Vec<(ModuleIdx, Mark)>,
}

impl Marker<'_, '_> {
  fn run(&mut self, inbound: Inbound) {
    if !self.state.included {
      self.include_module();
    }
    if inbound.namespace && !self.state.namespace_used {
      self.state.namespace_used = true;
      let names = self.ctx.provided[self.module.idx].iter().cloned().collect::<Vec<_>>();
      for name in names {
        self.use_export(name);
      }
    }
    for name in inbound.exports {
      self.use_export(name);
    }

    while let Some(name) = self.names.pop() {
      self.use_name(name);
    }
  }

  fn include_module(&mut self) {
    self.state.included = true;
    let module = self.module;

    let keep_all = self.ctx.retain_side_effect_modules && module.meta.has_side_effects();
    for (stmt_idx, stmt) in module.stmt_infos.iter_enumerated() {
      if keep_all || stmt.side_effect {
        self.include_stmt(stmt_idx);
      }
    }

    if self.ctx.retain_side_effect_modules {
      for (record_id, record) in module.import_records.iter_enumerated() {
        if record.kind.is_static() && self.ctx.side_effects[record.resolved_module()] {
          self.use_record(record_id, Mark::Include);
        }
      }
    }
  }

  fn use_export(&mut self, name: Rstr) {
    if !self.state.used_exports.insert(name.clone()) {
      return;
    }
    let module = self.module;

    if let Some(binding) = module.named_exports.get(&name) {
      match &binding.target {
        ExportTarget::Local(local) => self.names.push(local.clone()),
        ExportTarget::ReExport { record_id, imported } => {
          self.use_record(*record_id, specifier_mark(imported));
        }
      }
      return;
    }

    // `export *` never forwards `default`.
    if name.as_str() == "default" {
      return;
    }
    let provider = module
      .star_export_records()
      .find(|(_, target)| self.ctx.provided[*target].contains(name.as_str()))
      .or_else(|| {
        module.star_export_records().find(|(_, target)| self.ctx.modules[*target].is_external())
      });
    if let Some((record_id, _)) = provider {
      self.use_record(record_id, Mark::Export(name));
    }
  }

  fn use_name(&mut self, name: Rstr) {
    if !self.state.used_names.insert(name.clone()) {
      return;
    }
    let module = self.module;

    if let Some(import) = module.named_imports.get(&name) {
      self.use_record(import.record_id, specifier_mark(&import.imported));
      return;
    }
    for stmt_idx in module.stmt_infos.declared_stmts_by_name(&name) {
      self.include_stmt(*stmt_idx);
    }
  }

  fn include_stmt(&mut self, stmt_idx: StmtInfoIdx) {
    if self.state.stmts[stmt_idx.index()] {
      return;
    }
    self.state.stmts[stmt_idx.index()] = true;

    let stmt = &self.module.stmt_infos[stmt_idx];
    self.names.extend(stmt.referenced_names.iter().cloned());
    for site in &stmt.dynamic_imports {
      self.use_record(site.record_id, Mark::Namespace);
    }
  }

  fn use_record(&mut self, record_id: ImportRecordIdx, mark: Mark) {
    self.state.live_records.insert(record_id);
    let target = self.module.import_records[record_id].resolved_module();
    self.outbound.push((target, mark));
  }
}

fn specifier_mark(specifier: &Specifier) -> Mark {
  match specifier {
    Specifier::Star => Mark::Namespace,
    Specifier::Literal(name) => Mark::Export(name.clone()),
  }
}

#[cfg(test)]
mod tests {
  use hyperpack_common::BundlerOptions;
  use proptest::prelude::*;

  use super::*;
  use crate::test_utils::{find_module, graph_files, scan};

  fn usage<'a>(modules: &IndexModules, marks: &'a UsageMarks, stable_id: &str) -> &'a ModuleUsage {
    marks.get(find_module(modules, stable_id).idx())
  }

  #[tokio::test]
  async fn unused_exports_are_dropped() {
    let (output, options) = scan(
      &[
        ("src/main.js", "import { foo } from './b.js';\nconsole.log(foo);"),
        ("src/b.js", "export const foo = 1;\nexport const bar = 2;"),
      ],
      BundlerOptions::default(),
    )
    .await
    .unwrap();

    let marks = compute_usage_marks(&output.modules, &output.entry_points, &options);
    let b = usage(&output.modules, &marks, "src/b.js");
    assert!(b.included);
    assert_eq!(b.used_exports, vec![Rstr::new("foo")]);
    assert_eq!(b.stmts, vec![true, false]);
    assert_eq!(usage(&output.modules, &marks, "src/main.js").live_records.len(), 1);
  }

  #[tokio::test]
  async fn side_effect_modules_are_kept_whole() {
    let files = [
      ("src/main.js", "import './d.js';\nexport const main = 1;"),
      ("src/d.js", "console.log('d');\nexport const unused = 1;"),
    ];

    let (output, options) = scan(&files, BundlerOptions::default()).await.unwrap();
    let marks = compute_usage_marks(&output.modules, &output.entry_points, &options);
    let d = usage(&output.modules, &marks, "src/d.js");
    assert!(d.included);
    assert_eq!(d.stmts, vec![true, true]);
    assert!(d.used_exports.is_empty());

    let (output, options) = scan(
      &files,
      BundlerOptions { retain_side_effect_modules: Some(false), ..BundlerOptions::default() },
    )
    .await
    .unwrap();
    let marks = compute_usage_marks(&output.modules, &output.entry_points, &options);
    assert!(!usage(&output.modules, &marks, "src/d.js").included);
  }

  #[tokio::test]
  async fn re_export_chains() {
    let (output, options) = scan(
      &[
        ("src/main.js", "import { a, s } from './re.js';\nconsole.log(a, s);"),
        ("src/re.js", "export { a } from './a.js';\nexport * from './star.js';\nexport * from './other.js';"),
        ("src/a.js", "export const a = 1;\nexport const b = 2;"),
        ("src/star.js", "export const s = 1;\nexport const t = 2;"),
        ("src/other.js", "export const o = 1;"),
      ],
      BundlerOptions::default(),
    )
    .await
    .unwrap();

    let marks = compute_usage_marks(&output.modules, &output.entry_points, &options);
    assert_eq!(usage(&output.modules, &marks, "src/a.js").used_exports, vec![Rstr::new("a")]);
    assert_eq!(usage(&output.modules, &marks, "src/star.js").used_exports, vec![Rstr::new("s")]);
    assert!(!usage(&output.modules, &marks, "src/other.js").included);
    assert_eq!(
      usage(&output.modules, &marks, "src/re.js").used_exports,
      vec![Rstr::new("a"), Rstr::new("s")]
    );
  }

  #[tokio::test]
  async fn namespaces_and_dynamic_imports_use_every_export() {
    let (output, options) = scan(
      &[
        ("src/main.js", "import * as ns from './b.js';\nconsole.log(ns);\nimport('./c.js');"),
        ("src/b.js", "export const x = 1;\nexport default function () {}"),
        ("src/c.js", "export const y = 1;\nexport const z = 2;"),
      ],
      BundlerOptions::default(),
    )
    .await
    .unwrap();

    let marks = compute_usage_marks(&output.modules, &output.entry_points, &options);
    let b = usage(&output.modules, &marks, "src/b.js");
    assert!(b.namespace_used);
    assert_eq!(b.used_exports, vec![Rstr::new("default"), Rstr::new("x")]);
    let c = usage(&output.modules, &marks, "src/c.js");
    assert!(c.namespace_used);
    assert_eq!(c.stmts, vec![true, true]);
  }

  #[tokio::test]
  async fn retained_exports_are_seeds() {
    let mut retain_exports = hyperpack_utils::indexmap::FxIndexMap::default();
    retain_exports.insert("src/b.js".to_string(), vec!["bar".to_string()]);
    let (output, options) = scan(
      &[
        ("src/main.js", "import { foo } from './b.js';\nconsole.log(foo);"),
        ("src/b.js", "export const foo = 1;\nexport const bar = 2;"),
      ],
      BundlerOptions { retain_exports: Some(retain_exports), ..BundlerOptions::default() },
    )
    .await
    .unwrap();

    let marks = compute_usage_marks(&output.modules, &output.entry_points, &options);
    let b = usage(&output.modules, &marks, "src/b.js");
    assert_eq!(b.used_exports, vec![Rstr::new("bar"), Rstr::new("foo")]);
    assert_eq!(b.stmts, vec![true, true]);
  }

  #[tokio::test]
  async fn marks_are_idempotent_on_cycles() {
    let (mut output, options) = scan(
      &[
        ("src/main.js", "import { b } from './b.js';\nexport const a = () => b();"),
        ("src/b.js", "import { a } from './main.js';\nexport const b = () => a;\nexport const dead = 1;"),
      ],
      BundlerOptions::default(),
    )
    .await
    .unwrap();

    let first = compute_usage_marks(&output.modules, &output.entry_points, &options);
    apply_usage_marks(&mut output.modules, &first);
    let second = compute_usage_marks(&output.modules, &output.entry_points, &options);
    assert_eq!(first, second);
    assert_eq!(usage(&output.modules, &first, "src/b.js").used_exports, vec![Rstr::new("b")]);

    let b = find_module(&output.modules, "src/b.js").as_normal().unwrap();
    assert!(b.import_records.iter().all(|record| record.is_live()));
    assert!(!b.stmt_infos.iter().any(|stmt| stmt.declared_names.contains(&Rstr::new("dead")) && stmt.is_included));
  }

  fn random_graph() -> impl Strategy<Value = Vec<(String, String)>> {
    (1usize..8).prop_flat_map(|n| {
      proptest::collection::vec((0..n, 0..n, any::<bool>(), any::<bool>()), 0..n * 2)
        .prop_map(move |edges| graph_files(n, &edges))
    })
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn marks_are_a_fixed_point(files in random_graph()) {
      let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
      let (first, second) = runtime.block_on(async {
        let files = files.iter().map(|(path, source)| (path.as_str(), source.as_str())).collect::<Vec<_>>();
        let options = BundlerOptions {
          entry_points: Some(vec!["src/m0.js".into()]),
          ..BundlerOptions::default()
        };
        let (mut output, options) = scan(&files, options).await.unwrap();
        let first = compute_usage_marks(&output.modules, &output.entry_points, &options);
        apply_usage_marks(&mut output.modules, &first);
        let second = compute_usage_marks(&output.modules, &output.entry_points, &options);
        (first, second)
      });
      prop_assert_eq!(first, second);
    }
  }
}
