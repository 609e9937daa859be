mod common;

use common::{chunks_registering, code, generate};
use hyperpack::{BundlerOptions, DynamicImportBoundary, ManifestChunkKind, MANIFEST_FILENAME};

#[tokio::test]
async fn import_cycle_is_a_warning() {
  let output = generate(
    &[
      ("src/main.js", "import { a } from './a.js';\nconsole.log(a());"),
      ("src/a.js", "import { b } from './b.js';\nexport const a = () => b();"),
      ("src/b.js", "import { a } from './a.js';\nexport const b = () => typeof a;"),
    ],
    BundlerOptions::default(),
  )
  .await;

  assert_eq!(output.warnings.len(), 1);
  assert_eq!(
    output.warnings[0].to_string(),
    "Circular dependency: src/a.js -> src/b.js -> src/a.js."
  );
  assert_eq!(chunks_registering(&output, "src/a.js"), vec!["main.js"]);
  assert_eq!(chunks_registering(&output, "src/b.js"), vec!["main.js"]);
}

#[tokio::test]
async fn unused_export_is_omitted() {
  let output = generate(
    &[
      ("src/main.js", "import { foo } from './b.js';\nconsole.log(foo);"),
      ("src/b.js", "export const foo = 'foo-value';\nexport const bar = 'bar-value';"),
    ],
    BundlerOptions::default(),
  )
  .await;

  let main = code(&output, "main.js");
  assert!(main.contains("const foo = 'foo-value';"), "{main}");
  assert!(!main.contains("bar-value"), "{main}");
  assert!(main.contains("\"foo\": () => foo"), "{main}");
  assert!(main.contains("var __hp_m0 = __hp.require(\"src/b.js\");"), "{main}");
  assert!(main.contains("console.log(__hp_m0.foo);"), "{main}");
  assert!(!main.contains("import "), "{main}");
}

const DYNAMIC: &[(&str, &str)] = &[
  ("src/main.js", "import { x } from './x.js';\nimport { y } from './y.js';\nconsole.log(x(), y());"),
  ("src/x.js", "export const x = () => import('./c.js');"),
  ("src/y.js", "export const y = () => import('./c.js');"),
  ("src/c.js", "export const c = 'c-value';"),
];

#[tokio::test]
async fn dynamic_import_from_two_modules_of_one_chunk_gets_one_chunk() {
  let output = generate(DYNAMIC, BundlerOptions::default()).await;

  let c_chunks = chunks_registering(&output, "src/c.js");
  assert_eq!(c_chunks.len(), 1);
  let c_chunk = &c_chunks[0];
  assert_ne!(c_chunk, "main.js");

  let main = code(&output, "main.js");
  let load = format!("__hp.load([{c_chunk:?}]).then(() => __hp.require(\"src/c.js\"))");
  assert_eq!(main.matches(&load).count(), 2, "{main}");
  assert!(code(&output, c_chunk).starts_with("(function () {\n\"use strict\";\nvar __hp = globalThis.__hyperpack__;\n"));

  let chunk = output.manifest.chunks.iter().find(|chunk| &chunk.file == c_chunk).unwrap();
  assert_eq!(chunk.kind, ManifestChunkKind::DynamicEntry);
  assert_eq!(output.manifest.chunks[0].dynamic_imports, vec![c_chunk.clone()]);
}

const DYNAMIC_FROM_TWO_CHUNKS: &[(&str, &str)] = &[
  ("src/x.js", "import('./c.js').then(({ c }) => console.log('x', c));"),
  ("src/y.js", "import('./c.js').then(({ c }) => console.log('y', c));"),
  ("src/c.js", "export const c = 'c-value';"),
];

fn x_and_y() -> BundlerOptions {
  BundlerOptions {
    entry_points: Some(vec!["src/x.js".into(), "src/y.js".into()]),
    ..BundlerOptions::default()
  }
}

#[tokio::test]
async fn dynamic_import_from_two_chunks_is_hoisted_not_duplicated() {
  let output =
    generate(DYNAMIC_FROM_TWO_CHUNKS, BundlerOptions { duplication_threshold: Some(2), ..x_and_y() }).await;

  let c_chunks = chunks_registering(&output, "src/c.js");
  assert_eq!(c_chunks.len(), 1);
  let c_chunk = &c_chunks[0];
  let load = format!("__hp.load([{c_chunk:?}]).then(() => __hp.require(\"src/c.js\"))");
  for importer in ["x.js", "y.js"] {
    assert!(code(&output, importer).contains(&load), "{}", code(&output, importer));
    let chunk = output.manifest.chunks.iter().find(|chunk| chunk.file == importer).unwrap();
    assert_eq!(chunk.dynamic_imports, vec![c_chunk.clone()]);
  }
}

#[tokio::test]
async fn dynamic_import_below_the_duplication_threshold_is_inlined() {
  let output =
    generate(DYNAMIC_FROM_TWO_CHUNKS, BundlerOptions { duplication_threshold: Some(3), ..x_and_y() }).await;

  assert_eq!(chunks_registering(&output, "src/c.js"), vec!["x.js", "y.js"]);
  for importer in ["x.js", "y.js"] {
    let code = code(&output, importer);
    assert!(code.contains("__hp.load([]).then(() => __hp.require(\"src/c.js\"))"), "{code}");
  }
  assert_eq!(output.manifest.chunks.len(), 2);
}

#[tokio::test]
async fn never_boundary_keeps_dynamic_imports_in_the_importer_chunk() {
  let output = generate(
    DYNAMIC,
    BundlerOptions {
      dynamic_import_boundary: Some(DynamicImportBoundary::Never),
      ..BundlerOptions::default()
    },
  )
  .await;

  let filenames = output.assets.iter().map(|asset| asset.filename.as_str()).collect::<Vec<_>>();
  assert_eq!(filenames, vec!["main.js", MANIFEST_FILENAME]);
  let main = code(&output, "main.js");
  assert!(main.contains("__hp.register(\"src/c.js\""), "{main}");
  assert!(main.contains("__hp.load([]).then(() => __hp.require(\"src/c.js\"))"), "{main}");
}

const SIDE_EFFECTS: &[(&str, &str)] = &[
  ("src/main.js", "import './d.js';\nimport { p } from './pure.js';\nconsole.log('main');"),
  ("src/d.js", "globalThis.touched = true;\nexport const unusedD = 'kept';"),
  ("src/pure.js", "export const p = 1;"),
];

#[tokio::test]
async fn side_effect_module_is_kept_without_used_exports() {
  let output = generate(SIDE_EFFECTS, BundlerOptions::default()).await;

  let main = code(&output, "main.js");
  assert!(main.contains("globalThis.touched = true;"), "{main}");
  assert!(main.contains("const unusedD = 'kept';"), "{main}");
  assert!(main.contains("__hp.require(\"src/d.js\")"), "{main}");
  assert!(chunks_registering(&output, "src/pure.js").is_empty());
  assert!(!main.contains("src/pure.js"), "{main}");
}

#[tokio::test]
async fn side_effect_module_is_dropped_when_retention_is_off() {
  let output = generate(
    SIDE_EFFECTS,
    BundlerOptions { retain_side_effect_modules: Some(false), ..BundlerOptions::default() },
  )
  .await;

  let main = code(&output, "main.js");
  assert!(!main.contains("touched"), "{main}");
  assert!(chunks_registering(&output, "src/d.js").is_empty());
}

#[tokio::test]
async fn every_symbol_survives_when_every_export_is_used() {
  let output = generate(
    &[(
      "src/main.js",
      "export const a = 1;\nexport function b() { return a; }\nexport default class C {}\nexport { a as alias };",
    )],
    BundlerOptions::default(),
  )
  .await;

  let main = code(&output, "main.js");
  for expected in [
    "const a = 1;",
    "function b() { return a; }",
    "class C {}",
    "\"a\": () => a",
    "\"b\": () => b",
    "\"default\": () => C",
    "\"alias\": () => a",
  ] {
    assert!(main.contains(expected), "missing {expected:?} in {main}");
  }
  assert!(!main.contains("export "), "{main}");
  assert!(main.trim_end().ends_with("__hp.require(\"src/main.js\");\n})();"), "{main}");
}

#[tokio::test]
async fn import_references_are_rewritten() {
  let output = generate(
    &[
      (
        "src/main.js",
        "import answer, { f } from './lib.js';\nimport * as ns from './lib.js';\nimport React from 'react';\nf();\nconsole.log({ f }, answer, ns, React);",
      ),
      ("src/lib.js", "export const f = () => 1;\nexport default 40 + 2"),
    ],
    BundlerOptions::default(),
  )
  .await;

  let main = code(&output, "main.js");
  for expected in [
    "var __hp_m2 = __hp.external(\"react\");",
    "(0, __hp_m0.f)();",
    "console.log({ f: __hp_m0.f }, __hp_m0.default, __hp_m1, __hp_m2.default);",
    "var __hp_default = 40 + 2;",
    "\"default\": () => __hp_default",
  ] {
    assert!(main.contains(expected), "missing {expected:?} in {main}");
  }
}

#[tokio::test]
async fn anonymous_default_declaration_is_bound() {
  let output = generate(
    &[
      ("src/main.js", "import run from './run.js';\nrun();"),
      ("src/run.js", "export default function () { return 1; }"),
    ],
    BundlerOptions::default(),
  )
  .await;

  let main = code(&output, "main.js");
  assert!(main.contains("var __hp_default = function () { return 1; };"), "{main}");
  assert!(main.contains("(0, __hp_m0.default)();"), "{main}");
}

#[tokio::test]
async fn re_exports_and_star_exports() {
  let output = generate(
    &[
      ("src/main.js", "import { a, s } from './re.js';\nconsole.log(a, s);"),
      ("src/re.js", "export { a } from './a.js';\nexport * from './star.js';"),
      ("src/a.js", "export const a = 'a-value';\nexport const dead = 'dead-value';"),
      ("src/star.js", "export const s = 's-value';"),
    ],
    BundlerOptions::default(),
  )
  .await;

  let main = code(&output, "main.js");
  assert!(main.contains("\"a\": () => __hp_m0.a"), "{main}");
  assert!(main.contains("__hp.star(__hp_exports, __hp_m1);"), "{main}");
  assert!(main.contains("s-value"), "{main}");
  assert!(!main.contains("dead-value"), "{main}");
}

#[tokio::test]
async fn shared_modules_are_loaded_before_the_entry_runs() {
  let output = generate(
    &[
      ("src/a.js", "import { s } from './shared.js';\nconsole.log('a', s);"),
      ("src/b.js", "import { s } from './shared.js';\nconsole.log('b', s);"),
      ("src/shared.js", "export const s = 'shared';"),
    ],
    BundlerOptions {
      entry_points: Some(vec!["src/a.js".into(), "src/b.js".into()]),
      ..BundlerOptions::default()
    },
  )
  .await;

  let shared = chunks_registering(&output, "src/shared.js");
  assert_eq!(shared.len(), 1);
  assert!(shared[0].starts_with("shared-"));
  for (entry, slot) in [("a.js", "src/a.js"), ("b.js", "src/b.js")] {
    let entry_code = code(&output, entry);
    let bootstrap = format!("__hp.load([{:?}]).then(() => __hp.require({slot:?}));", shared[0]);
    assert!(entry_code.contains(&bootstrap), "{entry_code}");
    assert!(entry_code.contains("globalThis.__hyperpack__ || (globalThis.__hyperpack__ ="));
  }
  assert_eq!(output.manifest.entries["a"], "a.js");
  assert_eq!(output.manifest.chunks[2].kind, ManifestChunkKind::Common);
}

#[tokio::test]
async fn output_is_deterministic() {
  let files = [
    ("src/main.js", "import { x } from './x.js';\nimport { s } from './s.js';\nconsole.log(x(), s);"),
    ("src/x.js", "import { s } from './s.js';\nexport const x = () => import('./c.js').then(() => s);"),
    ("src/c.js", "import { s } from './s.js';\nexport const c = s;"),
    ("src/s.js", "export const s = 'shared';"),
  ];
  let first = generate(&files, BundlerOptions::default()).await;
  for _ in 0..5 {
    let again = generate(&files, BundlerOptions::default()).await;
    assert_eq!(first.assets, again.assets);
    assert_eq!(first.manifest, again.manifest);
  }
}

#[tokio::test]
async fn minified_chunks_keep_the_registry() {
  let files = [
    ("src/main.js", "import { foo } from './b.js';\nconsole.log(foo);"),
    ("src/b.js", "export const foo = 'foo-value';"),
  ];
  let plain = generate(&files, BundlerOptions::default()).await;
  let minified = generate(&files, BundlerOptions { minify: Some(true), ..BundlerOptions::default() }).await;

  let plain = code(&plain, "main.js");
  let minified = code(&minified, "main.js");
  assert!(minified.len() < plain.len());
  assert!(minified.contains("__hyperpack__"), "{minified}");
  assert!(minified.contains("src/b.js"), "{minified}");
  assert!(minified.contains("foo-value"), "{minified}");
}

#[tokio::test]
async fn typed_superset_is_lowered() {
  let output = generate(
    &[
      ("src/main.ts", "import type { T } from './t';\nimport { n } from './n';\nconst v: T = n;\nconsole.log(v);"),
      ("src/t.ts", "export type T = number;"),
      ("src/n.ts", "export const n: number = 1;"),
    ],
    BundlerOptions {
      entry_points: Some(vec!["src/main.ts".into()]),
      dialect: Some(hyperpack::Dialect::TypedSuperset),
      ..BundlerOptions::default()
    },
  )
  .await;

  let main = code(&output, "main.js");
  assert!(main.contains("const n = 1;"), "{main}");
  assert!(!main.contains(": number"), "{main}");
  assert!(chunks_registering(&output, "src/t.ts").is_empty());
}

#[tokio::test]
async fn json_modules_are_tree_shaken_by_key() {
  let output = generate(
    &[
      (
        "src/main.js",
        "import { name } from './package.json';\nimport config from './config.json';\nconsole.log(name, config);",
      ),
      ("src/package.json", "{\"name\": \"app\", \"version\": \"1.0.0\"}"),
      ("src/config.json", "{\"debug\": true, \"log-level\": \"info\"}"),
    ],
    BundlerOptions::default(),
  )
  .await;

  assert_eq!(chunks_registering(&output, "src/package.json"), vec!["main.js"]);
  let main = code(&output, "main.js");
  assert!(main.contains("const name = \"app\";"), "{main}");
  assert!(!main.contains("1.0.0"), "{main}");
  assert!(main.contains("const debug = true;"), "{main}");
  assert!(main.contains("{debug, \"log-level\": \"info\"}"), "{main}");
}
