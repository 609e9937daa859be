mod common;

use std::{path::Path, sync::Arc};

use common::{bundler, code, generate};
use hyperpack::{BundleOutput, Bundler, BundlerOptions, MemoryFileSystem};
use hyperpack_sourcemap::SourceMap;

fn file_of(output: &BundleOutput, name: &str) -> String {
  let chunk = output.manifest.chunks.iter().find(|chunk| chunk.name == name);
  chunk.unwrap_or_else(|| panic!("no chunk named {name}")).file.clone()
}

fn lazy_app(util: &str, deep: &str) -> Vec<(&'static str, String)> {
  vec![
    ("src/main.js", "import('./lazy.js').then(({ run }) => run());".to_string()),
    (
      "src/lazy.js",
      "import { used } from './util.js';\nexport const run = () => import('./deep.js').then(({ deep }) => deep(used));"
        .to_string(),
    ),
    ("src/util.js", util.to_string()),
    ("src/deep.js", deep.to_string()),
  ]
}

async fn build(files: &[(&'static str, String)], options: BundlerOptions) -> BundleOutput {
  let files = files.iter().map(|(path, source)| (*path, source.as_str())).collect::<Vec<_>>();
  generate(&files, options).await
}

const UTIL: &str = "export const used = 'used';\nexport const unused = 'u1';";
const DEEP: &str = "export const deep = (value) => console.log(value);";

#[tokio::test]
async fn hash_follows_the_rendered_content() {
  let base = build(&lazy_app(UTIL, DEEP), BundlerOptions::default()).await;
  let lazy = file_of(&base, "lazy");
  assert!(lazy.starts_with("lazy-") && lazy.ends_with(".js") && lazy.len() == "lazy-.js".len() + 8, "{lazy}");
  assert!(code(&base, "main.js").contains(&format!("__hp.load([{lazy:?}])")));

  // Only a tree-shaken export changed: the emitted chunk is identical.
  let shaken =
    build(&lazy_app("export const used = 'used';\nexport const unused = 'u2';", DEEP), BundlerOptions::default())
      .await;
  assert_eq!(file_of(&shaken, "lazy"), lazy);
  assert_eq!(base.assets, shaken.assets);

  let changed =
    build(&lazy_app("export const used = 'other';\nexport const unused = 'u1';", DEEP), BundlerOptions::default())
      .await;
  let changed_lazy = file_of(&changed, "lazy");
  assert_ne!(changed_lazy, lazy);
  assert_eq!(file_of(&changed, "deep"), file_of(&base, "deep"));
  assert!(code(&changed, "main.js").contains(&format!("__hp.load([{changed_lazy:?}])")));

  let minified =
    build(&lazy_app(UTIL, DEEP), BundlerOptions { minify: Some(true), ..BundlerOptions::default() }).await;
  assert_ne!(file_of(&minified, "lazy"), lazy);
}

#[tokio::test]
async fn importer_hash_changes_with_the_chunks_it_loads() {
  let options = || BundlerOptions {
    entry_filenames: Some("[name]-[hash].js".to_string()),
    ..BundlerOptions::default()
  };
  let base = build(&lazy_app(UTIL, DEEP), options()).await;
  let changed = build(&lazy_app(UTIL, "export const deep = (value) => console.warn(value);"), options()).await;

  for name in ["main", "lazy", "deep"] {
    assert_ne!(file_of(&base, name), file_of(&changed, name), "{name}");
  }
  let main = file_of(&changed, "main");
  assert_eq!(changed.manifest.entries["main"], main);
  assert!(changed.asset(&main).is_some());
}

#[tokio::test]
async fn hash_does_not_depend_on_the_project_location() {
  let build_in = |cwd: &'static str| async move {
    let fs = MemoryFileSystem::new();
    for (path, source) in lazy_app(UTIL, DEEP) {
      fs.add_file(Path::new(cwd).join(path), &source).unwrap();
    }
    let options = BundlerOptions {
      cwd: Some(cwd.into()),
      entry_points: Some(vec!["src/main.js".into()]),
      sourcemap: Some(true),
      ..BundlerOptions::default()
    };
    Bundler::new(options).with_file_system(Arc::new(fs)).generate().await.unwrap()
  };

  let first = build_in("/project").await;
  let second = build_in("/home/someone/elsewhere").await;
  assert_eq!(first.assets, second.assets);
}

#[tokio::test]
async fn hash_length_is_checked() {
  let short = build(
    &lazy_app(UTIL, DEEP),
    BundlerOptions { chunk_filenames: Some("[name].[hash:6].js".to_string()), ..BundlerOptions::default() },
  )
  .await;
  assert_eq!(file_of(&short, "lazy").len(), "lazy..js".len() + 6);

  let files = lazy_app(UTIL, DEEP);
  let files = files.iter().map(|(path, source)| (*path, source.as_str())).collect::<Vec<_>>();
  let (mut bundler, _) = bundler(
    &files,
    BundlerOptions { chunk_filenames: Some("[name].[hash:30].js".to_string()), ..BundlerOptions::default() },
  );
  let err = bundler.generate().await.unwrap_err();
  assert!(err.to_string().contains("Hash length 30"), "{err}");
  assert!(err.to_string().contains("out of range 6..=22"), "{err}");
}

const GREET: &[(&str, &str)] = &[
  ("src/main.js", "import { greet } from './lib/greet.js';\nconsole.log(greet('x'));"),
  ("src/lib/greet.js", "export function greet(name) {\n  return 'hi ' + name;\n}\nexport const unused = 1;\n"),
];

fn with_sourcemap() -> BundlerOptions {
  BundlerOptions { sourcemap: Some(true), ..BundlerOptions::default() }
}

#[tokio::test]
async fn sourcemap_is_emitted_next_to_the_chunk() {
  let output = generate(GREET, with_sourcemap()).await;

  let filenames = output.assets.iter().map(|asset| asset.filename.as_str()).collect::<Vec<_>>();
  assert_eq!(filenames, vec!["main.js", "main.js.map", "manifest.json"]);
  let main = code(&output, "main.js");
  assert!(main.ends_with("})();\n//# sourceMappingURL=main.js.map\n"), "{main}");

  let json: serde_json::Value = serde_json::from_str(code(&output, "main.js.map")).unwrap();
  assert_eq!(json["version"], 3);
  assert_eq!(json["file"], "main.js");
  assert_eq!(json["sources"], serde_json::json!(["../src/main.js", "../src/lib/greet.js"]));
  assert_eq!(json["sourcesContent"][1], GREET[1].1);

  let map = SourceMap::from_json_string(code(&output, "main.js.map")).unwrap();
  let return_line = main.lines().position(|line| line == "  return 'hi ' + name;").unwrap();
  assert!(
    map.get_tokens().any(|token| {
      token.get_dst_line() as usize == return_line
        && token.get_src_line() == 1
        && token.get_source_id().and_then(|id| map.get_source(id)) == Some("../src/lib/greet.js")
    }),
    "no mapping for line {return_line} of {main}"
  );
}

#[tokio::test]
async fn sourcemap_of_a_hashed_chunk_uses_the_final_name() {
  let files = lazy_app(UTIL, DEEP);
  let output = build(
    &files,
    BundlerOptions { chunk_filenames: Some("chunks/[name]-[hash].js".to_string()), ..with_sourcemap() },
  )
  .await;

  let lazy = file_of(&output, "lazy");
  let basename = lazy.strip_prefix("chunks/").unwrap();
  assert!(code(&output, &lazy).ends_with(&format!("//# sourceMappingURL={basename}.map\n")));

  let json: serde_json::Value = serde_json::from_str(code(&output, &format!("{lazy}.map"))).unwrap();
  assert_eq!(json["file"], basename);
  assert_eq!(json["sources"], serde_json::json!(["../../src/lazy.js", "../../src/util.js"]));
  assert!(output.assets.iter().all(|asset| !asset.content.contains("!~{")));
}

#[tokio::test]
async fn minified_output_has_no_sourcemap() {
  let output = generate(GREET, BundlerOptions { minify: Some(true), ..with_sourcemap() }).await;

  assert!(output.asset("main.js.map").is_none());
  assert!(!code(&output, "main.js").contains("sourceMappingURL"));
  assert_eq!(output.warnings.len(), 1);
  assert_eq!(output.warnings[0].to_string(), "Source maps are not generated for minified output.");
}

#[tokio::test]
async fn sourcemap_is_off_by_default() {
  let output = generate(GREET, BundlerOptions::default()).await;
  assert_eq!(output.assets.len(), 2);
  assert!(!code(&output, "main.js").contains("sourceMappingURL"));
}
