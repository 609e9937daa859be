mod common;

use std::{
  borrow::Cow,
  sync::{Arc, Mutex},
};

use common::{bundler, chunks_registering, code};
use hyperpack::{
  BuildDiagnostic, BundlerOptions, HookLoadArgs, HookOutcome, HookResolveArgs, HookResult,
  HookTransformArgs, Plugin, RenderedChunk, ResolveOverride,
};

#[derive(Default)]
struct CountLoads {
  ids: Mutex<Vec<String>>,
}

impl Plugin for CountLoads {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("count-loads")
  }

  fn on_load(&self, args: &HookLoadArgs<'_>) -> HookResult<String> {
    self.ids.lock().unwrap().push(args.id.to_string());
    Ok(HookOutcome::Passthrough)
  }
}

#[tokio::test]
async fn every_module_is_loaded_once() {
  let counter = Arc::new(CountLoads::default());
  let (bundler, _) = bundler(
    &[
      ("src/main.js", "import './a.js';\nimport './b.js';\nimport('./c.js');"),
      ("src/a.js", "import './c.js';\nconsole.log('a');"),
      ("src/b.js", "import './c.js';\nimport './a.js';\nconsole.log('b');"),
      ("src/c.js", "console.log('c');"),
    ],
    BundlerOptions::default(),
  );
  let mut bundler = bundler.with_plugins(vec![Arc::clone(&counter) as _]);
  bundler.generate().await.unwrap();

  let mut ids = counter.ids.lock().unwrap().clone();
  ids.sort();
  assert_eq!(
    ids,
    vec!["/project/src/a.js", "/project/src/b.js", "/project/src/c.js", "/project/src/main.js"]
  );
}

struct VirtualConfig;

impl Plugin for VirtualConfig {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("virtual-config")
  }

  fn on_resolve(&self, args: &HookResolveArgs<'_>) -> HookResult<ResolveOverride> {
    Ok(match args.specifier {
      "virtual:config" => HookOutcome::Override(ResolveOverride {
        id: arcstr::literal!("/project/virtual-config.js"),
        external: false,
      }),
      "lodash" => HookOutcome::Override(ResolveOverride { id: arcstr::literal!("lodash-es"), external: true }),
      _ => HookOutcome::Passthrough,
    })
  }

  fn on_load(&self, args: &HookLoadArgs<'_>) -> HookResult<String> {
    Ok(if args.id == "/project/virtual-config.js" {
      HookOutcome::Override("export const mode = 'virtual-mode';".to_string())
    } else {
      HookOutcome::Passthrough
    })
  }
}

#[tokio::test]
async fn resolve_and_load_overrides() {
  let (bundler, _) = bundler(
    &[("src/main.js", "import { mode } from 'virtual:config';\nimport _ from 'lodash';\nconsole.log(mode, _);")],
    BundlerOptions::default(),
  );
  let mut bundler = bundler.with_plugins(vec![Arc::new(VirtualConfig)]);
  let output = bundler.generate().await.unwrap();

  let main = code(&output, "main.js");
  assert_eq!(chunks_registering(&output, "virtual-config.js"), vec!["main.js"]);
  assert!(main.contains("const mode = 'virtual-mode';"), "{main}");
  assert!(main.contains("__hp.external(\"lodash-es\")"), "{main}");
  assert_eq!(output.manifest.registry["src/main.js"]["virtual:config"], "virtual-config.js");
  assert_eq!(output.manifest.registry["src/main.js"]["lodash"], "lodash-es");
}

struct DropDebug;

impl Plugin for DropDebug {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("drop-debug")
  }

  fn on_transform(&self, args: &mut HookTransformArgs<'_, '_>) -> HookResult<()> {
    if args.id != "src/debug.js" {
      return Ok(HookOutcome::Passthrough);
    }
    args.program.body.clear();
    Ok(HookOutcome::Override(()))
  }
}

#[tokio::test]
async fn transform_override_rewrites_the_module() {
  let (bundler, _) = bundler(
    &[("src/main.js", "import './debug.js';\nconsole.log('main');"), ("src/debug.js", "console.log('debug');")],
    BundlerOptions::default(),
  );
  let mut bundler = bundler.with_plugins(vec![Arc::new(DropDebug)]);
  let output = bundler.generate().await.unwrap();

  let main = code(&output, "main.js");
  assert!(main.contains("console.log('main');"), "{main}");
  assert!(!main.contains("console.log('debug');"), "{main}");
}

#[derive(Default)]
struct Banner {
  seen: Mutex<Vec<(String, bool, Vec<String>)>>,
}

impl Plugin for Banner {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("banner")
  }

  fn on_chunk_emit(&self, chunk: &RenderedChunk<'_>) -> HookResult<String> {
    self.seen.lock().unwrap().push((chunk.filename.to_string(), chunk.is_entry, chunk.modules.to_vec()));
    Ok(HookOutcome::Override(format!("/* built by hyperpack */\n{}", chunk.code)))
  }
}

#[tokio::test]
async fn chunk_emit_override_replaces_the_code() {
  let banner = Arc::new(Banner::default());
  let (bundler, _) = bundler(
    &[("src/main.js", "import('./lazy.js');"), ("src/lazy.js", "console.log('lazy');")],
    BundlerOptions { chunk_filenames: Some("[name].js".to_string()), ..BundlerOptions::default() },
  );
  let mut bundler = bundler.with_plugins(vec![Arc::clone(&banner) as _]);
  let output = bundler.generate().await.unwrap();

  assert!(code(&output, "main.js").starts_with("/* built by hyperpack */\n(function () {"));
  assert!(code(&output, "lazy.js").starts_with("/* built by hyperpack */\n"));
  assert_eq!(
    *banner.seen.lock().unwrap(),
    vec![
      ("main.js".to_string(), true, vec!["src/main.js".to_string()]),
      ("lazy.js".to_string(), false, vec!["src/lazy.js".to_string()]),
    ]
  );
}

#[tokio::test]
async fn chunk_emit_override_drops_the_sourcemap() {
  let (bundler, _) = bundler(
    &[("src/main.js", "console.log('main');")],
    BundlerOptions { sourcemap: Some(true), ..BundlerOptions::default() },
  );
  let mut bundler = bundler.with_plugins(vec![Arc::new(Banner::default()) as _]);
  let output = bundler.generate().await.unwrap();

  assert!(output.asset("main.js.map").is_none());
  assert_eq!(output.warnings.len(), 1);
  assert_eq!(
    output.warnings[0].to_string(),
    "A plugin replaced the code of chunk \"main\"; its source map was dropped."
  );
}

struct Broken;

impl Plugin for Broken {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("broken")
  }

  fn on_load(&self, _args: &HookLoadArgs<'_>) -> HookResult<String> {
    anyhow::bail!("disk on fire")
  }
}

#[tokio::test]
async fn plugin_failures_abort_the_build() {
  let (bundler, _) = bundler(&[("src/main.js", "console.log(1);")], BundlerOptions::default());
  let mut bundler = bundler.with_plugins(vec![Arc::new(Broken)]);

  let err = bundler.generate().await.unwrap_err();
  assert!(matches!(err[0], BuildDiagnostic::Other(_)), "{err}");
  assert!(err.to_string().contains("Plugin broken failed in on_load"), "{err}");
}
