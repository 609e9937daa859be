use std::{
  ffi::OsString,
  path::{Path, PathBuf},
};

use arcstr::ArcStr;
use dashmap::DashMap;
use sugar_path::SugarPath;

use hyperpack_common::{NormalizedBundlerOptions, ResolvedId};
use hyperpack_error::ResolutionErrorKind;
use hyperpack_fs::SharedFileSystem;
use hyperpack_utils::indexmap::FxIndexMap;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
  pub cwd: PathBuf,
  /// Tried in order after the exact path.
  pub extensions: Vec<String>,
  pub aliases: FxIndexMap<String, String>,
}

impl From<&NormalizedBundlerOptions> for ResolveOptions {
  fn from(options: &NormalizedBundlerOptions) -> Self {
    Self {
      cwd: options.cwd.clone(),
      extensions: options.extensions.clone(),
      aliases: options.aliases.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
  base_dir: PathBuf,
  specifier: String,
  is_user_defined_entry: bool,
}

type ResolveResult = Result<ResolvedId, ResolutionErrorKind>;

/// Resolves specifiers for one build generation. Results, failures included, are cached
/// for the lifetime of the resolver.
pub struct Resolver {
  cwd: PathBuf,
  extensions: Vec<String>,
  /// Longest key first, declared order among equal lengths.
  aliases: Vec<(String, String)>,
  fs: SharedFileSystem,
  cache: DashMap<CacheKey, ResolveResult>,
}

impl std::fmt::Debug for Resolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Resolver")
      .field("cwd", &self.cwd)
      .field("extensions", &self.extensions)
      .field("aliases", &self.aliases)
      .finish_non_exhaustive()
  }
}

impl Resolver {
  pub fn new(options: ResolveOptions, fs: SharedFileSystem) -> Self {
    let mut aliases = options.aliases.into_iter().collect::<Vec<_>>();
    aliases.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
    Self {
      cwd: options.cwd,
      extensions: options.extensions,
      aliases,
      fs,
      cache: DashMap::default(),
    }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }

  /// Resolves `specifier` imported by `importer`. Specifiers of user-defined entries are
  /// resolved against `cwd` even when they are not written as relative paths.
  pub fn resolve(
    &self,
    importer: Option<&Path>,
    specifier: &str,
    is_user_defined_entry: bool,
  ) -> ResolveResult {
    let base_dir = importer
      .and_then(Path::parent)
      .map_or_else(|| self.cwd.clone(), Path::to_path_buf);

    let key = CacheKey { base_dir, specifier: specifier.to_string(), is_user_defined_entry };
    if let Some(cached) = self.cache.get(&key) {
      tracing::trace!(specifier, "resolver cache hit");
      return cached.clone();
    }

    let ret = self.resolve_uncached(&key.base_dir, specifier, is_user_defined_entry);
    self.cache.insert(key, ret.clone());
    ret
  }

  fn resolve_uncached(
    &self,
    base_dir: &Path,
    specifier: &str,
    is_user_defined_entry: bool,
  ) -> ResolveResult {
    if let Some(package) = specifier.strip_prefix("wasm:") {
      if package.is_empty() {
        return Err(ResolutionErrorKind::NotFound);
      }
      return Ok(ResolvedId::wasm(specifier));
    }

    if is_url(specifier) {
      return Ok(ResolvedId::external(specifier));
    }

    let mut chain = vec![specifier.to_string()];
    let mut current = specifier.to_string();
    let mut base_dir = base_dir;
    let mut is_aliased = false;

    loop {
      let treat_as_path = is_path_like(&current) || is_user_defined_entry;
      // A bare alias replacement may still name a file under `cwd`.
      if treat_as_path || is_aliased {
        if let Some(found) = self.try_path(&base_dir.join(&current))? {
          return Ok(ResolvedId::normal(&*found.to_slash_lossy()));
        }
      }

      let Some(replaced) = self.apply_alias(&current) else {
        return if treat_as_path {
          Err(ResolutionErrorKind::NotFound)
        } else {
          Ok(ResolvedId::external(ArcStr::from(current)))
        };
      };

      if chain.contains(&replaced) || chain.len() > self.aliases.len() {
        chain.push(replaced);
        return Err(ResolutionErrorKind::CyclicAlias { path: chain });
      }
      chain.push(replaced.clone());
      current = replaced;
      base_dir = self.cwd.as_path();
      is_aliased = true;
    }
  }

  fn apply_alias(&self, specifier: &str) -> Option<String> {
    self.aliases.iter().find_map(|(key, replacement)| {
      if specifier == key {
        Some(replacement.clone())
      } else {
        specifier
          .strip_prefix(key.as_str())
          .filter(|rest| rest.starts_with('/'))
          .map(|rest| format!("{replacement}{rest}"))
      }
    })
  }

  /// Exact file, then `<path><ext>`, then `<path>/index<ext>`.
  fn try_path(&self, path: &Path) -> Result<Option<PathBuf>, ResolutionErrorKind> {
    let path = path.normalize();
    if self.fs.is_file(&path) {
      return Ok(Some(path));
    }

    if let Some(found) = self.try_extensions(&path)? {
      return Ok(Some(found));
    }

    if self.fs.is_dir(&path) {
      return self.try_extensions(&path.join("index"));
    }

    Ok(None)
  }

  fn try_extensions(&self, path: &Path) -> Result<Option<PathBuf>, ResolutionErrorKind> {
    let mut candidates = self
      .extensions
      .iter()
      .map(|ext| {
        let mut candidate = OsString::from(path.as_os_str());
        candidate.push(ext);
        PathBuf::from(candidate)
      })
      .filter(|candidate| self.fs.is_file(candidate))
      .collect::<Vec<_>>();

    match candidates.len() {
      0 => Ok(None),
      1 => Ok(candidates.pop()),
      _ => Err(ResolutionErrorKind::Ambiguous {
        candidates: candidates
          .iter()
          .map(|candidate| candidate.relative(&self.cwd).to_slash_lossy().into_owned())
          .collect(),
      }),
    }
  }
}

fn is_path_like(specifier: &str) -> bool {
  specifier.starts_with("./")
    || specifier.starts_with("../")
    || specifier == "."
    || specifier == ".."
    || Path::new(specifier).is_absolute()
}

fn is_url(specifier: &str) -> bool {
  specifier.starts_with("http://")
    || specifier.starts_with("https://")
    || specifier.starts_with("//")
    || specifier.starts_with("data:")
}
