use hyperpack_error::{BuildDiagnostic, BuildResult};
use tokio_util::sync::CancellationToken;

/// State scoped to one build generation. Nothing in here outlives the build.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub generation: u64,
  pub cancel: CancellationToken,
}

impl BuildContext {
  pub fn new(generation: u64, cancel: CancellationToken) -> Self {
    Self { generation, cancel }
  }

  /// Returns `Cancelled` once the generation's token has been cancelled.
  pub fn check_cancelled(&self) -> BuildResult<()> {
    if self.cancel.is_cancelled() {
      return Err(BuildDiagnostic::Cancelled.into());
    }
    Ok(())
  }
}
