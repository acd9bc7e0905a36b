use std::fs::File;
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::error::Result;

/// Installs the global logger. Defaults to `info` unless `RUST_LOG` says
/// otherwise; with `log_path` the file is truncated and receives all output.
pub fn init(log_path: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(path) = log_path {
        let file = File::create(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
