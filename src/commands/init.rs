use crate::args::InitArgs;
use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the ledger home directory and an initial `config.json`.
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of data directory, e.g. `$HOME/gofinances`
/// - `args` - The namespace and locale to configure.
///
/// # Errors
/// - Returns an error if the home is already initialized or any file operation fails.
pub async fn init(ledger_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(ledger_home, args.namespace(), args.locale()).await?;
    Ok(format!(
        "Successfully created the ledger home at {}",
        config.root().display()
    )
    .into())
}
