use crate::args::SignInArgs;
use crate::commands::Out;
use crate::model::User;
use crate::{Config, Result};

/// Signs in as the user described by `args`, replacing whoever was signed in.
pub async fn sign_in(config: &Config, args: &SignInArgs) -> Result<Out<User>> {
    let user = User::new(args.id(), args.name(), args.photo());
    config.session().sign_in(&user).await?;
    Ok(Out::new(format!("Signed in as {}", user.name), user))
}

/// Signs out the current user. The user's ledger is kept.
pub async fn sign_out(config: &Config) -> Result<Out<()>> {
    if config.session().sign_out().await? {
        Ok("Signed out".into())
    } else {
        Ok("Nobody was signed in".into())
    }
}
