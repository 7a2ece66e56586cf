//! `newcontributor`: permanent admin accounts for tutorial authors

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;
use zeroize::Zeroize;

use crate::domain::gitea::{AccessToken, CreateAccessTokenOption, CreateUserOption, EditUserOption};
use crate::domain::{DomainError, GiteaClient};

use super::context::Context;
use super::error::CliError;
use super::ContributorArgs;

pub const ACCESS_TOKEN_NAME: &str = "newcontributor-created access token";

const PASSWORD_BYTES: usize = 32;

pub async fn run(context: &Context, args: ContributorArgs) -> Result<(), CliError> {
    let admin = context.admin_client()?;
    let user_client = |username: &str, password: &str| -> Arc<dyn GiteaClient> {
        Arc::new(admin.with_credentials(username, password))
    };

    let token = create_contributor(&admin, user_client, &args).await?;
    let json = serde_json::to_string(&token)
        .map_err(|e| DomainError::internal(format!("failed to encode access token: {}", e)))?;
    println!("{}", json);

    Ok(())
}

/// Create and promote the account as admin, then mint a token as the new user
pub async fn create_contributor<F>(
    admin: &dyn GiteaClient,
    user_client: F,
    args: &ContributorArgs,
) -> Result<AccessToken, DomainError>
where
    F: FnOnce(&str, &str) -> Arc<dyn GiteaClient>,
{
    let mut password = random_password()?;

    let user = admin
        .create_user(CreateUserOption {
            username: args.username.clone(),
            email: args.email.clone(),
            password: password.clone(),
            full_name: args.fullname.clone(),
            must_change_password: false,
            send_notify: false,
        })
        .await?;
    info!(username = %user.login, "Created contributor");

    admin.edit_user(&user.login, EditUserOption::promote_to_admin(&user)).await?;

    let client = user_client(&user.login, &password);
    password.zeroize();

    client
        .create_access_token(
            &user.login,
            CreateAccessTokenOption {
                name: ACCESS_TOKEN_NAME.to_string(),
                scopes: Vec::new(),
            },
        )
        .await
}

/// Hex encoding of 32 random bytes
fn random_password() -> Result<String, DomainError> {
    let mut bytes = [0u8; PASSWORD_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| DomainError::key_generation(format!("failed to read random bytes: {}", e)))?;

    let password = hex::encode(bytes);
    bytes.zeroize();
    Ok(password)
}
