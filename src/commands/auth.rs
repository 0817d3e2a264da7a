use clap::Args;
use colored::*;

use super::prompt::ask;
use crate::client::ApiClient;
use crate::models::RegisterRequest;
use crate::utils::errors::AppResult;

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub email: Option<String>,

    /// Prompted for when omitted
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Role id (see `fleet-admin list role`)
    #[arg(long)]
    pub role: Option<i64>,

    /// Location id (see `fleet-admin list location`)
    #[arg(long)]
    pub location: Option<i64>,
}

pub async fn login(client: &ApiClient, args: LoginArgs) -> AppResult<()> {
    let email = match args.email {
        Some(email) => email,
        None => ask("Email: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => ask("Password: ")?,
    };

    let session = client.login(&email, &password).await?;
    println!(
        "{} logged in as user {} (role {})",
        "✅".green(),
        session.user_id.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
        session.role_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())
    );
    if let Some(expiry) = session.token_expiry() {
        println!("   token valid until {}", expiry.to_rfc3339());
    }
    Ok(())
}

pub async fn register(client: &ApiClient, args: RegisterArgs) -> AppResult<()> {
    let request = RegisterRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        role: args.role,
        location: args.location,
    };
    let user = client.register(&request).await?;
    println!(
        "{} registered {} (id {})",
        "✅".green(),
        user.email.unwrap_or_default(),
        user.id.map(|id| id.to_string()).unwrap_or_else(|| "?".into())
    );
    Ok(())
}

pub async fn logout(client: &ApiClient) -> AppResult<()> {
    client.logout().await?;
    println!("{} logged out", "👋".green());
    Ok(())
}

pub async fn whoami(client: &ApiClient) -> AppResult<()> {
    let (user, roles, locations) =
        futures::try_join!(client.current_user(), client.roles(), client.locations())?;
    let role_name = user
        .role
        .and_then(|id| roles.iter().find(|role| role.id == Some(id)))
        .and_then(|role| role.name.clone())
        .unwrap_or_else(|| "-".into());
    let location_name = user
        .location
        .and_then(|id| locations.iter().find(|location| location.id == Some(id)))
        .and_then(|location| location.name.clone())
        .unwrap_or_else(|| "-".into());

    println!("{}", "👤 Current user".bright_cyan().bold());
    println!("   id:       {}", user.id.map(|id| id.to_string()).unwrap_or_default());
    println!("   username: {}", user.username.unwrap_or_default());
    println!("   email:    {}", user.email.unwrap_or_default());
    println!(
        "   name:     {} {}",
        user.first_name.unwrap_or_default(),
        user.last_name.unwrap_or_default()
    );
    println!("   role:     {}", role_name);
    println!("   location: {}", location_name);
    if let Some(expiry) = client.session().snapshot().await.token_expiry() {
        println!("   session:  valid until {}", expiry.to_rfc3339());
    }
    Ok(())
}
