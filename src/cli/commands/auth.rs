use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::jwt::peek_claims;
use crate::auth::{issue_token, Claims};
use crate::cli::utils::output_success;
use crate::cli::CliContext;
use crate::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Issue a developer token signed with AUTH_JWT_SECRET")]
    Token {
        #[arg(help = "User id (UUID); a random one is used if omitted")]
        user_id: Option<Uuid>,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Show who the current token belongs to")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Token { user_id, email, hours } => {
            let security = &config::config().security;
            let user_id = user_id.unwrap_or_else(Uuid::new_v4);
            let claims = Claims::new(
                user_id,
                email,
                security.jwt_audience.clone(),
                hours.unwrap_or(security.jwt_expiry_hours),
            );
            let token = issue_token(&security.jwt_secret, &claims)?;

            output_success(
                &ctx.output_format,
                &token,
                Some(json!({ "user_id": user_id, "token": token })),
            )
        }
        AuthCommands::Whoami => {
            let token = ctx
                .token
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("No token provided; pass --token or set FACTS_TOKEN"))?;
            let user = peek_claims(token)
                .and_then(|claims| claims.into_identity())
                .map_err(|e| anyhow::anyhow!("{}", e.reason()))?;

            output_success(
                &ctx.output_format,
                &format!("Signed in as {}", user.id),
                Some(json!({ "user": user })),
            )
        }
    }
}
