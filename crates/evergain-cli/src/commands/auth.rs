use clap::Subcommand;
use evergain_core::{AppContext, Operation};

use super::{print_json, prompt_line, CmdResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in and store the token in the OS keyring
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Show the signed-in user and the user id sent to the API
    Status,
}

fn password_or_prompt(password: Option<String>) -> std::io::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_line("password: "),
    }
}

pub async fn run(action: AuthAction) -> CmdResult {
    let mut ctx = AppContext::load()?;

    match action {
        AuthAction::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let user = ctx
                .sign_in(&email, &password)
                .await
                .map_err(|e| e.alert(Operation::SignIn))?;
            println!("signed in as {} <{}>", user.full_name, user.email);
        }
        AuthAction::Register {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let user = ctx
                .sign_up(&name, &email, &password)
                .await
                .map_err(|e| e.alert(Operation::SignUp))?;
            println!("registered and signed in as {} <{}>", user.full_name, user.email);
        }
        AuthAction::Logout => {
            ctx.sign_out()?;
            println!("signed out");
        }
        AuthAction::Status => {
            print_json(&serde_json::json!({
                "signed_in": ctx.user().is_some(),
                "user": ctx.user(),
                "user_id": ctx.user_id(),
            }))?;
        }
    }
    Ok(())
}
