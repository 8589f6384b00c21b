use clap::Subcommand;
use notibox_core::remote::GitHubRemote;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a GitHub token and verify it
    Login {
        /// Personal access token with the notifications scope
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login { token } => {
            let tok = token.ok_or("--token required")?;
            let mut remote = GitHubRemote::new()?;
            remote.set_credentials(&tok)?;
            let login = remote.verify()?;
            println!("GitHub authenticated as {login}");
        }
        AuthAction::Logout => {
            let mut remote = GitHubRemote::new()?;
            remote.disconnect()?;
            println!("GitHub disconnected");
        }
        AuthAction::Status => {
            let remote = GitHubRemote::new()?;
            if !remote.is_authenticated() {
                println!("not authenticated");
                return Ok(());
            }
            match remote.verify() {
                Ok(login) => println!("authenticated as {login}"),
                Err(e) => println!("authenticated (token could not be verified: {e})"),
            }
        }
    }
    Ok(())
}
