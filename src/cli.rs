use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about = "Personal task manager with local accounts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new account
    Signup {
        /// Username (must not already exist)
        username: String,
        /// Password
        password: String,
        /// Password confirmation (must match)
        confirm: String,
    },
    /// Log in and start a session
    Login {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// End the current session
    Logout,
    /// Print the currently logged-in user
    Whoami,
    /// Open the interactive task shell (requires an active session)
    Shell,
}
