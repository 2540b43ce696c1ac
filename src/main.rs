mod auth;
mod cli;
mod commands;
mod model;
mod storage;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Shell);
    match command {
        cli::Command::Signup {
            username,
            password,
            confirm,
        } => commands::signup(username, password, confirm),
        cli::Command::Login { username, password } => commands::login(username, password),
        cli::Command::Logout => commands::logout(),
        cli::Command::Whoami => commands::whoami(),
        cli::Command::Shell => commands::shell(),
    }
}
