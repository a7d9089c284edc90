use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "goaltrack",
    version,
    about = "Track goals and daily habits over HTTP with SQLite"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        default_value = "./data",
        help = "Directory holding the SQLite database"
    )]
    pub data_dir: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Serve(Serve),
    #[command(name = "create-user")]
    CreateUser(CreateUser),
    #[command(name = "delete-user")]
    DeleteUser(DeleteUser),
}

#[derive(Args, Debug)]
pub struct Serve {
    #[arg(
        long,
        value_name = "ADDR",
        default_value = "127.0.0.1:8000",
        help = "Address to listen on"
    )]
    pub bind: SocketAddr,
}

#[derive(Args, Debug)]
pub struct CreateUser {
    #[arg(value_name = "USERNAME")]
    pub username: String,
    #[arg(
        long,
        value_name = "NAME",
        help = "Display name shown on the dashboard (defaults to the username)"
    )]
    pub display_name: Option<String>,
    #[arg(long, value_name = "PASSWORD")]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct DeleteUser {
    #[arg(value_name = "USERNAME")]
    pub username: String,
}
