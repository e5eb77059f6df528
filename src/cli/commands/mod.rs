//! One module per `opvault` subcommand.

pub mod add;
pub mod generate;
pub mod init;
pub mod list;
pub mod note;
pub mod show;
pub mod verify;
