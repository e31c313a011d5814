use clap::Subcommand;

use crate::http_server;

#[derive(Debug, Default, Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP API.
    #[default]
    Serve,
}

impl Command {
    pub(crate) async fn run(self) -> color_eyre::Result<()> {
        match self {
            Command::Serve => http_server::serve().await,
        }
    }
}
