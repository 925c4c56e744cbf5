use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, Parser)]
#[clap(name = "ironplan server")]
pub struct Cli {
    /// SQLite database file, created on first start
    #[clap(long, env = "IRONPLAN_DATABASE", default_value = "ironplan.sqlite")]
    pub database: PathBuf,
    #[clap(long, env = "IRONPLAN_BIND_ADDR", default_value = "127.0.0.1")]
    pub bind_addr: IpAddr,
    #[clap(long, env = "IRONPLAN_PORT", default_value = "8080")]
    pub port: u16,
    #[clap(long, env = "IRONPLAN_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Cli {
    #[must_use]
    pub fn socket(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "ironplan-server",
            "--database",
            "/tmp/test.sqlite",
            "--bind-addr",
            "0.0.0.0",
            "--port",
            "3000",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.database, PathBuf::from("/tmp/test.sqlite"));
        assert_eq!(cli.socket().to_string(), "0.0.0.0:3000");
        assert_eq!(cli.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_cli_invalid_log_level() {
        assert!(Cli::try_parse_from(["ironplan-server", "--log-level", "loud"]).is_err());
    }
}
