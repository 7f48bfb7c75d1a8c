use std::path::PathBuf;

use clap::Parser;
use riskboard_server::{DashboardServerConfig, DEFAULT_DASHBOARD_BIND};

#[derive(Debug, Parser)]
#[command(
    name = "riskboard-server",
    about = "Serves the risk analytics dashboard as server-rendered HTML",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "RISKBOARD_BIND",
        default_value = DEFAULT_DASHBOARD_BIND,
        help = "Socket address the dashboard server listens on"
    )]
    pub(crate) bind: String,

    #[arg(
        long,
        env = "RISKBOARD_SNAPSHOT",
        help = "Optional dashboard snapshot JSON fixture. The bundled dataset is served when omitted."
    )]
    pub(crate) snapshot: Option<PathBuf>,
}

impl Cli {
    pub(crate) fn into_server_config(self) -> DashboardServerConfig {
        DashboardServerConfig {
            bind: self.bind,
            snapshot_path: self.snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::Cli;

    #[test]
    fn unit_cli_defaults_to_loopback_bind_and_builtin_snapshot() {
        let cli = Cli::try_parse_from(["riskboard-server"]).expect("defaults parse");
        if std::env::var_os("RISKBOARD_BIND").is_none() {
            assert_eq!(cli.bind, "127.0.0.1:8791");
        }
        if std::env::var_os("RISKBOARD_SNAPSHOT").is_none() {
            assert!(cli.snapshot.is_none());
        }
    }

    #[test]
    fn functional_cli_flags_map_into_server_config() {
        let cli = Cli::try_parse_from([
            "riskboard-server",
            "--bind",
            "0.0.0.0:9000",
            "--snapshot",
            "fixtures/snapshot.json",
        ])
        .expect("flags parse");
        let config = cli.into_server_config();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("fixtures/snapshot.json"))
        );
    }
}
