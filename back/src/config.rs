use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;

const DEFAULT_DATABASE_URL: &str = "file://todos.ron";

/// HTTP service for a todo collection.
#[derive(Clone, Debug, Parser)]
#[command(name = "todos", version)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Store connection string, `memory://` or `file://<path>`. Falls back
    /// to `MONGODB_URI`, then `file://todos.ron`.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// PEM certificate, serves HTTPS together with `--tls-key`.
    #[arg(long, env = "SSL_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key for `--tls-cert`.
    #[arg(long, env = "SSL_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn database_url(&self) -> String {
        self.database_url_with(|key| env::var(key).ok())
    }

    fn database_url_with(&self, var: impl Fn(&str) -> Option<String>) -> String {
        self.database_url
            .clone()
            .or_else(|| var("MONGODB_URI"))
            .unwrap_or_else(|| String::from(DEFAULT_DATABASE_URL))
    }

    pub fn tls(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert.as_ref().zip(self.tls_key.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;

        Config::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "todos",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--database-url",
            "memory://",
        ])
        .unwrap();
        assert_eq!(config.addr(), SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.database_url_with(|_| None), "memory://");
    }

    #[test]
    fn database_url_falls_back_to_mongodb_uri_then_default() {
        let config = Config::try_parse_from(["todos"]).unwrap();
        let config = Config {
            database_url: None,
            ..config
        };

        let uri = config.database_url_with(|key| {
            (key == "MONGODB_URI").then(|| String::from("file://legacy.ron"))
        });
        assert_eq!(uri, "file://legacy.ron");

        assert_eq!(config.database_url_with(|_| None), DEFAULT_DATABASE_URL);
    }

    #[test]
    fn database_url_flag_wins_over_mongodb_uri() {
        let config =
            Config::try_parse_from(["todos", "--database-url", "memory://"]).unwrap();

        let uri = config.database_url_with(|_| Some(String::from("file://legacy.ron")));
        assert_eq!(uri, "memory://");
    }

    #[test]
    fn tls_needs_both_files() {
        assert!(Config::try_parse_from(["todos", "--tls-cert", "cert.pem"]).is_err());

        let config =
            Config::try_parse_from(["todos", "--tls-cert", "cert.pem", "--tls-key", "key.pem"])
                .unwrap();
        assert!(config.tls().is_some());
    }
}
