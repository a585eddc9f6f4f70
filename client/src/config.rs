use crate::error::FaroError;
use clap::{ArgAction, Args, ValueEnum};
use std::sync::OnceLock;
use strum::{Display, EnumString};

static DEFAULT_CONFIG: OnceLock<ClientOptions> = OnceLock::new();

/// How image pixels are packed before being shipped to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Compression {
    /// Raw row-major pixel bytes
    #[default]
    Uint8,
    Jpeg,
    Png,
}

impl From<Compression> for grpc_types::face::Compression {
    fn from(input: Compression) -> Self {
        match input {
            Compression::Uint8 => grpc_types::face::Compression::Uint8,
            Compression::Jpeg => grpc_types::face::Compression::Jpeg,
            Compression::Png => grpc_types::face::Compression::Png,
        }
    }
}

/// Selects whether an operation waits for its reply or is submitted through the admission
/// throttle and handed back as a pending job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sync,
    Async,
}

impl RunMode {
    /// Parses a textual selector ("sync" or "async"). Anything else is rejected before a
    /// request is built or a job is tracked.
    pub fn from_selector(selector: &str) -> Result<Self, FaroError> {
        selector
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| FaroError::InvalidArgument(format!("Unexpected run mode: {selector}")))
    }
}

impl From<bool> for RunMode {
    fn from(run_async: bool) -> Self {
        if run_async {
            RunMode::Async
        } else {
            RunMode::Sync
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Maximum asynchronous calls allowed in flight at once, values below 1 behave as 1
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(ClientOptions::default).max_async)]
    pub max_async: usize,

    /// Address of the face service as host:port
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(ClientOptions::default).address.clone())]
    pub address: String,

    /// Logs probe results and connection failures in detail
    #[arg(long, action=ArgAction::SetTrue, default_value_t =
    DEFAULT_CONFIG.get_or_init(ClientOptions::default).verbose)]
    pub verbose: bool,

    /// JPEG quality used when compression is jpeg
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100), default_value_t =
    DEFAULT_CONFIG.get_or_init(ClientOptions::default).quality)]
    pub quality: u8,

    /// Pixel packing for images sent to the service
    #[arg(long, value_enum, default_value_t =
    DEFAULT_CONFIG.get_or_init(ClientOptions::default).compression)]
    pub compression: Compression,

    /// Name of a running service to look up instead of using address directly
    #[arg(long)]
    pub service_name: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_async: 4,
            address: String::from("localhost:50030"),
            verbose: false,
            quality: 95,
            compression: Compression::Uint8,
            service_name: None,
        }
    }
}

impl ClientOptions {
    pub fn effective_max_async(&self) -> usize {
        self.max_async.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        options: ClientOptions,
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let cli = TestCli::try_parse_from(["faro"]).expect("Could not parse empty args");
        assert_eq!(cli.options, ClientOptions::default());
        assert_eq!(cli.options.address, "localhost:50030");
        assert_eq!(cli.options.max_async, 4);
        assert_eq!(cli.options.quality, 95);
        assert_eq!(cli.options.compression, Compression::Uint8);
        assert!(cli.options.service_name.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = TestCli::try_parse_from([
            "faro",
            "--max-async",
            "8",
            "--address",
            "10.0.0.2:50031",
            "--compression",
            "jpeg",
            "--quality",
            "80",
            "--service-name",
            "vgg2",
            "--verbose",
        ])
        .expect("Could not parse args");
        assert_eq!(cli.options.max_async, 8);
        assert_eq!(cli.options.address, "10.0.0.2:50031");
        assert_eq!(cli.options.compression, Compression::Jpeg);
        assert_eq!(cli.options.quality, 80);
        assert_eq!(cli.options.service_name.as_deref(), Some("vgg2"));
        assert!(cli.options.verbose);
    }

    #[test]
    fn test_quality_out_of_range_is_rejected() {
        assert!(TestCli::try_parse_from(["faro", "--quality", "0"]).is_err());
        assert!(TestCli::try_parse_from(["faro", "--quality", "101"]).is_err());
    }

    #[test]
    fn test_max_async_is_coerced_to_one() {
        let options = ClientOptions {
            max_async: 0,
            ..Default::default()
        };
        assert_eq!(options.effective_max_async(), 1);
    }

    #[test]
    fn test_run_mode_selectors() {
        assert_eq!(RunMode::from_selector("sync").unwrap(), RunMode::Sync);
        assert_eq!(RunMode::from_selector("ASYNC").unwrap(), RunMode::Async);
        assert_eq!(RunMode::from(true), RunMode::Async);
        assert_eq!(RunMode::from(false), RunMode::Sync);

        let err = RunMode::from_selector("maybe").unwrap_err();
        assert!(matches!(err, FaroError::InvalidArgument(_)));
    }
}
