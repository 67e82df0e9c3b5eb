use crate::report;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "classtrackd", version, about = "Class roster point-tracking sidecar")]
pub struct Config {
    /// Workspace folder to open at startup.
    #[arg(long, env = "CLASSTRACK_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ReportConfig {
    /// Credential for the text-generation service.
    #[arg(long = "api-key", env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(
        long = "report-model",
        env = "CLASSTRACK_REPORT_MODEL",
        default_value = report::DEFAULT_MODEL
    )]
    pub model: String,

    #[arg(
        long = "report-endpoint",
        env = "CLASSTRACK_REPORT_ENDPOINT",
        default_value = report::DEFAULT_ENDPOINT
    )]
    pub endpoint: String,

    #[arg(
        long = "report-timeout-secs",
        env = "CLASSTRACK_REPORT_TIMEOUT_SECS",
        default_value_t = 30
    )]
    pub timeout_secs: u64,
}

impl ReportConfig {
    pub fn requester(&self) -> report::ReportRequester {
        report::ReportRequester::gemini(
            self.api_key.as_deref(),
            &self.model,
            &self.endpoint,
            Duration::from_secs(self.timeout_secs),
        )
    }
}
