use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "kanister-visualiser",
    version,
    about = "A read-only web view of Kanister Profiles, Blueprints and ActionSets."
)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind the listener to
    #[arg(long)]
    pub bind: Option<String>,

    /// Namespace the Kanister resources live in
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// Directory served under /static
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Page template to use instead of the built-in one
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Upper bound for fetching all three collections, in seconds
    #[arg(long)]
    pub fetch_timeout_secs: Option<u64>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}
