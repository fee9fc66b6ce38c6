mod commands;
mod components;
mod models;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod testing;

use clap::{ArgEnum, Parser};
use tracing_subscriber::EnvFilter;

use component_store::ConfigProvider;
use yaml_config_provider::{Yaml, YamlConfigProvider};

#[derive(ArgEnum, Clone, Copy, Debug)]
enum Command {
    Create,
    Cleanup,
}

#[derive(Parser, Debug)]
#[clap(
    about = "Creates synthetic accounts, applications and users on an account management API, and removes them afterwards",
    mut_arg("help", |arg| arg.short('?'))
)]
struct Args {
    #[clap(arg_enum)]
    command: Command,

    #[clap(short, long)]
    /// The access token
    token: Option<String>,

    #[clap(short, long)]
    /// The admin host (ex: acme-admin.example.test)
    host: Option<String>,

    #[clap(short, long)]
    /// The number of applications to create in each account
    applications: Option<u64>,

    #[clap(short = 'c', long)]
    /// The number of accounts to create
    accounts: Option<u64>,

    #[clap(short, long)]
    /// The number of users to create in each account
    users: Option<u64>,

    #[clap(short, long)]
    /// Be verbose
    verbose: bool,

    #[clap(short = 'l', long)]
    /// Log HTTP requests
    loghttp: bool,

    #[clap(long, parse(from_os_str))]
    /// The path to an optional config file
    config: Option<std::path::PathBuf>,

    #[clap(long)]
    /// The maximum number of requests in flight (0 means unbounded)
    max_in_flight: Option<u64>,

    #[clap(long)]
    /// The request timeout in seconds
    timeout: Option<u64>,

    #[clap(long)]
    /// The page size used to list accounts during cleanup
    per_page: Option<u64>,
}

fn integer(flag: &str, value: Option<u64>) -> anyhow::Result<Option<Yaml>> {
    value
        .map(|value| {
            i64::try_from(value)
                .map(Yaml::Integer)
                .map_err(|_| anyhow::anyhow!("--{} value {} is too large", flag, value))
        })
        .transpose()
}

///
/// The config file, if any, with command line values written over it.
///
fn load_config(args: &Args) -> anyhow::Result<YamlConfigProvider> {
    let mut config = match &args.config {
        Some(path) => YamlConfigProvider::new(path)?,
        None => YamlConfigProvider::default(),
    };

    config.set_opt("admin-client", "host", args.host.clone().map(Yaml::String))?;
    config.set_opt(
        "admin-client",
        "access_token",
        args.token.clone().map(Yaml::String),
    )?;
    config.set_opt("admin-client", "max_in_flight", integer("max-in-flight", args.max_in_flight)?)?;
    config.set_opt("admin-client", "timeout_secs", integer("timeout", args.timeout)?)?;
    config.set_opt("account-provisioner", "accounts", integer("accounts", args.accounts)?)?;
    config.set_opt(
        "resource-populator",
        "applications",
        integer("applications", args.applications)?,
    )?;
    config.set_opt("resource-populator", "users", integer("users", args.users)?)?;
    config.set_opt("cleanup-scanner", "per_page", integer("per-page", args.per_page)?)?;

    if args.verbose {
        config.set("logging", "verbose", Yaml::Boolean(true))?;
    }
    if args.loghttp {
        config.set("logging", "trace_http", Yaml::Boolean(true))?;
    }

    Ok(config)
}

fn init_logging(config: &dyn ConfigProvider) -> anyhow::Result<()> {
    let logging = config.get_subconfig("logging")?;

    let mut directives = String::from("warn");
    if logging.get_bool_or("verbose", false)? {
        directives.push_str(",tenantseed=info");
    }
    if logging.get_bool_or("trace_http", false)? {
        directives.push_str(",tenantseed::http=debug");
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    let config = Box::new(config);
    match args.command {
        Command::Create => commands::create(config).await?,
        Command::Cleanup => commands::cleanup(config).await?,
    };

    Ok(())
}
