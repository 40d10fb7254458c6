use clap::{value_parser, Arg, Command};
use deferref_cli::config::HostConfig;
use deferref_cli::{install, roundtrip, RoundtripRequest};
use deferref_core::{CollaboratorRegistry, Format, LocatorKey};
use tracing_subscriber::EnvFilter;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .help("Path to host config (TOML)")
}

fn load_config(path: Option<&String>) -> anyhow::Result<HostConfig> {
    match path {
        Some(path) => Ok(HostConfig::load(path)?),
        None => Ok(HostConfig::default()),
    }
}

fn init_tracing(config: &HostConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Command::new("deferref")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deferred-resolution reference values")
        .subcommand_required(true)
        .subcommand(
            Command::new("keys")
                .about("List configured locator keys")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Resolve a member, serialize it, decode it, and resolve again")
                .arg(config_arg())
                .arg(
                    Arg::new("id")
                        .long("id")
                        .default_value("1")
                        .value_parser(value_parser!(u64))
                        .help("Member id"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("member")
                        .help("Member display name"),
                )
                .arg(
                    Arg::new("key")
                        .long("key")
                        .help("Locator key (defaults to the configured default key)"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .value_parser(["json", "yaml"])
                        .help("Payload format"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("keys", args)) => {
            let config = load_config(args.get_one::<String>("config"))?;
            init_tracing(&config);
            config.validate()?;

            for binding in &config.bindings {
                let marker = if binding.key.trim() == config.default_key.trim() {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{} - {} entries", binding.key.trim(), marker, binding.entries.len());
            }
        }
        Some(("roundtrip", args)) => {
            let config = load_config(args.get_one::<String>("config"))?;
            init_tracing(&config);

            let registry = CollaboratorRegistry::<u64, String>::global();
            let keys = install(&config, &registry)?;
            tracing::info!(bound = keys.len(), "registry bootstrapped");

            let key: LocatorKey = args
                .get_one::<String>("key")
                .unwrap_or(&config.default_key)
                .parse()?;
            let format: Format = args
                .get_one::<String>("format")
                .map_or(Ok(Format::Json), |f| f.parse())?;
            let request = RoundtripRequest {
                id: args.get_one::<u64>("id").copied().unwrap_or(1),
                name: args
                    .get_one::<String>("name")
                    .cloned()
                    .unwrap_or_default(),
                key,
                format,
            };

            match roundtrip(&registry, request).await {
                Ok(report) => print!("{}", report.generate_text()),
                Err(err) => {
                    eprintln!("roundtrip failed: {err:#}");
                    std::process::exit(1);
                }
            }
        }
        _ => {}
    }

    Ok(())
}
