mod client;
mod config;
mod debug;
mod filter;
mod instance;
mod render;
mod resource;
mod topology;

use crate::client::MidonetClient;
use crate::config::{Config, EffectiveConfig, Scope, save};
use crate::debug::MidoDebug;
use crate::filter::{Criteria, MatchMode, MissingAttribute};
use crate::instance::Inventory;
use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "midodebug",
    version,
    about = "Troubleshooting views for MidoNet virtual topologies"
)]
struct Cli {
    #[arg(long, global = true, help = "MidoNet API host (otherwise read from config)")]
    host: Option<String>,

    #[arg(long, global = true, help = "MidoNet API port (defaults to 8080)")]
    port: Option<u16>,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Full API root, e.g. http://host:8080/midonet-api (overrides --host/--port)"
    )]
    base_url: Option<String>,

    #[arg(long, global = true)]
    username: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    #[arg(long, global = true, help = "Only list routers and bridges owned by this tenant")]
    tenant: Option<String>,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputFormat::Pretty,
        global = true,
        help = "Output format"
    )]
    output: OutputFormat,

    #[arg(
        long,
        value_name = "SECONDS",
        global = true,
        help = "Watch mode: refresh every SECONDS"
    )]
    watch: Option<u64>,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "More logging on stderr (-v info, -vv debug); RUST_LOG overrides"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Persist the global connection flags (--host, --username, ...) to the chosen scope
    Configure {
        #[arg(long, value_name = "FILE", help = "Default instance inventory file")]
        inventory: Option<PathBuf>,
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show current configuration (secrets masked)
    ConfigShow,
    /// Check that the MidoNet API is reachable with the stored credentials
    Validate,
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
    /// List routers with their routes and ports
    Routers {
        #[command(flatten)]
        select: SelectArgs,
        #[arg(long, help = "One line per router instead of full summaries")]
        brief: bool,
    },
    /// Show a single router summary
    Router {
        #[arg(value_name = "ROUTER_ID|NAME")]
        key: String,
    },
    /// Show a router's routing table
    Routes {
        #[arg(value_name = "ROUTER_ID|NAME")]
        router: String,
    },
    /// Show the ports of a router or bridge, including BGP sessions
    Ports {
        #[arg(value_name = "DEVICE_ID|NAME")]
        device: String,
    },
    /// Find the router serving a cloud instance's VPC
    RouterForInstance {
        #[arg(value_name = "INSTANCE_ID")]
        instance_id: String,
        #[arg(long, value_name = "FILE", help = "Instance inventory (describe-instances JSON or YAML list)")]
        inventory: Option<PathBuf>,
    },
    /// List bridges with ports, ARP table and DHCP subnets
    Bridges {
        #[command(flatten)]
        select: SelectArgs,
    },
    /// Show a single bridge summary
    Bridge {
        #[arg(value_name = "BRIDGE_ID|NAME")]
        key: String,
    },
    /// Show a bridge's ARP table
    Arp {
        #[arg(value_name = "BRIDGE_ID|NAME")]
        bridge: String,
    },
    /// Show a bridge's DHCP subnets
    Dhcp {
        #[arg(value_name = "BRIDGE_ID|NAME")]
        bridge: String,
    },
}

#[derive(Args, Clone)]
struct SelectArgs {
    #[arg(
        long = "filter",
        value_name = "KEY=PATTERN",
        help = "Only keep resources whose attribute matches PATTERN (repeatable)"
    )]
    filters: Vec<String>,

    #[arg(
        long = "match",
        value_enum,
        default_value_t = MatchArg::Regex,
        help = "How patterns are compared with attribute values"
    )]
    match_mode: MatchArg,

    #[arg(long, help = "Drop resources that lack a filtered attribute")]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MatchArg {
    Regex,
    Substring,
    Exact,
}

impl From<MatchArg> for MatchMode {
    fn from(value: MatchArg) -> Self {
        match value {
            MatchArg::Regex => MatchMode::Regex,
            MatchArg::Substring => MatchMode::Substring,
            MatchArg::Exact => MatchMode::Exact,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            host: self.host.clone(),
            port: self.port,
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            tenant_id: self.tenant.clone(),
            inventory: None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cwd = std::env::current_dir().context("reading current directory")?;

    match &cli.command {
        Commands::Configure { inventory, scope } => {
            let update = Config {
                inventory: inventory.clone(),
                ..cli.overrides()
            };
            if update == Config::default() {
                return Err(anyhow!("nothing to configure; pass at least one setting"));
            }
            let existing = config::load_scope((*scope).into(), &cwd)?;
            let path = save((*scope).into(), &config::merge(existing, update), &cwd)?;
            println!("Saved configuration to {}", path.display());
            return Ok(());
        }
        Commands::ConfigShow => {
            let mut masked = config::merge(config::load(&cwd)?, cli.overrides());
            if masked.password.is_some() {
                masked.password = Some("*****".into());
            }
            println!("{}", serde_json::to_string_pretty(&masked)?);
            return Ok(());
        }
        Commands::Completion { shell } => {
            use clap_complete::{generate, shells};
            let mut cmd = Cli::command();
            let bin = cmd.get_name().to_string();
            match shell {
                CompletionShell::Bash => {
                    generate(shells::Bash, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Zsh => {
                    generate(shells::Zsh, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Fish => {
                    generate(shells::Fish, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::PowerShell => {
                    generate(shells::PowerShell, &mut cmd, bin, &mut std::io::stdout())
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let effective = config::resolve(&cwd, cli.overrides())?;
    debug!(base_url = %effective.base_url, "resolved configuration");
    let client = MidonetClient::new(&effective)?;

    if let Commands::Validate = cli.command {
        return validate(&client, &effective);
    }

    let inventory = match &cli.command {
        Commands::RouterForInstance { inventory, .. } => {
            let path = match inventory {
                Some(path) => path.as_path(),
                None => effective.inventory()?,
            };
            let loaded = Inventory::load(path)
                .with_context(|| format!("loading instance inventory {}", path.display()))?;
            if loaded.is_empty() {
                warn!(path = %path.display(), "instance inventory is empty");
            }
            debug!(instances = loaded.len(), path = %path.display(), "loaded inventory");
            Some(loaded)
        }
        _ => None,
    };

    let mut session = MidoDebug::new(&client);
    if let Some(inventory) = inventory.as_ref() {
        session = session.with_instances(inventory);
    }

    render_loop(|| run(&cli.command, &session, cli.output), cli.watch)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},reqwest=warn,hyper=warn")));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .init();
}

fn render_loop<F>(mut render: F, watch: Option<u64>) -> Result<()>
where
    F: FnMut() -> Result<String>,
{
    if let Some(interval) = watch {
        loop {
            println!("{}", render()?);
            std::thread::sleep(std::time::Duration::from_secs(interval));
        }
    } else {
        println!("{}", render()?);
        Ok(())
    }
}

fn run(command: &Commands, session: &MidoDebug<'_>, output: OutputFormat) -> Result<String> {
    match command {
        Commands::Routers { select, brief } => {
            let criteria = Criteria::parse_pairs(select.filters.as_slice())?;
            let session_view = with_policy(session, select);
            let routers = session_view
                .get_all_routers(&criteria, MatchMode::from(select.match_mode).predicate())?;
            emit(output, &routers, || {
                if *brief {
                    Ok(session.show_routers_brief(&routers))
                } else {
                    session.show_routers(&routers)
                }
            })
        }
        Commands::Router { key } => {
            let router = session.find_router(key)?;
            emit(output, &router, || session.show_router_summary(&router))
        }
        Commands::Routes { router } => {
            let router = session.find_router(router)?;
            let routes = session.routes(&router)?;
            emit(output, &routes, || Ok(session.show_routes(&routes)))
        }
        Commands::Ports { device } => {
            let ports = session.find_device_ports(device)?;
            emit(output, &ports, || session.show_ports(&ports))
        }
        Commands::RouterForInstance { instance_id, .. } => {
            let router = session.get_router_for_instance(instance_id)?;
            emit(output, &router, || session.show_router_summary(&router))
        }
        Commands::Bridges { select } => {
            let criteria = Criteria::parse_pairs(select.filters.as_slice())?;
            let session_view = with_policy(session, select);
            let bridges = session_view
                .get_all_bridges(&criteria, MatchMode::from(select.match_mode).predicate())?;
            emit(output, &bridges, || session.show_bridges(&bridges))
        }
        Commands::Bridge { key } => {
            let bridge = session.find_bridge(key)?;
            emit(output, &bridge, || {
                session.show_bridges(std::slice::from_ref(&bridge))
            })
        }
        Commands::Arp { bridge } => {
            let bridge = session.find_bridge(bridge)?;
            emit(output, &bridge, || session.show_bridge_arp_table(&bridge))
        }
        Commands::Dhcp { bridge } => {
            let bridge = session.find_bridge(bridge)?;
            emit(output, &bridge, || session.show_bridge_dhcp_subnets(&bridge))
        }
        Commands::Configure { .. }
        | Commands::ConfigShow
        | Commands::Completion { .. }
        | Commands::Validate => unreachable!("handled before connecting"),
    }
}

fn with_policy<'a>(session: &MidoDebug<'a>, select: &SelectArgs) -> MidoDebug<'a> {
    let missing = if select.strict {
        MissingAttribute::Exclude
    } else {
        MissingAttribute::Keep
    };
    (*session).with_missing_attribute(missing)
}

fn emit<T, F>(output: OutputFormat, value: &T, pretty: F) -> Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> Result<String>,
{
    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Pretty => pretty(),
    }
}

fn validate(client: &MidonetClient, effective: &EffectiveConfig) -> Result<()> {
    println!("Validating MidoNet API at {}...", client.base_url());
    match client.application() {
        Ok(root) => println!(
            "MidoNet API: ok ({} links advertised)",
            root.values().filter(|v| v.is_string()).count()
        ),
        Err(e) => println!("MidoNet API: FAILED ({:#})", e),
    }

    if let Some(path) = effective.inventory.as_deref() {
        match Inventory::load(path) {
            Ok(inv) => println!("Instance inventory: ok ({} instances)", inv.len()),
            Err(e) => println!("Instance inventory: FAILED ({:#})", anyhow!(e)),
        }
    }
    Ok(())
}
