use clap::{
    crate_authors, crate_description, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};
use pretty_env_logger::env_logger::Builder;
use std::env;
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use cloudflare_dyndns::cloudflare::Cloudflare;
use cloudflare_dyndns::common::{IpSource, Result};
use cloudflare_dyndns::ip::{parse_ip, HttpIpSource, StaticIpSource};
use cloudflare_dyndns::reconcile::{Outcome, Reconciler};
use cloudflare_dyndns::{env_flag, Config, DRY_RUN_ENV};

/// RUST_LOG directives when given, Info otherwise; --debug wins over both.
fn configure_level(b: &mut Builder, debug: bool, rust_log: Option<&str>) {
    match rust_log {
        Some(filters) => b.parse_filters(filters),
        None => b.filter_level(log::LevelFilter::Info),
    };
    if debug {
        b.filter_level(log::LevelFilter::Debug);
    }
}

fn set_logger_level(b: &mut Builder, debug: bool) {
    configure_level(b, debug, env::var("RUST_LOG").ok().as_deref());
    b.init();
}

fn setup_logger(debug: bool) {
    // Adapted from env_logger examples. <3 Systemd support
    match std::env::var("RUST_LOG_STYLE") {
        Ok(s) if s == "SYSTEMD" => {
            let builder = &mut pretty_env_logger::env_logger::builder();
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "<{}>{}: {}",
                    match record.level() {
                        log::Level::Error => 3,
                        log::Level::Warn => 4,
                        log::Level::Info => 6,
                        log::Level::Debug => 7,
                        log::Level::Trace => 7,
                    },
                    record.target(),
                    record.args()
                )
            });
            set_logger_level(builder, debug);
        }
        _ => {
            let builder = &mut pretty_env_logger::formatted_builder();
            set_logger_level(builder, debug);
        }
    };
}

fn command() -> Command {
    Command::new("cloudflare-dyndns")
        .about(format!(
            "{}\n{} {}",
            crate_description!(),
            "Settings are read from the first update_dns.conf found in",
            "$HOME, /etc, /data or the working directory.",
        ))
        .arg(
            Arg::new("check")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("test")
                .help("Check the configuration"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .long("dry-run")
                .help(format!(
                    "Show changes without applying them (also enabled by {DRY_RUN_ENV})"
                )),
        )
        .arg(
            Arg::new("debug")
                .action(ArgAction::SetTrue)
                .long("debug")
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("config")
                .action(ArgAction::Set)
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file to try before the default locations"),
        )
        .arg(
            Arg::new("ip")
                .value_name("IP")
                .value_parser(|s: &str| parse_ip(s).map_err(|err| err.to_string()))
                .help("Use this IPv4 address instead of asking the IP service"),
        )
        .version(crate_version!())
        .author(crate_authors!("\n"))
}

/// Produce the one settings value the rest of the run works from.
/// `dry_run_env` is the raw value of DRY_RUN_ENV, if set.
fn resolve_config(args: &ArgMatches, dry_run_env: Option<&str>) -> Result<Config> {
    let home = env::var_os("HOME").map(PathBuf::from);
    let mut candidates = Config::default_candidates(home.as_deref());
    if let Some(path) = args.get_one::<PathBuf>("config") {
        candidates.insert(0, path.clone());
    }

    let (path, config) = Config::discover(&candidates)?;

    let force_dry_run = args.get_flag("dry-run") || env_flag(dry_run_env);
    let config = config.force_dry_run(force_dry_run);

    tracing::debug!(path = %path.display(), config = ?config, "Loaded configuration");
    Ok(config)
}

fn run(config: &Config, ip: Option<Ipv4Addr>) -> Result<Outcome> {
    let provider = Cloudflare::new(config)?;
    let ip_source: Box<dyn IpSource> = match ip {
        Some(ip) => {
            tracing::debug!(ip = %ip, "Got this as an IP on the command line");
            Box::new(StaticIpSource(ip))
        }
        None => Box::new(HttpIpSource::new(config.ip_url.clone())),
    };

    Reconciler::new(config, &provider, ip_source.as_ref()).run()
}

pub(crate) fn main() -> i32 {
    let args = command().get_matches();

    setup_logger(args.get_flag("debug"));

    let config = match resolve_config(&args, env::var(DRY_RUN_ENV).ok().as_deref()) {
        Ok(c) => c,
        Err(err) => {
            tracing::error!("{err}");
            return err.exit_code();
        }
    };

    if args.get_flag("check") {
        tracing::info!(
            zone = config.zone,
            hostname = config.hostname,
            dry_run = config.dry_run,
            "Configuration is valid."
        );
        return 0;
    }

    match run(&config, args.get_one::<Ipv4Addr>("ip").copied()) {
        Ok(outcome) => {
            tracing::debug!(changed = outcome.changed(), "Run finished");
            0
        }
        Err(err) => {
            tracing::error!("{err}");
            err.exit_code()
        }
    }
}
