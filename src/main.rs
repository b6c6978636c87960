use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fcn_layout::{clocking_schemes, print_gate_level_layout, PrintOptions};
use fcn_network::{blueprints, LogicNetwork};
use fcn_place_route::{exact, ExactParams, ExactStats, TechnologyConstraints};
use fcn_verify::{check_equivalence, critical_path_length_and_throughput, gate_level_drvs, DrvParams};
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// FCN - physical design for field-coupled nanocomputing
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Place and route a network with the exact algorithm
    Exact(ExactArgs),

    /// List the supported clocking schemes
    Schemes,

    /// List the built-in benchmark networks
    Benchmarks,
}

#[derive(Args)]
struct ExactArgs {
    /// Logic network in JSON format
    #[arg(short, long, conflicts_with = "benchmark", required_unless_present = "benchmark")]
    network: Option<PathBuf>,

    /// Built-in benchmark network
    #[arg(short, long)]
    benchmark: Option<String>,

    /// TOML file with [exact] and [drv] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clocking scheme
    #[arg(short, long)]
    scheme: Option<String>,

    /// Allow wire crossings on a second layer
    #[arg(long)]
    crossings: bool,

    /// Place inputs and outputs on the layout border
    #[arg(long)]
    border_io: bool,

    /// Do not require balanced path lengths
    #[arg(long)]
    desynchronize: bool,

    /// Route inverters straight through
    #[arg(long)]
    straight_inverters: bool,

    /// Allow synchronization elements on wires
    #[arg(long)]
    sync_elements: bool,

    /// Apply ToPoliNano technology constraints
    #[arg(long)]
    topolinano: bool,

    /// Number of candidate sizes solved in parallel
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Minimize the number of wires
    #[arg(long)]
    minimize_wires: bool,

    /// Minimize the number of crossings
    #[arg(long)]
    minimize_crossings: bool,

    /// Give up after this many seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Print clock numbers below the layout
    #[arg(long)]
    clock_numbers: bool,
}

/// Contents of a `--config` file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlowConfig {
    exact: ExactParams,
    drv: DrvParams,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Exact(args) => run_exact(&args)?,
        Commands::Schemes => list_schemes(),
        Commands::Benchmarks => list_benchmarks(),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FlowConfig> {
    let Some(path) = path else {
        return Ok(FlowConfig::default());
    };
    info!("Reading configuration from {:?}", path);
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse {:?}", path))
}

fn load_network(args: &ExactArgs) -> Result<LogicNetwork> {
    if let Some(name) = &args.benchmark {
        return blueprints::by_name(name).with_context(|| {
            format!(
                "Unknown benchmark '{}', expected one of: {}",
                name,
                blueprints::BENCHMARKS.join(", ")
            )
        });
    }
    let Some(path) = &args.network else {
        bail!("Either --network or --benchmark is required");
    };
    info!("Reading network from {:?}", path);
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    LogicNetwork::from_json(&json).with_context(|| format!("Failed to parse network {:?}", path))
}

/// Command line switches override the configuration file
fn apply_overrides(params: &mut ExactParams, args: &ExactArgs) {
    if let Some(scheme) = &args.scheme {
        params.scheme = scheme.clone();
    }
    params.crossings |= args.crossings;
    params.border_io |= args.border_io;
    params.desynchronize |= args.desynchronize;
    params.straight_inverters |= args.straight_inverters;
    params.synchronization_elements |= args.sync_elements;
    params.minimize_wires |= args.minimize_wires;
    params.minimize_crossings |= args.minimize_crossings;
    if args.topolinano {
        params.technology_specifics = Some(TechnologyConstraints::Topolinano);
    }
    if let Some(threads) = args.threads {
        params.num_threads = threads.max(1);
    }
    if let Some(timeout) = args.timeout {
        params.timeout = Some(timeout);
    }
}

fn run_exact(args: &ExactArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config.exact, args);
    config.drv.border_io |= config.exact.border_io;

    let ntk = load_network(args)?;
    info!(
        "Network '{}': {} inputs, {} outputs, {} gates",
        ntk.name(),
        ntk.num_pis(),
        ntk.num_pos(),
        ntk.num_gates()
    );

    let mut stats = ExactStats::default();
    let Some(lyt) = exact(&ntk, &config.exact, Some(&mut stats)).context("Physical design failed")?
    else {
        warn!("Search ended after {} candidates", stats.candidates_tried);
        bail!("No layout found within the size bounds and timeout");
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let options = PrintOptions {
        clock_numbers: args.clock_numbers,
    };
    print_gate_level_layout(&mut out, &lyt, &options)?;
    writeln!(out)?;
    writeln!(out, "{}", stats)?;

    let drvs = gate_level_drvs(&lyt, &config.drv, Some(&mut out));
    writeln!(out, "[i] DRVs        = {} ({} warnings)", drvs.drvs, drvs.warnings)?;

    let timing = critical_path_length_and_throughput(&lyt);
    writeln!(out, "[i] critical path = {}", timing.critical_path_length)?;
    writeln!(out, "[i] throughput    = 1/{}", timing.throughput)?;

    let eq = check_equivalence(&ntk, &lyt).context("Equivalence check failed")?;
    if eq.equivalent {
        writeln!(out, "[i] equivalent to '{}'", ntk.name())?;
    } else {
        warn!("Layout differs from the network on {:?}", eq.counterexample);
        writeln!(out, "[!] NOT equivalent to '{}'", ntk.name())?;
    }

    Ok(())
}

fn list_schemes() {
    println!("{:<10} {:>6} {:>6} {:>7}  regular", "scheme", "clocks", "fanin", "fanout");
    for scheme in clocking_schemes() {
        println!(
            "{:<10} {:>6} {:>6} {:>7}  {}",
            scheme.name,
            scheme.num_clocks,
            scheme.max_in_degree,
            scheme.max_out_degree,
            if scheme.is_regular() { "yes" } else { "no" }
        );
    }
}

fn list_benchmarks() {
    for name in blueprints::BENCHMARKS {
        if let Some(ntk) = blueprints::by_name(name) {
            println!(
                "{:<30} {} inputs, {} outputs, {} gates",
                name,
                ntk.num_pis(),
                ntk.num_pos(),
                ntk.num_gates()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "fcn", "exact", "--benchmark", "and_or", "--scheme", "RES", "--crossings", "-j", "0",
            "--timeout", "1.5",
        ]);
        let Commands::Exact(args) = cli.command else {
            panic!("expected the exact subcommand");
        };
        let mut params = ExactParams::default();
        apply_overrides(&mut params, &args);
        assert_eq!(params.scheme, "RES");
        assert!(params.crossings);
        assert!(!params.border_io);
        assert_eq!(params.num_threads, 1);
        assert_eq!(params.timeout, Some(1.5));
    }

    #[test]
    fn test_config_sections() {
        let config: FlowConfig = toml::from_str(
            r#"
            [exact]
            scheme = "USE"
            minimize_wires = true

            [drv]
            border_io = true
            "#,
        )
        .unwrap();
        assert_eq!(config.exact.scheme, "USE");
        assert!(config.exact.minimize_wires);
        assert!(config.drv.border_io);
        assert!(config.drv.clocked_data_flow);
    }

    #[test]
    fn test_unknown_benchmark_is_reported() {
        let cli = Cli::parse_from(["fcn", "exact", "--benchmark", "nope"]);
        let Commands::Exact(args) = cli.command else {
            panic!("expected the exact subcommand");
        };
        let err = load_network(&args).unwrap_err();
        assert!(err.to_string().contains("Unknown benchmark"));
    }
}
