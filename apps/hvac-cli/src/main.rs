use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use hvac_app::{AppResult, HvacConfig, HvacNetwork, demo};
use hvac_engine::SystemCalculationResults;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hvac-cli")]
#[command(about = "HVAC CLI - Duct network topology and airflow calculation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config {
        /// Configuration file (YAML or JSON); defaults are used if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        config_path: PathBuf,
    },
    /// Build the demo supply network and calculate it
    Demo {
        /// Configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fan airflow in CFM
        #[arg(long, default_value_t = 1200.0)]
        airflow: f64,
        /// Wait for the debounced pass instead of forcing one
        #[arg(long)]
        live: bool,
        /// Print the pass results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { config, json } => cmd_config(config.as_deref(), json),
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Demo {
            config,
            airflow,
            live,
            json,
        } => cmd_demo(config.as_deref(), airflow, live, json),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<HvacConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            HvacConfig::load(path)
        }
        None => Ok(HvacConfig::default()),
    }
}

fn cmd_config(path: Option<&Path>, json: bool) -> AppResult<()> {
    let config = load_config(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", config.to_yaml_string()?);
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> AppResult<()> {
    println!("Validating config: {}", path.display());
    HvacConfig::load(path)?;
    println!("✓ Config is valid");
    Ok(())
}

fn cmd_demo(path: Option<&Path>, airflow: f64, live: bool, json: bool) -> AppResult<()> {
    let config = load_config(path)?;
    let mut network = HvacNetwork::new(config);
    let nodes = demo::populate(&mut network, airflow)?;

    let results = if live {
        wait_for_pass(&mut network)
    } else {
        network.recalculate()
    };
    let Some(results) = results else {
        println!("No calculation pass ran");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let stats = network.connection_statistics();
    println!(
        "Demo network: {} elements, {} connections ({} fitting inserted)",
        network.topology().node_count(),
        network.topology().connection_count(),
        stats.fittings_inserted
    );
    print_results(&results);

    if let Some(path) = network.critical_path() {
        let names: Vec<&str> = path
            .nodes
            .iter()
            .filter_map(|id| network.topology().node(*id))
            .map(|n| n.element().name())
            .collect();
        println!();
        println!("Critical path: {}", names.join(" -> "));
        println!(
            "  {:.3} in. w.g. over {:.1} ft",
            path.total_pressure_drop, path.total_length_ft
        );
    }

    if let Some(fan) = network.topology().node(nodes.fan) {
        println!("  Fan delivers {:.0} CFM", fan.flow().airflow);
    }
    Ok(())
}

/// Poll the debounced engine the way an interactive front end would.
fn wait_for_pass(network: &mut HvacNetwork) -> Option<SystemCalculationResults> {
    while network.is_pending() {
        if let Some(results) = network.poll() {
            return Some(results);
        }
        let wait = network
            .engine()
            .time_until_due()
            .unwrap_or(Duration::ZERO)
            .max(Duration::from_millis(10));
        std::thread::sleep(wait);
    }
    network.engine().last_results().cloned()
}

fn print_results(results: &SystemCalculationResults) {
    println!(
        "Calculated {}/{} elements in {:.2} ms ({} failed)",
        results.calculated_elements,
        results.total_elements,
        results.total_calculation_time.as_secs_f64() * 1000.0,
        results.failed_elements
    );
    println!();
    println!(
        "  {:<16} {:>9} {:>9} {:>11}",
        "element", "CFM", "FPM", "dP in.w.g."
    );
    for r in &results.results {
        match &r.flow {
            Some(flow) => println!(
                "  {:<16} {:>9.0} {:>9.0} {:>11.4}",
                r.name, flow.airflow, flow.velocity, flow.pressure_drop
            ),
            None => println!("  {:<16} {:>9} {:>9} {:>11}", r.name, "-", "-", "-"),
        }
    }

    if !results.system_warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &results.system_warnings {
            println!("  ! {w}");
        }
    }
    if !results.system_errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &results.system_errors {
            println!("  ✗ {e}");
        }
    }
    println!();
    if results.system_valid {
        println!("✓ System is valid");
    } else {
        println!("✗ System has errors");
    }
}
