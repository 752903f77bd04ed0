//! Command-line interface for inspecting route configuration files.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use http::Method;

use crate::config;
use crate::constraints::ConstraintRegistry;
use crate::linter;
use crate::matcher::MatchOutcome;

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(about = "Wayfinder route table CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint a route configuration file
    Lint {
        /// Route configuration file (YAML or JSON)
        routes: PathBuf,
    },
    /// Print the loaded route table
    Routes {
        /// Route configuration file (YAML or JSON)
        routes: PathBuf,
    },
    /// Match one request path against the route table
    Match {
        /// Route configuration file (YAML or JSON)
        routes: PathBuf,

        /// Request path, e.g. /reservations/42
        path: String,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Query parameters as key=value pairs
        #[arg(short, long)]
        query: Vec<String>,
    },
}

/// Parse arguments and run the requested subcommand.
///
/// # Errors
///
/// Returns an error (non-zero exit) for unreadable configs, lint errors
/// and malformed arguments.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let registry = ConstraintRegistry::default();

    match &cli.command {
        Commands::Lint { routes } => {
            let issues = linter::lint_route_file(routes, &registry)?;
            for issue in &issues {
                match &issue.suggestion {
                    Some(suggestion) => eprintln!(
                        "[{}] {}: {} (hint: {})",
                        issue.severity, issue.location, issue.message, suggestion
                    ),
                    None => eprintln!(
                        "[{}] {}: {}",
                        issue.severity, issue.location, issue.message
                    ),
                }
            }
            if linter::has_errors(&issues) {
                bail!("route configuration has lint errors");
            }
            println!("ok: {} issue(s), none fatal", issues.len());
        }
        Commands::Routes { routes } => {
            let table = config::build_table(routes, &registry)?;
            table.dump_routes();
        }
        Commands::Match {
            routes,
            path,
            method,
            query,
        } => {
            let matcher = config::build_matcher(routes, &registry)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let query = parse_query_args(query)?;

            match matcher.match_route(&method, path, &query) {
                MatchOutcome::Matched(m) => {
                    println!(
                        "matched {} -> {} | params: {:?}",
                        m.route.raw_pattern,
                        m.route.handler_name,
                        m.params_map()
                    );
                }
                MatchOutcome::NoMatch => {
                    println!("no match");
                }
                MatchOutcome::Ambiguous { candidates } => {
                    println!("ambiguous between {} routes:", candidates.len());
                    for id in candidates {
                        if let Some(route) = matcher.table().get(id) {
                            println!("  {} -> {}", route.raw_pattern, route.handler_name);
                        }
                    }
                }
                MatchOutcome::ConstraintViolation {
                    constraint,
                    parameter,
                    ..
                } => {
                    println!("constraint `{constraint}` rejected parameter `{parameter}`");
                }
            }
        }
    }
    Ok(())
}

fn parse_query_args(args: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((k, v)) => Ok((k.to_string(), v.to_string())),
            None => bail!("query argument `{arg}` is not key=value"),
        })
        .collect()
}
