//! scs - Netlist and results inspection tool
//!
//! Parses a circuit-description script (or, with `--results`, a simulation
//! results file), optionally narrows it with a query, and prints or rewrites
//! the outcome.
//!
//! # Usage
//!
//! ```bash
//! scs input.scs --name "R*" --param R
//! scs input.scs --master nmos --descend --write subset.scs
//! scs tran.raw --results --trace "v(out)"
//! ```

use std::path::PathBuf;

use clap::Parser;

use scscript::results::{Series, TraceValues, Values};
use scscript::{netlist, results, Descend, Query, Result, Script};

/// Netlist and simulation-results inspection tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Parse the input as a simulation results file
    #[arg(long)]
    results: bool,

    /// Decode only the named trace of a results file
    #[arg(long, value_name = "TRACE", requires = "results")]
    trace: Option<String>,

    /// Match on the statement name
    #[arg(long, value_name = "PATTERN")]
    name: Option<String>,

    /// Match on the master (last node)
    #[arg(long, value_name = "PATTERN")]
    master: Option<String>,

    /// Match on any connected node
    #[arg(long, value_name = "PATTERN")]
    node: Option<String>,

    /// Match on a parameter key
    #[arg(long, value_name = "PATTERN")]
    param: Option<String>,

    /// Match on a parameter value
    #[arg(long, value_name = "PATTERN")]
    value: Option<String>,

    /// Treat patterns as regular expressions instead of * wildcards
    #[arg(long)]
    regex: bool,

    /// Also match the direct members of blocks and containers
    #[arg(long)]
    descend: bool,

    /// Match only inside regions (subckt name, first node) matching this
    /// pattern
    #[arg(long, value_name = "PATTERN", conflicts_with = "descend")]
    within: Option<String>,

    /// Write the resulting netlist to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    write: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.results {
        return print_results(&args);
    }

    let script = netlist::parse_file(&args.file)?;

    // With a query, the output is a new script of just the matches.
    let output = if has_query(&args) {
        let mut subset = Script::new();
        for ns in script.search(&build_query(&args))? {
            subset.add(ns.clone());
        }
        subset
    } else {
        script
    };

    match &args.write {
        Some(path) => output.write_file(path)?,
        None => print!("{}", output),
    }
    Ok(())
}

fn has_query(args: &Args) -> bool {
    args.name.is_some()
        || args.master.is_some()
        || args.node.is_some()
        || args.param.is_some()
        || args.value.is_some()
        || args.descend
        || args.within.is_some()
}

fn build_query(args: &Args) -> Query {
    let mut query = Query::new();
    if let Some(name) = &args.name {
        query = query.with_name(name.as_str());
    }
    if let Some(master) = &args.master {
        query = query.with_master(master.as_str());
    }
    if let Some(node) = &args.node {
        query = query.with_node(node.as_str());
    }
    if let Some(param) = &args.param {
        query = query.with_param(param.as_str());
    }
    if let Some(value) = &args.value {
        query = query.with_value(value.as_str());
    }
    if args.regex {
        query = query.with_regex();
    }
    if let Some(region) = &args.within {
        query = query.with_descend(Descend::IfMatches(region.clone()));
    } else if args.descend {
        query = query.with_descend(Descend::Yes);
    }
    query
}

fn print_results(args: &Args) -> Result<()> {
    let file = match &args.trace {
        Some(trace) => results::parse_trace_file(&args.file, trace)?,
        None => results::parse_file(&args.file)?,
    };
    match &file.values {
        Values::Point(point) => {
            for (name, value) in point {
                println!("{} = {}", name, value);
            }
        }
        Values::Sweep(data) => {
            for (name, trace) in data {
                match trace {
                    TraceValues::Series(series) => {
                        println!("{}  [{} points]", name, series.len());
                    }
                    TraceValues::Struct(fields) => {
                        let points = fields.values().map(Series::len).max().unwrap_or(0);
                        println!("{}  [{} points, {} fields]", name, points, fields.len());
                    }
                }
            }
        }
    }
    Ok(())
}
