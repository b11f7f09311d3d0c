// jrpc: call methods on a jRPC server, or ask whether one is registered.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jrpc_core::{blocking, Value};

#[derive(Parser)]
#[command(name = "jrpc", version, about = "Call methods on a jRPC server")]
struct Cli {
    /// Server address, host:port (overrides config and JRPC_ADDR).
    #[arg(long, short)]
    addr: Option<String>,
    /// Config file (default ~/.config/jrpc/config.toml, then /etc/jrpc/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Invoke a method and print its replies as JSON.
    Call {
        method: String,
        /// Arguments: integers, floats, true/false, null; anything else is a string.
        args: Vec<String>,
    },
    /// Exit 0 if the method is registered on the server, 1 if not.
    Discover { method: String },
}

/// Exit status for transport, config or server errors; 1 is reserved for "not registered".
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("jrpc: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    if let Some(addr) = cli.addr {
        cfg.addr = addr;
    }

    let client = blocking::Client::connect(&cfg.addr, cfg.client)
        .with_context(|| format!("connecting to {}", cfg.addr))?;
    let code = match cli.command {
        Command::Call { method, args } => {
            let args = args.iter().map(String::as_str).map(parse_arg).collect();
            let replies = client
                .call(&method, args)
                .with_context(|| format!("calling {method}"))?;
            let json: Vec<_> = replies.iter().map(to_json).collect();
            println!("{}", serde_json::to_string(&json)?);
            ExitCode::SUCCESS
        }
        Command::Discover { method } => {
            if client.try_discover(&method)? {
                println!("{method}: registered");
                ExitCode::SUCCESS
            } else {
                println!("{method}: not registered");
                ExitCode::FAILURE
            }
        }
    };
    client.close()?;
    Ok(code)
}

fn parse_arg(s: &str) -> Value {
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    // "nan" and "inf" parse as f64; keep them as words.
    if let Some(x) = s.parse::<f64>().ok().filter(|x| x.is_finite()) {
        return Value::Float(x);
    }
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::from(s),
    }
}

fn to_json(v: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match v {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(x) => serde_json::Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::from(b.clone()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
    }
}
