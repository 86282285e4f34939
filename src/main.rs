mod debug_report;

use flexvars::serde_json::{self, Value};
use flexvars::{FlexVars, Missing, Options, Vars, parse_template};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FLEXVARS_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_logging();

    let vars = FlexVars::with_options(Options::default().with_missing(config.missing.clone()));
    let result = vars.replace(&config.template, config.values());

    if config.explain {
        debug_report::print_run(&config.template, &parse_template(&config.template), &vars, &result, config.color);
    }

    match result {
        Ok(text) => {
            if !config.explain {
                println!("{text}");
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

struct CliConfig {
    template: String,
    positional: Vec<Value>,
    named: Option<Value>,
    missing: Missing,
    explain: bool,
    color: bool,
}

impl CliConfig {
    fn values(&self) -> Vars {
        match &self.named {
            Some(named) => named.clone().into(),
            None => self.positional.clone().into(),
        }
    }
}

fn parse_args() -> Result<CliConfig, String> {
    let mut template: Option<String> = None;
    let mut positional = Vec::new();
    let mut named: Option<Value> = None;
    let mut missing = Missing::Default;
    let mut explain = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("flexvars {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--explain" => explain = true,
            "--named" | "-n" => {
                let value = args.next().ok_or_else(|| "error: --named expects a JSON value".to_string())?;
                named = Some(parse_named(&value)?);
            }
            "--missing" => {
                let value = args.next().ok_or_else(|| "error: --missing expects a value".to_string())?;
                missing = parse_missing(&value)?;
            }
            "--template" | "-t" => {
                let value = args.next().ok_or_else(|| "error: --template expects a value".to_string())?;
                if template.is_some() {
                    return Err("error: template provided multiple times".to_string());
                }
                template = Some(value);
            }
            "--" => {
                for rest in args.by_ref() {
                    push_operand(&mut template, &mut positional, rest);
                }
                break;
            }
            _ if arg.starts_with("--named=") => {
                named = Some(parse_named(arg.trim_start_matches("--named="))?);
            }
            _ if arg.starts_with("--missing=") => {
                missing = parse_missing(arg.trim_start_matches("--missing="))?;
            }
            _ if arg.starts_with("--template=") => {
                if template.is_some() {
                    return Err("error: template provided multiple times".to_string());
                }
                template = Some(arg.trim_start_matches("--template=").to_string());
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => push_operand(&mut template, &mut positional, arg),
        }
    }

    if named.is_some() && !positional.is_empty() {
        return Err("error: --named cannot be combined with positional values".to_string());
    }

    let template = match template {
        Some(value) => value,
        None => read_stdin_template()?,
    };

    if template.is_empty() {
        return Err(format!("error: no template provided\n\n{}", help_text()));
    }

    Ok(CliConfig { template, positional, named, missing, explain, color })
}

/// The first operand is the template, the rest are values.
fn push_operand(template: &mut Option<String>, positional: &mut Vec<Value>, operand: String) {
    if template.is_none() {
        *template = Some(operand);
    } else {
        positional.push(parse_value(&operand));
    }
}

/// Values are JSON when they parse as JSON, plain strings otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_named(raw: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("error: --named expects a JSON object".to_string()),
        Err(err) => Err(format!("error: invalid --named JSON: {err}")),
    }
}

fn parse_missing(raw: &str) -> Result<Missing, String> {
    match raw {
        "default" => Ok(Missing::Default),
        "ignore" => Ok(Missing::Ignore),
        _ => match raw.strip_prefix("with:") {
            Some(text) => {
                let text = text.to_string();
                Ok(Missing::with(move |_| Value::String(text.clone())))
            }
            None => Err(format!("error: invalid --missing '{raw}' (expected default, ignore or with:<text>)")),
        },
    }
}

fn read_stdin_template() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "flexvars {version}

Interpolate a template with pipe-style filters.

Usage:
  flexvars [OPTIONS] [--] <template> [values...]
  flexvars [OPTIONS] --template <text> [values...]
  flexvars [OPTIONS] --named '{{\"name\": \"tom\"}}' <template>

Values are parsed as JSON when possible (42, true, [1,2]) and taken as plain
text otherwise. Without a template argument the template is read from stdin.

Options:
  -t, --template <text>      Template to interpolate.
  -n, --named <json>         JSON object of named values.
  --missing <mode>           default | ignore | with:<text>   (default: default)
  --explain                  Print the parsed placeholders and the result.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}                Log filter (e.g. debug, flexvars=trace).

Exit codes:
  0  Success.
  1  Interpolation failed (a throw policy fired).
  2  Invalid arguments or missing template.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
