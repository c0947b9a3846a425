use clap::{Parser as ClapParser, Subcommand};
use fquery::{
    Schema, tokenize,
    cli::{self, CheckOptions, CheckResult, CliError},
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "fq")]
#[command(about = "fq - filter files and directories by their collected properties")]
#[command(version)]
struct Cli {
    /// Log parsing and compilation details (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run filters against JSON records
    Check {
        /// Filters, each narrowing the previous ones
        #[arg(required = true)]
        filters: Vec<String>,

        /// JSON records (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Print matching records as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Only compile the filters, don't evaluate them
        #[arg(long)]
        syntax_only: bool,

        /// Show null guards and earlier filters in the printed filter
        #[arg(long)]
        explain: bool,
    },

    /// List the properties found in the records
    Properties {
        /// Only properties whose name contains this text
        text: Option<String>,

        /// JSON records (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Show how a filter is split into tokens
    Tokens {
        filter: String,
    },

    /// List documentation topics
    Docs,

    /// Show documentation for a specific topic
    Doc {
        /// Topic name (use 'fq docs' to list topics)
        topic: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            filters,
            input,
            json,
            pretty,
            syntax_only,
            explain,
        } => run_check(filters, input, json, pretty, syntax_only, explain),
        Commands::Properties { text, input } => run_properties(text, input),
        Commands::Tokens { filter } => {
            for token in &tokenize(&filter) {
                println!("{}", token);
            }
            Ok(())
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { topic } => cli::get_doc_topic(&topic).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_check(
    filters: Vec<String>,
    input: Option<String>,
    json: bool,
    pretty: bool,
    syntax_only: bool,
    explain: bool,
) -> Result<(), CliError> {
    let options = CheckOptions {
        filters,
        input: read_input(input)?,
        syntax_only,
        explain,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid { filter } => {
            println!("Filtering: {}", filter);
            println!("Syntax is valid");
        }
        CheckResult::Matches { filter, records } if json => {
            let output =
                serde_json::Value::Array(records.iter().map(cli::record_to_json).collect());
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            eprintln!("Filtering: {}", filter);
            println!("{}", json);
        }
        CheckResult::Matches { filter, records } => {
            println!("Filtering: {}", filter);
            print!("{}", cli::render_matches(&records));
            println!("{} matching", records.len());
        }
    }
    Ok(())
}

fn run_properties(text: Option<String>, input: Option<String>) -> Result<(), CliError> {
    let json = read_input(input)?.ok_or(CliError::NoInput)?;
    let records = cli::load_records(&json)?;
    let schema = Schema::infer(&records);
    print!("{}", cli::list_properties(&schema, text.as_deref()));
    Ok(())
}
