use clap::{Parser as ClapParser, Subcommand};
use livevars::{
    JsonFileSettingsStore, to_json, to_json_pretty,
    cli::{self, CliError, EvalOptions, PathsOptions, RenderOptions},
};
use std::{
    io::{self, Read},
    path::PathBuf,
};

#[derive(ClapParser)]
#[command(name = "livevars")]
#[command(about = "Live variables - computed values from Markdown front matter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print it as JSON
    Parse {
        /// The query (reads from stdin if not provided)
        query: Option<String>,

        /// Settings file with custom functions
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Evaluate a query in the context of a note
    Eval {
        /// The query (reads from stdin if not provided)
        query: Option<String>,

        /// Vault root directory
        #[arg(long)]
        vault: PathBuf,

        /// Note the query belongs to, relative to the vault
        #[arg(short, long)]
        note: String,

        /// Settings file with custom functions
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List property paths
    Paths {
        /// Only paths containing this text
        filter: Option<String>,

        /// Vault root directory
        #[arg(long)]
        vault: PathBuf,

        /// Note providing the local scope
        #[arg(short, long)]
        note: Option<String>,

        /// Match the filter at the start of the path
        #[arg(long)]
        prefix: bool,

        /// Only paths inside the note
        #[arg(long)]
        local: bool,

        /// Show a preview of each value
        #[arg(long)]
        values: bool,
    },

    /// Show the preview of one path
    Preview {
        /// Local or global property path
        path: String,

        /// Vault root directory
        #[arg(long)]
        vault: PathBuf,

        /// Note providing the local scope
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Re-render the live variables of a note
    Render {
        /// Note to render, relative to the vault
        note: String,

        /// Vault root directory
        #[arg(long)]
        vault: PathBuf,

        /// Settings file with custom functions
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Manage saved custom functions
    Functions {
        /// Settings file to read and update
        #[arg(short, long)]
        settings: PathBuf,

        #[command(subcommand)]
        action: FunctionsAction,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'livevars docs' to list categories)
        category: String,
    },
}

#[derive(Subcommand)]
enum FunctionsAction {
    /// List saved functions
    List,

    /// Save a new function
    Add {
        /// Name used to call it in queries
        name: String,

        /// Function literal (reads from stdin if not provided)
        code: Option<String>,
    },

    /// Delete a saved function
    Remove {
        /// Name of the function
        name: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            query,
            settings,
            pretty,
        } => run_parse(query, settings, pretty),
        Commands::Eval {
            query,
            vault,
            note,
            settings,
            pretty,
        } => run_eval(query, vault, note, settings, pretty),
        Commands::Paths {
            filter,
            vault,
            note,
            prefix,
            local,
            values,
        } => run_paths(
            PathsOptions {
                filter: filter.unwrap_or_default(),
                vault,
                note,
                prefix,
                local,
            },
            values,
        ),
        Commands::Preview { path, vault, note } => {
            cli::execute_preview(&vault, note.as_deref(), &path).map(|preview| println!("{}", preview))
        }
        Commands::Render {
            note,
            vault,
            settings,
            write,
        } => run_render(RenderOptions {
            vault,
            note,
            settings,
            write,
        }),
        Commands::Functions { settings, action } => run_functions(settings, action),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Uses `arg`, or stdin when it is absent and something is piped in.
fn arg_or_stdin(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let trimmed = buffer.trim();
            if trimmed.is_empty() {
                Err(CliError::NoInput)
            } else {
                Ok(trimmed.to_string())
            }
        }
        None => Err(CliError::NoInput),
    }
}

fn run_parse(query: Option<String>, settings: Option<PathBuf>, pretty: bool) -> Result<(), CliError> {
    let query = arg_or_stdin(query)?;
    let parsed = cli::execute_parse(&query, settings.as_deref())?;
    let json = if pretty {
        serde_json::to_string_pretty(&parsed)?
    } else {
        serde_json::to_string(&parsed)?
    };
    println!("{}", json);
    Ok(())
}

fn run_eval(
    query: Option<String>,
    vault: PathBuf,
    note: String,
    settings: Option<PathBuf>,
    pretty: bool,
) -> Result<(), CliError> {
    let options = EvalOptions {
        query: arg_or_stdin(query)?,
        vault,
        note,
        settings,
    };
    let value = cli::execute_eval(&options)?;
    let output = if pretty { to_json_pretty(&value) } else { to_json(&value) };
    println!("{}", output);
    Ok(())
}

fn run_paths(options: PathsOptions, values: bool) -> Result<(), CliError> {
    for property in cli::execute_paths(&options)? {
        if values {
            println!("{}\t{}", property.key, property.value);
        } else {
            println!("{}", property.key);
        }
    }
    Ok(())
}

fn run_render(options: RenderOptions) -> Result<(), CliError> {
    let outcome = cli::execute_render(&options)?;
    if options.write {
        let status = if outcome.changed { "updated" } else { "unchanged" };
        eprintln!("{}: {}", options.note, status);
    } else {
        print!("{}", outcome.text);
    }
    Ok(())
}

fn run_functions(settings: PathBuf, action: FunctionsAction) -> Result<(), CliError> {
    let store = JsonFileSettingsStore::new(settings);
    match action {
        FunctionsAction::List => {
            for function in cli::list_functions(&store)? {
                println!("{}\t{}", function.name, function.code);
            }
        }
        FunctionsAction::Add { name, code } => {
            let code = arg_or_stdin(code)?;
            cli::add_function(&store, &name, &code)?;
            eprintln!("saved {}", name);
        }
        FunctionsAction::Remove { name } => {
            let removed = cli::remove_function(&store, &name)?;
            eprintln!("removed {}", removed.name);
        }
    }
    Ok(())
}
