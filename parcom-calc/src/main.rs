//! Command-line interface (CLI) for parcom-calc
//!
//! Runs one of the example grammars over text given on the command line, read
//! from a file, or read from standard input, and prints the result.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use parcom_calc::{arith, brackets, sexpr};
use std::io::Read;
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluates an arithmetic expression
    Calc {
        #[command(flatten)]
        source: Source,
        /// Print the syntax tree instead of the value
        #[arg(short, long)]
        tree: bool,
    },
    /// Checks bracket nesting and prints the depth
    Brackets {
        #[command(flatten)]
        source: Source,
    },
    /// Reads s-expressions and prints them back
    Sexpr {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(clap::Args, Debug)]
struct Source {
    /// Text to parse
    text: Option<String>,
    /// Input file, used when no text is given (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

impl Source {
    fn read(&self) -> Result<String> {
        match (&self.text, &self.input) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("can't open {:?}", path)),
            (None, None) => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("can't read stdin")?;
                Ok(text)
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Calc { source, tree } => {
            let text = source.read()?;
            let expr = arith::parse(text.trim_end())?;
            if tree {
                println!("{:#?}", expr);
            } else {
                println!("{}", expr.eval()?);
            }
        }
        Commands::Brackets { source } => {
            let text = source.read()?;
            match brackets::depth(text.trim_end())? {
                Some(depth) => println!("balanced, depth {}", depth),
                None => anyhow::bail!("unbalanced input"),
            }
        }
        Commands::Sexpr { source } => {
            let text = source.read()?;
            for expr in sexpr::read_all(&text)? {
                println!("{}", expr);
            }
        }
    }
    Ok(())
}
