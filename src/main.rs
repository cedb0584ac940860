use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;

use opal::base::{execute, ReplSession};
use opal::value::display;

#[derive(ClapParser)]
#[command(name = "opal", about = "The Opal language interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an Opal file
    Run {
        file: String,
        /// Collect and print the results of top-level expressions
        #[arg(long)]
        script: bool,
        /// Print lex/parse/exec timings
        #[arg(long)]
        timings: bool,
    },
    /// Interactive REPL
    Repl,
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            file,
            script,
            timings,
        } => cmd_run(&file, script, timings),
        Commands::Repl => cmd_repl(),
    }
}

fn cmd_run(file: &str, script: bool, timings: bool) {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", format!("Cannot open file '{}': {}", file, e).red());
            process::exit(1);
        }
    };

    let (results, lex_time, parse_time, exec_time) = execute(Some(file), &source, script);
    for value in &results {
        if let Some(text) = display(value) {
            println!("{}", text);
        }
    }
    if timings {
        println!(
            "{}",
            format!(
                "lex: {:?}  parse: {:?}  exec: {:?}",
                lex_time, parse_time, exec_time
            )
            .cyan()
        );
    }
}

fn cmd_repl() {
    let mut session = ReplSession::new();
    println!("Opal REPL — :quit to exit");

    let stdin = io::stdin();
    loop {
        print!("opal> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D)
                println!();
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }
        let input = line.trim_end_matches(['\n', '\r']);

        if input.trim().is_empty() {
            continue;
        }
        if matches!(input.trim(), ":quit" | ":q") {
            println!("Bye.");
            break;
        }

        match session.run(input) {
            Ok(values) => {
                for value in &values {
                    if let Some(text) = display(value) {
                        println!("{}", text);
                    }
                }
            }
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
    }
}
