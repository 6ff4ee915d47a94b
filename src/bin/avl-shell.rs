use std::env;
use std::io;
use std::process::ExitCode;

use log::{error, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use avl_tree::{Options, Session};

const USAGE: &str = "\
Usage: avl-shell [-q] [-v | -vv]

Reads a key count and that many integer keys from stdin, then operations
as `code key` pairs (1: insert, 2: delete, 0: stop), printing the tree
after each step.

  -q, --quiet     do not print prompts
  -v, --verbose   log applied operations
  -vv             also log rotations
  -h, --help      print this help";

fn main() -> ExitCode {
    let mut options = Options::default();
    let mut level = LevelFilter::Warn;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-q" | "--quiet" => options.prompts = false,
            "-v" | "--verbose" => level = LevelFilter::Debug,
            "-vv" => level = LevelFilter::Trace,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("unknown argument {:?}\n\n{}", other, USAGE);
                return ExitCode::from(2);
            }
        }
    }

    if let Err(err) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logging: {}", err);
    }

    let mut session = Session::with_options(io::stdin().lock(), io::stdout().lock(), options);
    match session.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
