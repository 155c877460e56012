//! Check TLV schema files: parse and semantically validate.
//!
//! Usage:
//!   check_schema [OPTIONS] [FILE.tlvs ...]
//!   check_schema < file.tlvs
//!
//! Options:
//!   --dump, -d   Print the parsed schema tree for each input
//!   --quiet, -q  Suppress the summary line
//!
//! If no files are given, reads from stdin. Exit code 1 if any input fails
//! to parse or has validation errors.

use std::io::{self, Read};
use tlvschema::{dump_schema, parse, validate};

fn take_flag(args: &mut Vec<String>, long: &str, short: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == long || a == short) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn check_one(path: &str, source: &str, dump: bool, has_error: &mut bool) -> usize {
    let schema = match parse(source) {
        Ok(schema) => schema,
        Err(e) => {
            *has_error = true;
            match e.pos {
                Some(pos) => println!("{}:{}: error: {}", path, pos, e),
                None => println!("{}: error: {}", path, e),
            }
            return 1;
        }
    };
    if dump {
        print!("{}", dump_schema(&schema));
    }
    let diags = validate(&schema);
    for d in &diags {
        println!("{}:{}", path, d);
    }
    if !diags.is_empty() {
        *has_error = true;
    }
    diags.len()
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let dump = take_flag(&mut args, "--dump", "-d");
    let quiet = take_flag(&mut args, "--quiet", "-q");

    let mut has_error = false;
    let mut total_errors = 0usize;

    if args.is_empty() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        total_errors += check_one("<stdin>", &source, dump, &mut has_error);
    } else {
        for path in &args {
            let source = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    has_error = true;
                    continue;
                }
            };
            total_errors += check_one(path, &source, dump, &mut has_error);
        }
    }

    if total_errors > 0 && !quiet {
        eprintln!("check: {} error(s)", total_errors);
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
