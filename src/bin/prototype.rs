//! CLI for inspecting prototype sheets.
//!
//! Usage:
//!   prototype <sheet>                        # Print every declared prototype
//!   prototype <sheet> linearize <name>       # Print the search order of a prototype
//!   prototype <sheet> get <name> <attr>      # Resolve an attribute and show its owner

use prototype::model::object::Node;
use prototype::sheet::{self, Sheet};
use std::env;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && (args[1] == "-h" || args[1] == "--help") {
        print_usage();
        process::exit(0);
    }

    match args.len() {
        2 => print_all(&load(&args[1])),
        4 if args[2] == "linearize" => print_linearization(&load(&args[1]), &args[3]),
        5 if args[2] == "get" => print_attribute(&load(&args[1]), &args[3], &args[4]),
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("prototype - delegation object inspector");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  prototype <sheet>                     Print every declared prototype");
    eprintln!("  prototype <sheet> linearize <name>    Print the search order of a prototype");
    eprintln!("  prototype <sheet> get <name> <attr>   Resolve an attribute and show its owner");
}

fn load(path: &str) -> Sheet {
    match sheet::load_file(Path::new(path)) {
        Ok(sheet) => sheet,
        Err(e) => {
            eprintln!("Error loading '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn print_all(sheet: &Sheet) {
    for (_, id) in sheet.names() {
        match sheet.space().repr(id) {
            Ok(repr) => println!("{}", repr),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
}

fn print_linearization(sheet: &Sheet, name: &str) {
    let order = sheet
        .object(name)
        .and_then(|id| sheet.space().linearize(id));
    match order {
        Ok(nodes) => {
            let names: Vec<String> = nodes.iter().map(|n| sheet.space().describe(n)).collect();
            println!("{}", names.join(" -> "));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_attribute(sheet: &Sheet, name: &str, attr: &str) {
    let found = sheet.object(name).and_then(|id| sheet.space().lookup(id, attr));
    match found {
        Ok(found) => {
            let value = match Node::from_value(&found.value) {
                Some(node) => sheet.space().describe(&node),
                None => found.value.to_string(),
            };
            println!("{} (from {})", value, sheet.space().describe(&found.definer));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
