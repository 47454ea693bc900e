use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};

use mamushi::{Interpreter, RuntimeError};

fn print_error(prefix: &str, err: &RuntimeError) {
    eprintln!("{}: {}", prefix, err);
    let mut meta = Vec::new();
    if let Some(code) = err.code {
        meta.push(format!("code={}", code));
        if code.is_parse() {
            meta.push("kind=parse".to_string());
        }
    }
    if let Some(line) = err.line {
        meta.push(format!("line={}", line));
    }
    if !meta.is_empty() {
        eprintln!("{} metadata: {}", prefix, meta.join(", "));
    }
    if let Some(hint) = &err.hint {
        eprintln!("{} hint: {}", prefix, hint);
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut dump_ast = false;
    let mut repl_flag = false;
    let mut filtered_args: Vec<String> = Vec::new();
    for arg in &args[1..] {
        if arg == "--dump-ast" {
            dump_ast = true;
        } else if arg == "--repl" {
            repl_flag = true;
        } else {
            filtered_args.push(arg.clone());
        }
    }

    if repl_flag || (filtered_args.is_empty() && io::stdin().is_terminal()) {
        mamushi::repl::run_repl();
        return;
    }

    let input = if !filtered_args.is_empty() && filtered_args[0] == "-e" {
        if filtered_args.len() < 2 {
            eprintln!("Usage: {} -e <code>", args[0]);
            std::process::exit(1);
        }
        filtered_args[1].clone()
    } else if !filtered_args.is_empty() {
        fs::read_to_string(&filtered_args[0]).unwrap_or_else(|err| {
            eprintln!("Failed to read {}: {}", filtered_args[0], err);
            std::process::exit(1);
        })
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).unwrap_or_else(|err| {
            eprintln!("Failed to read stdin: {}", err);
            std::process::exit(1);
        });
        buf
    };

    if dump_ast {
        match mamushi::dump_ast(&input) {
            Ok(ast) => println!("{}", ast),
            Err(err) => {
                print_error("Parse error", &err);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut interpreter = Interpreter::new();
    match interpreter.run(&input) {
        Ok(output) => {
            print!("{}", output);
            let code = interpreter.exit_code();
            if code != 0 {
                std::process::exit(i32::try_from(code).unwrap_or(1));
            }
        }
        Err(err) => {
            print_error("Runtime error", &err);
            let output = interpreter.output();
            if !output.is_empty() {
                print!("{}", output);
            }
            std::process::exit(1);
        }
    }
}
