use std::io::{self, BufRead, Write};
use std::{env, fs, process};

use loxa::{Error, VM};

fn main() {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => repl(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: loxa [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("Could not read \"{}\": {}", path, err);
            process::exit(74);
        }
    };
    let mut vm = VM::default();
    match vm.interpret(&src) {
        Ok(()) => {}
        Err(Error::Compile) => process::exit(65),
        Err(Error::Runtime) => process::exit(70),
    }
}

fn repl() {
    let mut vm = VM::default();
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            // Errors never end the session; the next line starts fresh.
            Ok(n) if n > 0 => {
                let _ = vm.interpret(&line);
            }
            _ => break,
        }
    }
    println!();
}
