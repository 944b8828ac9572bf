use loxa::{Error, VM};

/// Interpret the source and return everything it printed to stdout.
#[allow(dead_code)]
pub fn run(src: &str) -> String {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = {
        let mut vm = VM::with_output(Box::new(&mut out), Box::new(&mut err));
        vm.interpret(src)
    };
    if result.is_err() {
        panic!(
            "program failed unexpectedly: {}",
            String::from_utf8_lossy(&err)
        );
    }
    String::from_utf8(out).expect("program output is UTF-8")
}

/// Interpret the source expecting a runtime failure, returning what was
/// reported to stderr (the message and the stack trace).
#[allow(dead_code)]
pub fn run_expecting_runtime_error(src: &str) -> String {
    let mut out = Vec::new();
    let mut err = Vec::new();
    {
        let mut vm = VM::with_output(Box::new(&mut out), Box::new(&mut err));
        match vm.interpret(src) {
            Err(Error::Runtime) => {}
            Err(Error::Compile) => panic!("expected a runtime error, got a compile error"),
            Ok(()) => panic!("expected a runtime error, program ran cleanly"),
        }
    }
    String::from_utf8(err).expect("error output is UTF-8")
}
