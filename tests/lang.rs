use pretty_assertions::assert_eq;
use rill_interpreter::{Clock, Console, Interpreter, Sleep};
use test_generator::test_resources;

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::time::Duration;

/// Feeds `// in: ` lines to the program and records everything it writes.
#[derive(Default)]
struct Script {
    input: VecDeque<String>,
    output: String,
}

impl Console for Script {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output += line;
        self.output += "\n";
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Clock for Script {
    fn now(&self) -> Duration {
        Duration::ZERO
    }
}

impl Sleep for Script {
    fn sleep(&mut self, _: Duration) {}
}

#[test_resources("res/examples/**/*.rill")]
fn rill(path: &str) {
    let source =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("could not read test file: {path}"));

    const IN_COMMENT: &str = "// in: ";
    const OUT_COMMENT: &str = "// out: ";
    let mut script = Script::default();
    let mut exp_output = String::new();
    for line in source.lines() {
        if let Some(idx) = line.find(IN_COMMENT) {
            script.input.push_back(line[idx + IN_COMMENT.len()..].to_string());
        }
        if let Some(idx) = line.find(OUT_COMMENT) {
            exp_output += &line[idx + OUT_COMMENT.len()..];
            exp_output += "\n";
        }
    }

    let mut interpreter = Interpreter::new(script);
    if let Err(errors) = interpreter.run_source(&source) {
        let (e, _) = errors.first().expect("received empty error");
        interpreter.system_mut().output += &format!("{e}\n");
    }
    assert_eq!(exp_output, interpreter.system().output);
}
