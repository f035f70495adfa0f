//! Host capabilities. The interpreter never constructs these itself: the
//! embedder passes a [`System`] to [`crate::Interpreter::new`], and each
//! native function is handed only the capability it needs.
//!
//! Every call blocks the interpreter until it returns.

use std::io;
use std::time::Duration;

pub trait Console {
    /// Reads one line of input without its line terminator. Returns `None`
    /// once input is exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Clears the display.
    fn clear(&mut self) -> io::Result<()>;
}

pub trait Clock {
    /// Time elapsed since the Unix epoch.
    fn now(&self) -> Duration;
}

pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}

/// Everything a program may ask of its host.
pub trait System: Console + Clock + Sleep {}

impl<T: Console + Clock + Sleep> System for T {}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::io;
    use std::time::Duration;

    use super::{Clock, Console, Sleep};

    /// A host with canned input and recorded output.
    #[derive(Debug, Default)]
    pub struct Script {
        pub input: VecDeque<String>,
        pub output: Vec<String>,
        pub clears: usize,
        pub now: Duration,
        pub slept: Vec<Duration>,
    }

    impl Script {
        pub fn with_input(lines: &[&str]) -> Self {
            Self { input: lines.iter().map(ToString::to_string).collect(), ..Self::default() }
        }
    }

    impl Console for Script {
        fn read_line(&mut self) -> io::Result<Option<String>> {
            Ok(self.input.pop_front())
        }

        fn write_line(&mut self, line: &str) -> io::Result<()> {
            self.output.push(line.to_string());
            Ok(())
        }

        fn clear(&mut self) -> io::Result<()> {
            self.clears += 1;
            Ok(())
        }
    }

    impl Clock for Script {
        fn now(&self) -> Duration {
            self.now
        }
    }

    impl Sleep for Script {
        fn sleep(&mut self, duration: Duration) {
            self.slept.push(duration);
        }
    }
}
