use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rill_interpreter::{Clock, Console, Sleep};

/// The terminal: standard input and output, the system clock and the
/// current thread.
#[derive(Debug, Default)]
pub struct Stdio;

impl Console for Stdio {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(len);
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{line}")
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        // Erase the screen, then move the cursor to the top left.
        write!(stdout, "\x1b[2J\x1b[1;1H")?;
        stdout.flush()
    }
}

impl Clock for Stdio {
    fn now(&self) -> Duration {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
    }
}

impl Sleep for Stdio {
    fn sleep(&mut self, duration: Duration) {
        io::stdout().flush().ok();
        thread::sleep(duration);
    }
}
