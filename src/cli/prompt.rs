//! Interactive yes/no confirmation

use std::io::{self, BufRead, Write};

/// Ask a yes/no question; only `y` or `yes` (any case) confirms.
///
/// End of input counts as "no".
pub fn confirm<R: BufRead, W: Write>(question: &str, mut input: R, mut output: W) -> io::Result<bool> {
    write!(output, "{} (y/n): ", question)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// [`confirm`] on the process's stdin and stdout
pub fn confirm_stdin(question: &str) -> io::Result<bool> {
    confirm(question, io::stdin().lock(), io::stdout())
}
