//! Interactive prompts
//!
//! Used by `link edit` and `link delete` when stdin is a terminal.

use anyhow::Result;
use std::io::{self, BufRead, IsTerminal, Write};

/// Prompt for yes/no confirmation
///
/// Anything other than "y" or "yes" counts as no. When stdin is not a
/// terminal there is nobody to ask, so the answer is no.
pub fn confirm(prompt: &str) -> Result<bool> {
    // std's IsTerminal instead of atty, which is unmaintained (RUSTSEC-2021-0145)
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(is_yes(&input))
}

/// Prompt with a default value, returns None if user keeps default
pub fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(non_empty(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn non_empty(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}
