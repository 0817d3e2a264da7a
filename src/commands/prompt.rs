//! Interactive prompts on stdin

use std::io::{self, Write};

use colored::*;

use crate::utils::errors::AppResult;

/// Print `label` and read one trimmed line
pub fn ask(label: &str) -> AppResult<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn heading(title: &str) {
    println!();
    println!("{}", title.bright_green().bold());
    println!("{}", "=".repeat(title.chars().count()).bright_green());
}
