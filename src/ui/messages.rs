//! User-facing notifications. Diagnostics go through the `log` facade;
//! anything the user must see about an explicit action goes through here.

use crate::utils::colors::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};
use std::fmt;
use std::io::{self, BufRead, Write};

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", GREEN, BOLD, ICON_OK, RESET, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", YELLOW, BOLD, ICON_WARN, RESET, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", RED, BOLD, ICON_ERR, RESET, msg);
}

pub fn header<T: fmt::Display>(msg: T) {
    println!("{}{}── {} ──{}", BLUE, BOLD, msg, RESET);
}

/// Ask for a single line on stdin after printing `prompt`.
/// EOF or a read failure yields an empty answer.
pub fn read_answer(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(_) => s.trim().to_string(),
        Err(_) => String::new(),
    }
}
