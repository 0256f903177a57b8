//! Confirmation seam for destructive sync actions.

use crate::ui::messages::{read_answer, warning};

pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Fixed answer: `--yes` on the CLI, scripted answers in tests.
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Ask on the terminal; anything but y/yes is a refusal.
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        warning(prompt);
        let answer = read_answer("Confirm [y/N]: ");
        matches!(answer.to_lowercase().as_str(), "y" | "yes")
    }
}
