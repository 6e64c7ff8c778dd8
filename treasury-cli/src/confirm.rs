//! Injected confirmation capability.
//!
//! Every irreversible submission passes through a `Confirm` implementation:
//! an interactive Y/N prompt for operator runs, an auto-approving one when
//! `--yes` is passed or under automation. Both share the same command code
//! path; there is no environment-variable bypass inside the commands.

use crate::error::CliResult;
use std::io::{BufRead, Write};

/// Confirmation capability: asked once per irreversible action.
pub trait Confirm: Send + Sync {
    /// Return true to proceed, false to abort.
    fn confirm(&self, prompt: &str) -> CliResult<bool>;
}

/// Blocking Y/N prompt on stdin/stderr.
pub struct InteractivePrompt;

impl Confirm for InteractivePrompt {
    fn confirm(&self, prompt: &str) -> CliResult<bool> {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        write!(handle, "{} [y/N]: ", prompt)?;
        handle.flush()?;

        let stdin = std::io::stdin();
        let mut answer = String::new();
        stdin.lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

/// Always proceeds. Selected by `--yes` and used by automated runs.
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&self, _prompt: &str) -> CliResult<bool> {
        Ok(true)
    }
}

/// Pick the confirmation capability for this invocation.
pub fn for_invocation(auto_yes: bool) -> Box<dyn Confirm> {
    if auto_yes {
        Box::new(AutoApprove)
    } else {
        Box::new(InteractivePrompt)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted confirmation for tests: answers in order, records prompts.
    pub struct MockConfirm {
        answers: Arc<Mutex<Vec<bool>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl MockConfirm {
        /// Answers are consumed front to back; running out means "no".
        pub fn with_answers(answers: Vec<bool>) -> Self {
            MockConfirm {
                answers: Arc::new(Mutex::new(answers)),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn always_yes() -> Self {
            Self::with_answers(vec![true; 16])
        }

        pub fn always_no() -> Self {
            Self::with_answers(Vec::new())
        }

        pub fn get_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl Confirm for MockConfirm {
        fn confirm(&self, prompt: &str) -> CliResult<bool> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                Ok(false)
            } else {
                Ok(answers.remove(0))
            }
        }
    }
}
