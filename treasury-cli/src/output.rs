//! Output abstraction for testable printing
//!
//! Separates I/O from command logic by providing a trait that can be mocked
//! in tests and implemented for real console output.

use crate::error::CliResult;

/// Output abstraction for printing results
pub trait Output: Send + Sync {
    /// Print normal output
    fn print(&self, msg: &str) -> CliResult<()>;

    /// Print formatted JSON
    fn print_json(&self, data: &serde_json::Value) -> CliResult<()> {
        self.print(&serde_json::to_string_pretty(data)?)
    }

    /// Print error message
    fn error(&self, msg: &str) -> CliResult<()>;

    /// Print success message
    fn success(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("✅ {}", msg))
    }

    /// Print warning message
    fn warning(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("⚠️  {}", msg))
    }

    /// Print info message
    fn info(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("ℹ️  {}", msg))
    }

    /// Print a section header
    fn header(&self, title: &str) -> CliResult<()> {
        self.print(&format!("\n{}\n{}", title, "=".repeat(title.len())))
    }
}

/// Standard console output implementation
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn print(&self, msg: &str) -> CliResult<()> {
        println!("{}", msg);
        Ok(())
    }

    fn error(&self, msg: &str) -> CliResult<()> {
        eprintln!("❌ {}", msg);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock output for testing - captures all output
    pub struct MockOutput {
        messages: Arc<Mutex<Vec<String>>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl MockOutput {
        pub fn new() -> Self {
            MockOutput {
                messages: Arc::new(Mutex::new(Vec::new())),
                errors: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn get_messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        pub fn get_errors(&self) -> Vec<String> {
            self.errors.lock().unwrap().clone()
        }

        pub fn assert_contains_message(&self, substring: &str) {
            let messages = self.get_messages();
            assert!(
                messages.iter().any(|m| m.contains(substring)),
                "Expected message containing '{}', but got: {:?}",
                substring,
                messages
            );
        }
    }

    impl Default for MockOutput {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Output for MockOutput {
        fn print(&self, msg: &str) -> CliResult<()> {
            self.messages.lock().unwrap().push(msg.to_string());
            Ok(())
        }

        fn error(&self, msg: &str) -> CliResult<()> {
            self.errors.lock().unwrap().push(msg.to_string());
            Ok(())
        }
    }
}
