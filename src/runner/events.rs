use super::state::TestSummary;
use crate::report::types::Status;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Test execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    SessionStarted {
        session_id: String,
        base_url: String,
        total: usize,
    },
    SessionFinished {
        summary: TestSummary,
    },

    TestStarted {
        test_id: String,
        title: String,
    },
    TestFinished {
        test_id: String,
        status: Status,
        duration_ms: u64,
        error: Option<String>,
    },

    Log {
        message: String,
    },
}

/// Receives events from the executor
pub trait EventListener {
    fn on_event(&mut self, event: &TestEvent);
}

/// Fans events out to every registered listener
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn emit(&mut self, event: TestEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener {
    spinner: Option<ProgressBar>,
    is_tty: bool,
}

impl Default for ConsoleEventListener {
    fn default() -> Self {
        use std::io::IsTerminal;
        Self {
            spinner: None,
            is_tty: std::io::stdout().is_terminal(),
        }
    }
}

impl ConsoleEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&mut self, message: String) {
        let pb = ProgressBar::new_spinner();
        if !self.is_tty {
            // No escape codes when output is piped
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("  {spinner} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(StdDuration::from_millis(100));
        self.spinner = Some(pb);
    }
}

impl EventListener for ConsoleEventListener {
    fn on_event(&mut self, event: &TestEvent) {
        use colored::Colorize;

        match event {
            TestEvent::SessionStarted {
                session_id,
                base_url,
                total,
            } => {
                println!(
                    "\n{} Test session started: {}",
                    "▶".green().bold(),
                    session_id.cyan()
                );
                println!("  Target: {}", base_url.cyan());
                println!("  Tests: {}", total);
            }

            TestEvent::TestStarted { test_id, .. } => {
                self.start_spinner(format!("{}... ", test_id.dimmed()));
            }

            TestEvent::TestFinished {
                test_id,
                status,
                duration_ms,
                error,
            } => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
                let icon = match status {
                    Status::Passed => "✓".green(),
                    Status::Failed => "✗".red(),
                    Status::Broken => "!".red().bold(),
                    Status::Skipped => "○".yellow(),
                };
                println!("  {} {} ({}ms)", icon, test_id, duration_ms);
                if let Some(error) = error {
                    for line in error.lines() {
                        println!("      {}", line.red());
                    }
                }
            }

            TestEvent::Log { message } => match &self.spinner {
                Some(pb) => pb.println(format!("      {}", message)),
                None => println!("      {}", message),
            },

            TestEvent::SessionFinished { summary } => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
                println!("\n{} Test session finished", "■".blue().bold());
                println!("  Total tests: {}", summary.total);
                println!(
                    "  {} passed, {} failed, {} broken, {} skipped",
                    summary.passed.to_string().green(),
                    summary.failed.to_string().red(),
                    summary.broken.to_string().red(),
                    summary.skipped.to_string().yellow()
                );
                if let Some(duration) = summary.total_duration_ms {
                    println!("  Duration: {}ms", duration);
                }
            }
        }
    }
}
