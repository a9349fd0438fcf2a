//! Interactive prompt loop wrapping the comparer.

use std::io::{self, Write};
use std::sync::Mutex;

use indicatif::ProgressBar;
use log::{error, info};

use crate::comparer::{Comparer, ProgressSink};
use crate::present;

/// Renders fan-out progress as a terminal bar on stderr.
struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ProgressSink for BarProgress {
    fn start(&self, total: u64) {
        *self.bar.lock().unwrap() = Some(ProgressBar::new(total));
    }

    fn tick(&self) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

pub async fn run(comparer: Comparer, score_limit: usize) {
    println!("Welcome to the osu! score comparer!\n");

    loop {
        let Some(username_a) = prompt("Insert your username (or type 'q' to quit): ") else {
            break;
        };
        if username_a.eq_ignore_ascii_case("q") {
            break;
        }
        if username_a.is_empty() {
            continue;
        }
        let Some(username_b) = prompt("Insert the other user's username: ") else {
            break;
        };
        let limit = prompt_limit(score_limit);

        let progress = BarProgress::new();
        let outcome = tokio::select! {
            result = comparer.run(&username_a, &username_b, limit, &progress) => result,
            _ = tokio::signal::ctrl_c() => {
                // dropping the run future cancels all in-flight requests
                progress.finish();
                info!("Comparison aborted");
                continue;
            }
        };
        progress.finish();

        match outcome {
            Ok(comparisons) => present::present(&comparisons, &username_a, &username_b),
            Err(e) => error!("{}", e),
        }

        println!("\n--- Next comparison ---\n");
    }
}

fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

fn prompt_limit(score_limit: usize) -> usize {
    let message = format!("Insert the amount of scores to fetch (max {}): ", score_limit);
    let Some(raw) = prompt(&message) else {
        return score_limit;
    };
    if raw.is_empty() {
        return score_limit;
    }
    match raw.parse() {
        Ok(limit) => limit,
        Err(_) => {
            println!("Invalid input, using the default of {}.", score_limit);
            score_limit
        }
    }
}
