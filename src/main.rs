#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;

mod config;
mod error;
mod model;
mod parsers;
mod protocol;
mod services;

fn main() {
    // stdout carries the protocol, logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut core = protocol::Core::new();

    log::info!("term-core ready");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("failed to read request line: {e}");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| core.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                log::error!("panic while handling request");
                core.recover();
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
