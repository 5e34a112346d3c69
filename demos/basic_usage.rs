//! Basic logger usage example
//!
//! Demonstrates dual info/error files, derived loggers, redaction, rate
//! limiting and the process-wide logger.
//!
//! Run with: cargo run --example basic_usage

use dual_stream_logger::prelude::*;
use dual_stream_logger::{global, info, warn};
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Dual Stream Logger - Basic Usage Example ===\n");

    let log_dir = std::env::temp_dir().join("dual_stream_logger_demo");

    let config = Config::default()
        .with_log_dir(&log_dir)
        .with_app_name("demo")
        .with_level(LogLevel::Debug)
        .with_field_mask("password", "***")
        .with_regex_filter(r"\b\d{4}-\d{4}-\d{4}-\d{4}\b", "****-****-****-****")
        .with_rate_limit(LogLevel::Debug, 3, Duration::from_secs(1));

    let logger = Logger::new(config)?;

    println!("1. Logging at different levels (Warn and Error go to stderr and the error file):");
    logger.debug("cache warmed", attrs!["entries" => 128]);
    logger.info("server listening", attrs!["port" => 8080]);
    logger.warn("slow request", attrs!["latency_ms" => 950]);
    logger.error("upstream unavailable", attrs!["upstream" => "ledger"]);

    println!("\n2. Derived loggers and groups:");
    let http = logger.with(attrs!["component" => "http"]).with_group("req");
    http.info("accepted", attrs!["method" => "POST", "path" => "/login"]);
    info!(http, { "user" => "alice" }, "login attempt {}", 1);

    println!("\n3. Redaction:");
    logger.info(
        "payment",
        attrs!["password" => "hunter2", "card" => "4111-1111-1111-1111"],
    );

    println!("\n4. Rate limiting (at most 3 debug records per second):");
    for i in 0..10 {
        logger.debug("poll", attrs!["i" => i]);
    }

    println!("\n5. Changing the level at runtime:");
    logger.set_level(LogLevel::Warn);
    logger.info("hidden", []);
    warn!(logger, "visible at {}", logger.level());

    logger.flush()?;
    println!("\nFiles in {}:", log_dir.display());
    for name in logger.log_files()? {
        println!("   {}", name);
    }
    let metrics = logger.metrics();
    println!(
        "Logged {} records, dropped {} ({:.1}%)",
        metrics.total_logged(),
        metrics.total_dropped(),
        metrics.drop_rate()
    );
    logger.close()?;

    println!("\n6. Process-wide logger:");
    global::init(
        Config::default()
            .with_log_dir(&log_dir)
            .with_app_name("demo_global"),
    )?;
    global::info("hello from the global logger", attrs!["pid" => std::process::id()]);
    global::close()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
