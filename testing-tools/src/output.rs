use colored::*;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

pub fn print_response(scenario: &str, response: &Value) {
    let status = response["status"].as_str().unwrap_or("missing");
    let status_colored = if status == "success" {
        status.green()
    } else {
        status.yellow()
    };

    println!(
        "\n[{}] endpoint answered {}",
        scenario.bright_blue().bold(),
        status_colored
    );

    if let Ok(pretty) = serde_json::to_string_pretty(response) {
        println!("   {}", pretty.dimmed());
    }
}

pub fn print_test_summary(results: &[TestResult]) {
    println!("\n{}", "=== TEST SUMMARY ===".bright_white().bold());

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("[{}] {} ({:?})", status, result.scenario, result.duration);

        if let Some(msg) = &result.message {
            println!("      {}", msg.dimmed());
        }
    }

    println!(
        "\n{}: {} passed, {} failed",
        "Results".bold(),
        passed.to_string().green(),
        failed.to_string().red()
    );
}
