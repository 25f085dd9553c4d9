//! List checks command implementation.

use treelint_checks::{all_checks, Preset};

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<26} {:<9} Description", "Name", "Severity");
    println!("{}", "-".repeat(80));

    for check in all_checks() {
        println!(
            "{:<26} {:<9} {}",
            check.name(),
            check.default_severity().to_string(),
            check.description()
        );
    }

    println!("\nPresets:");
    for preset in Preset::ALL {
        let default = if preset == Preset::default() { " (default)" } else { "" };
        println!("  {:<12} - {}{}", preset.name(), preset.checks().join(", "), default);
    }

    println!("\nUse --checks to run specific checks, e.g.:");
    println!("  treelint check --checks empty-block,magic-number");
}
