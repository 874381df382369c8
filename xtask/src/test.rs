use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Features that make every test target of the workspace buildable on the host.
const HOST_FEATURES: &str = "linebuf/std,linebuf/tracing";

/// One `cargo test` invocation.
struct Suite {
    label: &'static str,
    args: &'static [&'static str],
}

const UNIT: &[Suite] = &[Suite {
    label: "unit (lib)",
    args: &["--workspace", "--lib", "--features", HOST_FEATURES],
}];

const INTEGRATION: &[Suite] = &[
    Suite {
        label: "linebuf integration",
        args: &[
            "-p",
            "linebuf",
            "--features",
            "std",
            "--test",
            "scenarios",
            "--test",
            "edit_proptest",
            "--test",
            "file_wrapper",
        ],
    },
    Suite {
        label: "platform integration",
        args: &["-p", "platform", "--features", "std", "--test", "store_proptest"],
    },
];

const DOC: &[Suite] = &[Suite {
    label: "doc",
    args: &["--workspace", "--doc", "--features", HOST_FEATURES],
}];

/// Totals from the `test result:` lines of one or more test binaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counts {
    passed: u32,
    failed: u32,
    ignored: u32,
}

impl Counts {
    fn add(&mut self, other: Counts) {
        self.passed = self.passed.saturating_add(other.passed);
        self.failed = self.failed.saturating_add(other.failed);
        self.ignored = self.ignored.saturating_add(other.ignored);
    }

    /// Sum every `test result: ok. 5 passed; 0 failed; 1 ignored; ...` line.
    fn parse(output: &str) -> Counts {
        let mut counts = Counts::default();
        for summary in output.lines().filter_map(|l| l.split("test result:").nth(1)) {
            for field in summary.split(';') {
                let mut words = field.split_whitespace().rev();
                let (Some(kind), Some(n)) = (words.next(), words.next()) else {
                    continue;
                };
                let n: u32 = n.parse().unwrap_or(0);
                match kind {
                    "passed" => counts.passed = counts.passed.saturating_add(n),
                    "failed" => counts.failed = counts.failed.saturating_add(n),
                    "ignored" => counts.ignored = counts.ignored.saturating_add(n),
                    _ => {}
                }
            }
        }
        counts
    }
}

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    let mut suites: Vec<&Suite> = Vec::new();
    if !integration_only {
        suites.extend(UNIT);
    }
    if !unit_only {
        suites.extend(INTEGRATION);
    }
    if !unit_only && !integration_only {
        suites.extend(DOC);
    }

    let start = Instant::now();
    let mut total = Counts::default();
    for suite in suites {
        total.add(run_suite(suite)?);
    }

    println!(
        "{}",
        format!(
            "✓ {} passed, {} ignored in {:.2}s",
            total.passed,
            total.ignored,
            start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    Ok(())
}

fn run_suite(suite: &Suite) -> Result<Counts> {
    print!("{}", format!("  {:<22}", suite.label).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .arg("test")
        .args(suite.args)
        .output()
        .with_context(|| format!("Failed to run {} tests", suite.label))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let counts = Counts::parse(&stdout);

    if !output.status.success() {
        println!("{}", "✗".red().bold());
        for line in stdout.lines().chain(String::from_utf8_lossy(&output.stderr).lines()) {
            eprintln!("    {line}");
        }
        anyhow::bail!("{} tests failed ({} failed)", suite.label, counts.failed);
    }

    println!(
        "{}",
        format!(
            "✓ {} passed in {:.2}s",
            counts.passed,
            start.elapsed().as_secs_f64()
        )
        .green()
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::Counts;

    #[test]
    fn sums_every_test_binary() {
        let out = "running 3 tests\n\
                   test result: ok. 3 passed; 0 failed; 1 ignored; 0 measured; 0 filtered out\n\
                   running 2 tests\n\
                   test result: FAILED. 2 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out\n";
        assert_eq!(
            Counts::parse(out),
            Counts {
                passed: 5,
                failed: 1,
                ignored: 1
            }
        );
    }

    #[test]
    fn output_without_results_counts_nothing() {
        assert_eq!(Counts::parse("error: could not compile"), Counts::default());
    }
}
