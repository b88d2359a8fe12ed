use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use super::ScenarioResult;

fn ending_tally(results: &[ScenarioResult]) -> BTreeMap<String, usize> {
    let mut tally = BTreeMap::new();
    for run in results.iter().flat_map(|result| &result.runs) {
        let key = run
            .ending
            .map_or_else(|| "(no ending)".to_string(), |kind| kind.key().to_string());
        *tally.entry(key).or_insert(0) += 1;
    }
    tally
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len().max(1) as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Dream Run Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.name().bold())?;
        writeln!(
            out,
            "   Endings: {}/{} runs",
            result.endings_reached(),
            result.runs.len()
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        let failures: Vec<String> = result.failures().collect();
        if !failures.is_empty() {
            writeln!(out, "   Violations:")?;
            for failure in failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", "🌙 Endings Reached".bright_yellow().bold())?;
    writeln!(out, "{}", "==================".yellow())?;
    for (ending, count) in ending_tally(results) {
        writeln!(out, "{ending:20} {count}")?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Reverie Dream Run Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Endings\n")?;
    writeln!(out, "| Ending | Runs |")?;
    writeln!(out, "|---|---|")?;
    for (ending, count) in ending_tally(results) {
        writeln!(out, "| {ending} | {count} |")?;
    }
    writeln!(out)?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.name())?;
        writeln!(out, "| Seed | Steps | Ending | Coherence | Karma | Fingerprint |")?;
        writeln!(out, "|---|---|---|---|---|---|")?;
        for run in &result.runs {
            writeln!(
                out,
                "| {} | {} | {} | {:.1} | {} | {:016x} |",
                run.seed,
                run.steps,
                run.ending_title.as_deref().unwrap_or("-"),
                run.coherence,
                run.karma,
                run.fingerprint
            )?;
        }
        let failures: Vec<String> = result.failures().collect();
        if !failures.is_empty() {
            writeln!(out, "\n- **Violations**:")?;
            for failure in failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
