use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::{ModePlan, PolicyKind, RunResult};

/// Everything one tester invocation reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub continent: String,
    pub countries: usize,
    pub policy: PolicyKind,
    pub modes: ModePlan,
    pub rounds: u32,
    pub runs: Vec<RunResult>,
    pub total_duration_ms: u64,
}

impl RunReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|r| r.passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.runs.len() - self.passed()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        (self.passed() as f64 / self.runs.len() as f64) * 100.0
    }
}

pub fn generate_console_report<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Quiz Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;
    writeln!(
        out,
        "Map: {} ({} countries)",
        report.continent.bold(),
        report.countries
    )?;
    writeln!(
        out,
        "Policy: {}  Modes: {}  Rounds: {}",
        report.policy,
        report.modes.label(),
        report.rounds
    )?;
    writeln!(out, "Seeds: {}", report.runs.len())?;
    writeln!(out, "Passed: {}", report.passed().to_string().green())?;
    writeln!(out, "Failed: {}", report.failed().to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", report.success_rate())?;
    writeln!(out, "Total time: {}ms", report.total_duration_ms)?;
    writeln!(out)?;

    for run in &report.runs {
        let status = if run.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} seed {}", status, run.seed.to_string().bold())?;
        writeln!(
            out,
            "   Rounds: {}  Score: {}  Cycles: {}",
            run.rounds_played, run.final_score, run.cycles_completed
        )?;
        writeln!(
            out,
            "   Countries: {} hit / {} missed  Cities: {} hit / {} missed",
            run.stats.country_hits,
            run.stats.country_misses,
            run.stats.city_hits,
            run.stats.city_misses
        )?;
        if !run.violations.is_empty() {
            writeln!(out, "   Violations:")?;
            for violation in &run.violations {
                writeln!(out, "     • {}", violation.red())?;
            }
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    writeln!(out, "# GeoQuiz Simulation Results\n")?;
    writeln!(out, "_Generated {}_\n", report.generated_at)?;
    writeln!(out, "## Summary\n")?;
    writeln!(
        out,
        "- **Map**: {} ({} countries)",
        report.continent, report.countries
    )?;
    writeln!(out, "- **Policy**: {}", report.policy)?;
    writeln!(out, "- **Modes**: {}", report.modes.label())?;
    writeln!(out, "- **Rounds per seed**: {}", report.rounds)?;
    writeln!(out, "- **Passed**: {}", report.passed())?;
    writeln!(out, "- **Failed**: {}", report.failed())?;
    writeln!(out, "- **Success rate**: {:.1}%\n", report.success_rate())?;

    writeln!(out, "## Runs\n")?;
    writeln!(out, "| Seed | Status | Rounds | Score | Cycles | Misses (country/city) |")?;
    writeln!(out, "|------|--------|--------|-------|--------|-----------------------|")?;
    for run in &report.runs {
        let status = if run.passed() { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {}/{} |",
            run.seed,
            status,
            run.rounds_played,
            run.final_score,
            run.cycles_completed,
            run.stats.country_misses,
            run.stats.city_misses
        )?;
    }

    let failing: Vec<&RunResult> = report.runs.iter().filter(|r| !r.passed()).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Violations\n")?;
        for run in failing {
            writeln!(out, "### Seed {}\n", run.seed)?;
            for violation in &run.violations {
                writeln!(out, "- {violation}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::simulation::RunStats;

    fn run(seed: u64, violations: &[&str]) -> RunResult {
        RunResult {
            seed,
            policy: PolicyKind::Random,
            modes: ModePlan::Alternate,
            rounds_played: 4,
            final_score: 40,
            cycles_completed: 0,
            stats: RunStats {
                country_hits: 4,
                country_misses: 2,
                city_hits: 4,
                city_misses: 2,
            },
            violations: violations.iter().map(ToString::to_string).collect(),
            duration_ms: 1,
        }
    }

    fn report() -> RunReport {
        RunReport {
            generated_at: "2024-03-09T14:05:00Z".into(),
            continent: "europe".into(),
            countries: 5,
            policy: PolicyKind::Random,
            modes: ModePlan::Alternate,
            rounds: 4,
            runs: vec![run(1, &[]), run(2, &["round 3: score moved by 5, expected 10"])],
            total_duration_ms: 3,
        }
    }

    #[test]
    fn summary_counts_failures() {
        let report = report();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!((report.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn json_report_serializes_runs() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["policy"], "random");
        assert_eq!(value["modes"], "alternate");
        assert_eq!(value["runs"].as_array().unwrap().len(), 2);
        assert_eq!(value["runs"][0]["stats"]["city_misses"], 2);
    }

    #[test]
    fn markdown_report_lists_violations() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# GeoQuiz Simulation Results"));
        assert!(text.contains("| 2 | ❌ | 4 | 40 | 0 | 2/2 |"));
        assert!(text.contains("### Seed 2"));
        assert!(!text.contains("### Seed 1\n"));
    }

    #[test]
    fn console_report_mentions_each_seed() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_console_report(&mut out, &report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("✅ PASS seed 1"));
        assert!(text.contains("❌ FAIL seed 2"));
        assert!(text.contains("score moved by 5"));
    }
}
