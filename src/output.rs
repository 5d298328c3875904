use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::app::{Dashboard, ExerciseResult, TiersResult};
use crate::metrics::ExerciseSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_dashboard(result: &Dashboard) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_exercise(result: &ExerciseResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_tiers(result: &TiersResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn render<T: Serialize>(value: &T) -> io::Result<String> {
        serde_json::to_string_pretty(value).map_err(io::Error::other)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = Self::render(value)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn render_dashboard(result: &Dashboard) -> String {
        let report = &result.report;
        let progression = &report.progression;
        let mut lines = vec![
            format!(
                "Hello, {}.",
                result.display_name.as_deref().unwrap_or("Athlete")
            ),
            format!(
                "Level: {}  {:.0} / {:.0} pts  ({}%)",
                progression.tier_name,
                progression.lifetime_volume,
                progression.tier_ceiling,
                progression.progress_pct
            ),
            format!(
                "Today ({}): {} entries, {:.1} kcal",
                report.today, report.today_totals.totals.entries, report.today_totals.totals.calories
            ),
            format!(
                "Streak: {} days (longest {})",
                report.streak.current, report.streak.longest
            ),
            String::new(),
            "Weekly frequency:".to_string(),
        ];
        lines.extend(
            report
                .weekdays
                .iter()
                .map(|day| format!("  {:<4} {}", day.label, day.totals.entries)),
        );
        lines.push(String::new());
        lines.push("Exercises:".to_string());
        lines.extend(report.exercises.iter().map(exercise_line));
        if !report.ingest.is_clean() {
            lines.push(String::new());
            lines.push(format!(
                "{} cell(s) replaced with defaults",
                report.ingest.issues.len()
            ));
        }
        lines.join("\n")
    }

    pub fn render_exercise(result: &ExerciseResult) -> String {
        let summary = &result.summary;
        let mut lines = vec![exercise_line(summary)];
        lines.extend(
            summary
                .history
                .iter()
                .map(|point| format!("  {}  {} {}", point.date.format("%d/%m/%Y"), point.load, summary.unit)),
        );
        lines.join("\n")
    }

    pub fn render_tiers(result: &TiersResult) -> String {
        result
            .tiers
            .iter()
            .map(|tier| format!("{:<14} {:>10.0} .. {:>10.0}", tier.name, tier.floor, tier.ceiling))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn exercise_line(summary: &ExerciseSummary) -> String {
    format!(
        "  {}: last {} {unit}, record {} {unit}, {} sessions",
        summary.exercise,
        summary.last,
        summary.record,
        summary.sessions,
        unit = summary.unit
    )
}
