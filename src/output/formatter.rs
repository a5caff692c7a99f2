//! Output formatters for batch plans
//!
//! Provides table, JSON, CSV and raw command output.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::plan::{Plan, PlanEntry};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    /// One shell command per line
    Commands,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "commands" | "sh" => Some(OutputFormat::Commands),
            _ => None,
        }
    }
}

/// Plan formatter
pub struct PlanFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl PlanFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a whole plan
    pub fn format_plan(&self, plan: &Plan) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_plan_table(plan)),
            OutputFormat::Json => serde_json::to_string(plan).context("Failed to serialize plan"),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(plan).context("Failed to serialize plan")
            }
            OutputFormat::Csv => self.format_plan_csv(plan),
            OutputFormat::Commands => Ok(self.format_plan_commands(plan)),
        }
    }

    fn format_plan_table(&self, plan: &Plan) -> String {
        let mut output = String::new();

        let target = plan
            .target_size
            .map(|t| t.to_string())
            .unwrap_or_else(|| "off".to_string());

        output.push_str("\n═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Batch Plan: {} units, {} functions, {} processes\n",
            plan.unit_count(),
            plan.total_functions,
            plan.processes
        ));
        output.push_str(&format!(
            " Batch size: {} (target {} functions per batch)\n",
            plan.batch_size, target
        ));
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        for entry in &plan.entries {
            output.push_str(&self.format_entry_table(entry, plan.target_size));
        }

        output.push_str("───────────────────────────────────────────────────────────────\n");
        output
    }

    fn format_entry_table(&self, entry: &PlanEntry, target_size: Option<usize>) -> String {
        let count = format!("{:4}", entry.function_count);
        let oversized = target_size.is_some_and(|t| entry.function_count > t);
        let count = if self.colorize && oversized {
            format!("\x1b[33m{count}\x1b[0m")
        } else {
            count
        };

        format!(
            " {:3}. {:6} {} fn  {}\n      {}\n",
            entry.index,
            entry.kind,
            count,
            entry.classes.join(" "),
            entry.command
        )
    }

    fn format_plan_csv(&self, plan: &Plan) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["index", "kind", "function_count", "classes", "command"])?;

        for entry in &plan.entries {
            writer.write_record([
                entry.index.to_string(),
                entry.kind.to_string(),
                entry.function_count.to_string(),
                entry.classes.join(" "),
                entry.command.clone(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }

    fn format_plan_commands(&self, plan: &Plan) -> String {
        plan.entries
            .iter()
            .map(|e| format!("{}\n", e.command))
            .collect()
    }
}

impl Default for PlanFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Write a plan to a file
pub fn write_plan_to_file(path: impl AsRef<Path>, plan: &Plan, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    let content = PlanFormatter::new(format).no_color().format_plan(plan)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batcher::Batcher;
    use crate::models::{BatchSizePolicy, CommandOptions, Suite};
    use tempfile::tempdir;

    fn plan() -> Plan {
        let suites = vec![
            Suite::new("tests/A.php", "A", vec!["t1".to_string(), "t2".to_string()]),
            Suite::new("tests/B.php", "B", vec!["t3".to_string()]),
            Suite::new("tests/Big.php", "Big", (0..9).map(|i| format!("t{i}")).collect()),
        ];
        let batcher = Batcher::new(2, BatchSizePolicy::Fixed(5));
        let units = batcher.batch_suites(suites);
        Plan::new(&batcher, &units, "phpunit", &CommandOptions::new())
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("sh"), Some(OutputFormat::Commands));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = PlanFormatter::new(OutputFormat::Json).no_color();
        assert_eq!(formatter.format, OutputFormat::Json);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_format_table() {
        let output = PlanFormatter::default().no_color().format_plan(&plan()).unwrap();
        assert!(output.contains("Batch Plan: 2 units, 12 functions, 2 processes"));
        assert!(output.contains("A B"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_format_json() {
        let output = PlanFormatter::new(OutputFormat::Json)
            .format_plan(&plan())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["target_size"], 5);
        assert_eq!(value["entries"][0]["classes"][0], "Big");
        assert_eq!(value["entries"][1]["kind"], "batch");
    }

    #[test]
    fn test_format_csv() {
        let output = PlanFormatter::new(OutputFormat::Csv)
            .format_plan(&plan())
            .unwrap();
        let mut reader = csv::Reader::from_reader(output.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][3], "A B");
    }

    #[test]
    fn test_format_commands() {
        let output = PlanFormatter::new(OutputFormat::Commands)
            .format_plan(&plan())
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("env ")));
    }

    #[test]
    fn test_write_plan_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.json");
        write_plan_to_file(&path, &plan(), OutputFormat::JsonPretty).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"total_functions\": 12"));
    }
}
