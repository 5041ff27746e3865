use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::convert::{self, ConversionSummary};
use crate::error::Result;
use crate::loader;
use crate::output::{Format, format_ids};
use crate::schema::LegacySchema;
use crate::schema::remote_batch::RemoteBatch;
use crate::schema::shot_results::ShotResults;
use crate::store::files;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrateOptions {
    /// Convert and validate, but leave the filesystem untouched.
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub input: String,
    pub output: String,
    pub from: LegacySchema,
    pub target: &'static str,
    pub dry_run: bool,
    pub written: bool,
    pub bytes: usize,
    pub task_count: usize,
    #[serde(flatten)]
    pub summary: ConversionSummary,
    pub migrated_at: DateTime<Utc>,
    pub tool_version: &'static str,
}

pub fn run(input: &Path, from: LegacySchema, dry_run: bool, format: Format) -> Result<()> {
    let report = migrate(input, from, &MigrateOptions { dry_run })?;
    print_report(&report, format)
}

/// Migrate the batch document at `input` into `<input>.new`.
///
/// The converted document is serialized and loaded back before anything is
/// written; a document that fails to load is never persisted.
pub fn migrate(
    input: &Path,
    from: LegacySchema,
    options: &MigrateOptions,
) -> Result<MigrationReport> {
    let output = files::output_path(input);
    tracing::info!(input = %input.display(), %from, "reading legacy batch");

    let document = files::read_json(input)?;
    let (text, summary) = match from {
        LegacySchema::ShotResults => {
            let results = ShotResults::from_value(document)?;
            let converted = convert::shot_results_to_remote_batch(results)?;
            let text = serde_json::to_string_pretty(&converted.document.into_file())?;
            loader::loads_remote_batch(&text)?;
            (text, converted.summary)
        }
        LegacySchema::RemoteBatch => {
            let batch = RemoteBatch::from_value(document)?;
            let converted = convert::remote_batch_to_tagged(batch)?;
            let text = serde_json::to_string_pretty(&converted.document)?;
            loader::loads(&text)?;
            (text, converted.summary)
        }
    };
    tracing::info!(
        tasks = summary.task_ids.len(),
        layout = from.target(),
        "validated migrated batch"
    );

    if options.dry_run {
        tracing::info!(output = %output.display(), "dry run, skipping write");
    } else {
        files::write_atomic(&output, &text)?;
        tracing::info!(output = %output.display(), bytes = text.len(), "wrote migrated batch");
    }

    Ok(MigrationReport {
        input: input.display().to_string(),
        output: output.display().to_string(),
        from,
        target: from.target(),
        dry_run: options.dry_run,
        written: !options.dry_run,
        bytes: text.len(),
        task_count: summary.task_ids.len(),
        summary,
        migrated_at: Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION"),
    })
}

fn print_report(report: &MigrationReport, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            let mode = if report.dry_run { "dry-run" } else { "apply" };
            println!(
                "{} {}",
                "batch migration".bold(),
                format!("({mode})").dimmed()
            );
            println!("  {} {}", "input:".dimmed(), report.input);
            println!("  {} {}", "output:".dimmed(), report.output);
            println!("  {} {} -> {}", "layout:".dimmed(), report.from, report.target);
            println!(
                "  {} {} ({})",
                "tasks:".dimmed(),
                report.task_count,
                format_ids(&report.summary.task_ids, 8)
            );
            if !report.summary.parallel_decoder_tasks.is_empty() {
                println!(
                    "  {} {}",
                    "parallel decoders:".dimmed(),
                    format_ids(&report.summary.parallel_decoder_tasks, 8)
                );
            }
            if !report.summary.defaulted_metadata_tasks.is_empty() {
                println!(
                    "  {} {}",
                    "metadata defaulted:".dimmed(),
                    format_ids(&report.summary.defaulted_metadata_tasks, 8).yellow()
                );
            }

            if report.written {
                println!("\n{} ({} bytes)", "Migration written".green().bold(), report.bytes);
            } else {
                println!("\n{}", "Dry run: nothing written".yellow().bold());
            }
        }
        Format::Minimal => {
            let status = if report.written { "written" } else { "dry-run" };
            println!("{} {} {}", status, report.task_count, report.output);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tagged::TaskDocument;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::tempdir;

    const AQUILA_ARN: &str = "arn:aws:braket:us-east-1::device/qpu/quera/Aquila";

    fn write_input(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn migrate_in_place(input: &Path, from: LegacySchema) -> Result<MigrationReport> {
        migrate(input, from, &MigrateOptions::default())
    }

    fn remote_batch_input() -> Value {
        json!({
            "remote_batch": {
                "source": {"program": "adiabatic"},
                "name": "sweep",
                "tasks": [
                    [2, {"braket_task": {
                        "task_id": "arn:2",
                        "task_ir": {"quera_task_specification": {"nshots": 100}},
                        "task_result_ir": {"task_result_ir": {"task_status": "Completed"}},
                        "backend": {"braket_backend": AQUILA_ARN},
                        "parallel_decoder": {"parallel_decoder": {"sites": [[0, 1]]}},
                        "metadata": {"final_detuning": 40.0}
                    }}],
                    [0, {"braket_task": {
                        "task_id": null,
                        "task_ir": {"quera_task_specification": {"nshots": 100}},
                        "task_result_ir": {"task_result_ir": null},
                        "backend": {"braket_backend": AQUILA_ARN}
                    }}]
                ]
            }
        })
    }

    #[test]
    fn remote_batch_migration_writes_loadable_tagged_document() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "batch.json", &remote_batch_input());

        let report = migrate_in_place(&input, LegacySchema::RemoteBatch).unwrap();
        assert!(report.written);
        assert_eq!(report.task_count, 2);
        assert_eq!(report.summary.task_ids, vec![2, 0]);
        assert_eq!(report.summary.parallel_decoder_tasks, vec![2]);
        assert_eq!(report.summary.defaulted_metadata_tasks, vec![0]);

        let text = fs::read_to_string(files::output_path(&input)).unwrap();
        let doc = loader::loads(&text).unwrap();
        let (_, TaskDocument::BraketTask(first)) = &doc.tasks()[0];
        assert_eq!(first.metadata, json!({"final_detuning": 40.0}));
        assert_eq!(first.parallel_decoder, Some(json!({"sites": [[0, 1]]})));
    }

    #[test]
    fn shot_results_migration_matches_documented_scenario() {
        let dir = tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "shots.json",
            &json!({"hardware_task_shot_results": {"7": {
                "task_id": "abc123",
                "hardware_task": {"task_ir": {"x": 1}, "braket_backend": "aquila"},
                "task_result_ir": {"y": 2}
            }}}),
        );

        migrate_in_place(&input, LegacySchema::ShotResults).unwrap();

        let out: Value =
            serde_json::from_str(&fs::read_to_string(files::output_path(&input)).unwrap()).unwrap();
        assert_eq!(
            out["remote_batch"]["tasks"],
            json!([[7, {"braket_task": {
                "backend": {"braket_backend": "aquila"},
                "parallel_decoder": null,
                "task_id": "abc123",
                "task_result_ir": {"task_result_ir": {"y": 2}},
                "task_ir": {"quera_task_specification": {"x": 1}},
                "metadata": {}
            }}]])
        );
    }

    #[test]
    fn rerunning_produces_identical_output_and_leaves_input_alone() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "batch.json", &remote_batch_input());
        let original = fs::read(&input).unwrap();
        let output = files::output_path(&input);

        migrate_in_place(&input, LegacySchema::RemoteBatch).unwrap();
        let first = fs::read(&output).unwrap();
        migrate_in_place(&input, LegacySchema::RemoteBatch).unwrap();
        let second = fs::read(&output).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&input).unwrap(), original);
    }

    #[test]
    fn payload_key_order_is_preserved() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ordered.json");
        fs::write(
            &input,
            r#"{"remote_batch": {"source": null, "name": "o", "tasks": [[1, {"braket_task": {
                "task_id": "t",
                "task_ir": {"quera_task_specification": {"zeta": 1, "alpha": 2, "mid": 3}},
                "task_result_ir": {"task_result_ir": {}},
                "backend": {"braket_backend": "aquila"},
                "metadata": {}
            }}]]}}"#,
        )
        .unwrap();

        migrate_in_place(&input, LegacySchema::RemoteBatch).unwrap();

        let text = fs::read_to_string(files::output_path(&input)).unwrap();
        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        let mid = text.find("\"mid\"").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn numeric_payloads_are_copied_digit_for_digit() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("numbers.json");
        fs::write(
            &input,
            r#"{"remote_batch": {"source": {"seed": 123456789012345678901234567890}, "name": "n",
                "tasks": [[0, {"braket_task": {
                    "task_id": "t",
                    "task_ir": {"quera_task_specification": {"t": 1.0715660391465826e-75}},
                    "task_result_ir": {"task_result_ir": {"e": -1.603964615428183e143}},
                    "backend": {"braket_backend": "aquila"},
                    "metadata": {"detuning": 1e5, "offset": -18446744073709551617}
                }}]]}}"#,
        )
        .unwrap();

        migrate_in_place(&input, LegacySchema::RemoteBatch).unwrap();

        let text = fs::read_to_string(files::output_path(&input)).unwrap();
        for literal in [
            r#""seed": 123456789012345678901234567890"#,
            r#""t": 1.0715660391465826e-75"#,
            r#""e": -1.603964615428183e143"#,
            r#""detuning": 1e5"#,
            r#""offset": -18446744073709551617"#,
        ] {
            assert!(text.contains(literal), "missing {literal} in:\n{text}");
        }
    }

    #[test]
    fn dry_run_validates_without_writing() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "batch.json", &remote_batch_input());

        let options = MigrateOptions { dry_run: true };
        let report = migrate(&input, LegacySchema::RemoteBatch, &options).unwrap();
        assert!(report.dry_run);
        assert!(!report.written);
        assert!(report.bytes > 0);
        assert!(!files::output_path(&input).exists());
    }

    #[test]
    fn wrong_variant_is_a_schema_error_with_no_output() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "batch.json", &remote_batch_input());

        let err = migrate_in_place(&input, LegacySchema::ShotResults).unwrap_err();
        assert_eq!(err.code(), "schema_error");
        assert!(err.to_string().contains("hardware_task_shot_results"));
        assert!(!files::output_path(&input).exists());
    }

    #[test]
    fn missing_input_reports_not_found() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("nope.json");

        let err = migrate_in_place(&input, LegacySchema::RemoteBatch).unwrap_err();
        assert_eq!(err.code(), "input_not_found");
        assert!(!files::output_path(&input).exists());
    }
}
