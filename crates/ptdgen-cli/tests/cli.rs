//! CLI integration tests
//!
//! Run the built `ptdgen` binary against generated fixtures.
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Workbook written |
//! | 1 | Input or write failure |
//! | 2 | No output path (`--out` / `--inplace` missing) |

use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const VISITS_CSV: &str = "\
Event Group,Visit Name,Offset Type,Offset Days,Day Range - Early,Day Range - Late
Screening,V1,,,,
Treatment,V2,Days,14,2,2
Treatment,V3,Days,28,2,2
Follow-up,P4,Days,60,,
";

const FORMS_CSV: &str = "\
Form Label,Form Name,Source,V1,V2,V3,P4,Is Form Dynamic?
Demographics,DM,eCRF,X,,,,No
Vital Signs,VS,eCRF,X,X,X,X,No
Adverse Events,AE,eCRF,,X,nan,X,Yes
";

fn ptdgen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ptdgen"));
    cmd.env_remove("RUST_LOG").env_remove("PTDGEN_CONFIG");
    cmd
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("visits.csv"), VISITS_CSV).unwrap();
        std::fs::write(dir.path().join("forms.csv"), FORMS_CSV).unwrap();
        write_workbook(&dir.path().join("template.xlsx"), &["Cover", "Schedule Grid", "Notes"]);
        write_study_forms(&dir.path().join("study_forms.xlsx"));
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn build(&self, extra: &[&str]) -> Output {
        ptdgen()
            .arg("build")
            .arg("--visits")
            .arg(self.path("visits.csv"))
            .arg("--forms")
            .arg(self.path("forms.csv"))
            .arg("--template")
            .arg(self.path("template.xlsx"))
            .arg("--study-forms")
            .arg(self.path("study_forms.xlsx"))
            .args(extra)
            .output()
            .unwrap()
    }
}

fn write_workbook(path: &Path, sheets: &[&str]) {
    let mut workbook = Workbook::new();
    for name in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        sheet.write_string(0, 0, format!("{name} placeholder")).unwrap();
    }
    workbook.save(path).unwrap();
}

fn write_study_forms(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "CTDM").unwrap();
    sheet.write_string(2, 0, "Form Label").unwrap();
    sheet.write_string(2, 1, "Form Name").unwrap();
    sheet.write_string(3, 0, "Demographics").unwrap();
    sheet.write_string(3, 1, "DM").unwrap();
    workbook.save(path).unwrap();
}

fn sheet_order(path: &Path) -> Vec<String> {
    umya_spreadsheet::reader::xlsx::read(path)
        .unwrap()
        .get_sheet_collection_no_check()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}

fn cell(path: &Path, sheet: &str, at: (u32, u32)) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
    book.get_sheet_by_name(sheet)
        .unwrap()
        .get_cell(at)
        .map(|c| c.get_value().to_string())
        .unwrap_or_default()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn grid_command_writes_workbook() {
    let fx = Fixture::new();
    let out = fx.path("grid.xlsx");

    let output = ptdgen()
        .arg("grid")
        .arg("--visits")
        .arg(fx.path("visits.csv"))
        .arg("--forms")
        .arg(fx.path("forms.csv"))
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Schedule grid written to:"));
    assert_eq!(sheet_order(&out), vec!["Final PTD"]);
    assert_eq!(cell(&out, "Final PTD", (1, 2)), "Form Label");
    assert_eq!(cell(&out, "Final PTD", (6, 3)), "SCRN");
    assert_eq!(cell(&out, "Final PTD", (9, 3)), "P4");
}

#[test]
fn build_command_grafts_into_template() {
    let fx = Fixture::new();
    let out = fx.path("out").join("ptd.xlsx");

    let output = fx.build(&["--out", out.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Combined PTD file written successfully to:"));
    assert_eq!(
        sheet_order(&out),
        vec!["Cover", "Schedule Grid", "Notes", "Study Specific Forms"]
    );
    assert_eq!(cell(&out, "Cover", (1, 1)), "Cover placeholder");
    assert_eq!(cell(&out, "Schedule Grid", (1, 2)), "Form Label");
    assert_eq!(cell(&out, "Study Specific Forms", (1, 4)), "Demographics");

    // the template is left alone
    let template = fx.path("template.xlsx");
    assert_eq!(cell(&template, "Schedule Grid", (1, 1)), "Schedule Grid placeholder");
}

#[test]
fn missing_out_is_usage_error() {
    let fx = Fixture::new();

    let output = fx.build(&[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: --out is required unless --inplace is specified"));
}

#[test]
fn inplace_overwrites_template() {
    let fx = Fixture::new();
    let template = fx.path("template.xlsx");

    let output = fx.build(&["--inplace", "--fast"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(cell(&template, "Schedule Grid", (1, 2)), "Form Label");
    assert_eq!(
        sheet_order(&template),
        vec!["Cover", "Schedule Grid", "Notes", "Study Specific Forms"]
    );
}

#[test]
fn output_extension_is_forced() {
    let fx = Fixture::new();

    let output = fx.build(&["--out", fx.path("ptd.xls").to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(fx.path("ptd.xlsx").exists());
    assert!(!fx.path("ptd.xls").exists());
}

#[test]
fn unreadable_visits_fail() {
    let fx = Fixture::new();
    std::fs::remove_file(fx.path("visits.csv")).unwrap();
    let out = fx.path("ptd.xlsx");

    let output = fx.build(&["--out", out.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read visits"));
    assert!(!out.exists());
}

#[test]
fn graft_command_with_fast_copy() {
    let fx = Fixture::new();
    let schedule = fx.path("schedule.xlsx");
    write_workbook(&schedule, &["Final PTD"]);
    let out = fx.path("ptd.xlsx");

    let output = ptdgen()
        .arg("graft")
        .arg("--schedule")
        .arg(&schedule)
        .arg("--template")
        .arg(fx.path("template.xlsx"))
        .arg("--study-forms")
        .arg(fx.path("study_forms.xlsx"))
        .arg("--out")
        .arg(&out)
        .arg("--fast")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(cell(&out, "Schedule Grid", (1, 1)), "Final PTD placeholder");
}

#[test]
fn config_renames_target_sheets() {
    let fx = Fixture::new();
    let config = fx.path("ptd.toml");
    std::fs::write(
        &config,
        "[graft]\nschedule_sheet_name = \"Notes\"\nforms_sheet_name = \"Forms\"\n",
    )
    .unwrap();
    let out = fx.path("ptd.xlsx");

    let output = fx.build(&[
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(sheet_order(&out), vec!["Cover", "Schedule Grid", "Notes", "Forms"]);
    assert_eq!(cell(&out, "Notes", (1, 2)), "Form Label");
}
