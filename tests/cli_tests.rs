use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli(data_dir: &Path, script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("planner").expect("planner binary");
    cmd.env("ACADEMIC_PLANNER_DATA", data_dir.join("planner.json"))
        .env_remove("ACADEMIC_PLANNER_CONFIG")
        .env_remove("ACADEMIC_PLANNER_OWNER")
        .env_remove("RUST_LOG");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_adds_items_and_reports_total() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "today 2025-01-06\n\
         assignment inst326 2025-01-08 10 3 Homework One\n\
         project inst490 2025-02-20 40 2 2 Capstone\n\
         exam inst326 2025-01-10 5 quiz 2 Quiz 1\n\
         total\nquit\n",
    )
    .success()
    .stdout(str_contains("Added: Homework One [INST326] Assignment due 2025-01-08"))
    .stdout(str_contains("Total workload: 13.00 hours"));
}

#[test]
fn cli_weekly_and_priority_views() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "today 2025-01-06\n\
         assignment inst326 2025-01-08 10 3 HW1\n\
         exam inst326 2025-01-15 5 midterm 2 Midterm\n\
         week 2\npriority\npriority critical\nquit\n",
    )
    .success()
    .stdout(str_contains("week 0 (from 2025-01-06): 3.00h"))
    .stdout(str_contains("week 1 (from 2025-01-13): 6.00h"))
    .stdout(str_contains("week 2 (from 2025-01-20): 0.00h"))
    .stdout(str_contains("high     2"))
    .stdout(str_contains("critical items:"));
}

#[test]
fn cli_reports_bad_input_and_keeps_running() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "today 2025-13-01\n\
         assignment inst326 2025-01-08 -4 3 Negative\n\
         remove Ghost\n\
         frobnicate\n\
         total\nquit\n",
    )
    .success()
    .stdout(str_contains("invalid date '2025-13-01'"))
    .stdout(str_contains("weight must be a non-negative number"))
    .stdout(str_contains("no item titled 'Ghost'"))
    .stdout(str_contains("Unknown command"))
    .stdout(str_contains("Total workload: 0.00 hours"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.json");
    let script = format!(
        "today 2025-01-06\n\
         assignment inst326 2025-01-08 10 3 Keeper\n\
         save {path}\n\
         assignment inst326 2025-01-09 10 1 Temp\n\
         load {path}\n\
         show\nquit\n",
        path = path.display()
    );
    let assert = run_cli(dir.path(), &script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Loaded 1 items from"), "{output}");
    let after_reload = output.split("Loaded 1 items from").last().unwrap_or_default();
    assert!(after_reload.contains("Keeper"));
    assert!(
        !after_reload.contains("Temp"),
        "temporary item should not appear after reload:\n{after_reload}"
    );
}

#[test]
fn cli_loads_planner_from_configured_data_path() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "assignment cmsc131 2025-03-01 5 2 Persisted\nsave\nquit\n",
    )
    .success();
    assert!(dir.path().join("planner.json").exists());

    run_cli(dir.path(), "total\nquit\n")
        .success()
        .stdout(str_contains("1 items"))
        .stdout(str_contains("Total workload: 2.00 hours"));
}

#[test]
fn cli_imports_and_exports_csv() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("items.csv");
    fs::write(
        &input,
        "type,title,due_date,course_code,weight,estimated_hours\n\
         Assignment,Essay,2025-01-09,engl101,15,6\n\
         Assignment,Broken,2025-01-09,engl101,-1,6\n",
    )
    .unwrap();
    let output = dir.path().join("deadlines.csv");
    let script = format!(
        "today 2025-01-06\nimport {}\nexport {} 7\nquit\n",
        input.display(),
        output.display()
    );

    run_cli(dir.path(), &script)
        .success()
        .stdout(str_contains("Imported 1 items (1 rows rejected)"))
        .stdout(str_contains("row 2:"))
        .stdout(str_contains("Exported 1 deadlines"));

    let exported = fs::read_to_string(&output).unwrap();
    assert!(exported.contains("Essay,2025-01-09,ENGL101,high,6.00"), "{exported}");
}

#[test]
fn cli_completion_updates_stats() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "today 2025-01-06\n\
         assignment inst326 2025-01-08 10 3 HW1\n\
         assignment inst326 2025-01-10 10 2 HW2\n\
         complete HW1 90\nremaining\nstats\nquit\n",
    )
    .success()
    .stdout(str_contains("Completed HW1 with score 90.0"))
    .stdout(str_contains("Remaining workload: 2.00 hours"))
    .stdout(str_contains("Completion rate  : 50.00%"));
}

#[test]
fn cli_status_commands_accept_multi_word_titles() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "today 2025-01-06\n\
         exam inst326 2025-01-10 5 quiz 2 Quiz 1\n\
         project inst490 2025-02-20 40 2 2 Final Capstone Project\n\
         assignment inst326 2025-01-08 10 3 Reading Response 2\n\
         start Quiz 1\n\
         milestone Final Capstone Project 2025-01-20 Proposal draft\n\
         note Reading Response 2 cite the 2025 paper\n\
         complete Quiz 1 85\n\
         stats\nquit\n",
    )
    .success()
    .stdout(str_contains("Quiz 1 is in progress"))
    .stdout(str_contains("Milestone added to Final Capstone Project"))
    .stdout(str_contains("Note added to Reading Response 2"))
    .stdout(str_contains("Completed Quiz 1 with score 85.0"))
    .stdout(str_contains("Completed        : 1"));
}

#[test]
fn cli_rejects_week_counts_past_the_limit() {
    let dir = tempdir().unwrap();
    run_cli(
        dir.path(),
        "today 2025-01-06\nweek 1000000000\nweek 1\nquit\n",
    )
    .success()
    .stdout(str_contains("Week count must be at most 520"))
    .stdout(str_contains("week 1 (from 2025-01-13): 0.00h"));
}
