use academic_planner::{
    AcademicItem, AcademicPlanner, Assignment, Exam, ExamType, ItemKind, ItemStatus,
    JsonFileStore, MAX_WEEKS_AHEAD, Plannable, PlannerConfig, PlannerStore, Priority, Project, ValidationError,
    export_deadlines_to_csv, format_course_code, import_items_from_csv, load_planner_from_json,
    parse_date, planner_to_dataframe, render_text_table, save_planner_to_json,
};
use chrono::{Local, NaiveDate};
use std::io::{self, Write};
use std::str::SplitWhitespace;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn rest_of_line(parts: SplitWhitespace) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

/// Splits `<title...> <last>` at the final word.
fn title_and_last<'a>(parts: SplitWhitespace<'a>) -> Option<(String, &'a str)> {
    let mut words: Vec<&str> = parts.collect();
    let last = words.pop()?;
    if words.is_empty() {
        return None;
    }
    Some((words.join(" "), last))
}

/// Splits `<title...> <YYYY-MM-DD> <rest...>` at the first word after the
/// title that parses as a date.
fn title_date_and_rest(parts: SplitWhitespace) -> Option<(String, NaiveDate, String)> {
    let words: Vec<&str> = parts.collect();
    let (idx, date) = words
        .iter()
        .enumerate()
        .skip(1)
        .find_map(|(idx, word)| parse_date(word).ok().map(|date| (idx, date)))?;
    Some((words[..idx].join(" "), date, words[idx + 1..].join(" ")))
}

/// Longest leading run of words that names an item, and the words after it.
fn known_title_and_rest(
    planner: &AcademicPlanner,
    parts: SplitWhitespace,
) -> Option<(String, String)> {
    let words: Vec<&str> = parts.collect();
    (1..=words.len()).rev().find_map(|n| {
        let title = words[..n].join(" ");
        planner
            .find_item(&title)
            .map(|_| (title, words[n..].join(" ")))
    })
}

fn print_help() {
    println!(
        "Commands:\n  help                                          Show this help\n  show                                          Show all items\n  today <YYYY-MM-DD>                            Set the reference date\n  assignment <course> <due> <weight> <hours> <title...>\n                                                Add an assignment\n  project <course> <due> <weight> <milestones> <team_size> <title...>\n                                                Add a project\n  exam <course> <due> <weight> <quiz|midterm|final|exam> <chapters> <title...>\n                                                Add an exam\n  remove <title...>                             Remove the first item with this title\n  complete <title...> <score>                   Mark an item completed with a score\n  start <title...>                              Mark an item in progress\n  milestone <title...> <YYYY-MM-DD> <name...>   Add a milestone to a project\n  note <title...> <text...>                     Add a note to an assignment\n  total                                         Total workload in hours\n  remaining                                     Workload of items not yet completed\n  week [n]                                      Hours due per week for n weeks ahead (n <= 520)\n  upcoming [days]                               Deadlines in the next days\n  priority [band]                               Counts per priority band, or items in one band\n  type <assignment|project|exam>                Items of one type\n  overdue                                       Incomplete items past their due date\n  stats                                         Completion statistics\n  save [path]                                   Save planner to JSON\n  load [path]                                   Load planner from JSON\n  import <path> [course]                        Import items from CSV\n  export <path> [days]                          Export upcoming deadlines to CSV\n  quit|exit                                     Exit"
    );
}

fn print_items<'a, I>(items: I, reference: NaiveDate)
where
    I: IntoIterator<Item = &'a AcademicItem>,
{
    let mut any = false;
    for item in items {
        any = true;
        println!(
            "  {}  {:<24} {:<10} {:<10} {:<8} {:.2}h",
            item.due_date(),
            item.title(),
            item.course_code(),
            item.item_type(),
            item.priority(reference),
            item.calculate_time_commitment()
        );
    }
    if !any {
        println!("  (none)");
    }
}

fn show(planner: &AcademicPlanner, reference: NaiveDate) {
    println!("{planner}");
    match planner_to_dataframe(planner, reference) {
        Ok(df) => println!("{}", render_text_table(&df)),
        Err(e) => println!("Error building table: {}", e),
    }
}

fn parse_weight_and_due(due_s: &str, weight_s: &str) -> Result<(NaiveDate, f64), String> {
    let due = parse_date(due_s).map_err(|e| e.to_string())?;
    let weight: f64 = weight_s
        .parse()
        .map_err(|_| format!("Invalid weight '{weight_s}'"))?;
    Ok((due, weight))
}

fn parse_assignment(mut parts: SplitWhitespace) -> Result<AcademicItem, String> {
    let usage = "Usage: assignment <course> <due> <weight> <hours> <title...>";
    let (Some(course), Some(due_s), Some(weight_s), Some(hours_s)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(usage.to_string());
    };
    let (due, weight) = parse_weight_and_due(due_s, weight_s)?;
    let hours: f64 = hours_s
        .parse()
        .map_err(|_| format!("Invalid hours '{hours_s}'"))?;
    let course = format_course_code(course).map_err(|e| e.to_string())?;
    let title = rest_of_line(parts);
    Assignment::new(title, due, course, weight, hours)
        .map(AcademicItem::from)
        .map_err(|e| e.to_string())
}

fn parse_project(mut parts: SplitWhitespace) -> Result<AcademicItem, String> {
    let usage = "Usage: project <course> <due> <weight> <milestones> <team_size> <title...>";
    let (Some(course), Some(due_s), Some(weight_s), Some(milestones_s), Some(team_s)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(usage.to_string());
    };
    let (due, weight) = parse_weight_and_due(due_s, weight_s)?;
    let milestones: u32 = milestones_s
        .parse()
        .map_err(|_| format!("Invalid milestone count '{milestones_s}'"))?;
    let team: u32 = team_s
        .parse()
        .map_err(|_| format!("Invalid team size '{team_s}'"))?;
    let course = format_course_code(course).map_err(|e| e.to_string())?;
    let title = rest_of_line(parts);
    Project::new(title, due, course, weight, milestones, team)
        .map(AcademicItem::from)
        .map_err(|e| e.to_string())
}

fn parse_exam(mut parts: SplitWhitespace) -> Result<AcademicItem, String> {
    let usage = "Usage: exam <course> <due> <weight> <quiz|midterm|final|exam> <chapters> <title...>";
    let (Some(course), Some(due_s), Some(weight_s), Some(kind_s), Some(chapters_s)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(usage.to_string());
    };
    let (due, weight) = parse_weight_and_due(due_s, weight_s)?;
    let exam_type: ExamType = kind_s
        .parse()
        .map_err(|e: ValidationError| e.to_string())?;
    let chapters: u32 = chapters_s
        .parse()
        .map_err(|_| format!("Invalid chapter count '{chapters_s}'"))?;
    let course = format_course_code(course).map_err(|e| e.to_string())?;
    let title = rest_of_line(parts);
    Exam::new(title, due, course, weight, exam_type, chapters)
        .map(AcademicItem::from)
        .map_err(|e| e.to_string())
}

fn main() {
    init_tracing();

    let config = match PlannerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("Config error: {} (using defaults)", e);
            PlannerConfig::default()
        }
    };
    let store = JsonFileStore::new(&config.data_path);
    let mut planner = match store.load_planner() {
        Ok(Some(planner)) => planner,
        Ok(None) => AcademicPlanner::new(config.owner_name.clone()),
        Err(e) => {
            warn!(path = %config.data_path.display(), error = %e, "could not load saved planner");
            println!("Could not load {}: {}", config.data_path.display(), e);
            AcademicPlanner::new(config.owner_name.clone())
        }
    };
    let mut today = Local::now().date_naive();

    println!("Academic Planner (CLI) - type 'help' for commands\n");
    println!("{planner}");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show(&planner, today),
            "today" => match parts.next() {
                Some(date_s) => match parse_date(date_s) {
                    Ok(date) => {
                        today = date;
                        println!("Reference date set to {today}");
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Reference date is {today}"),
            },
            "assignment" | "project" | "exam" => {
                let parsed = match cmd {
                    "assignment" => parse_assignment(parts),
                    "project" => parse_project(parts),
                    _ => parse_exam(parts),
                };
                match parsed {
                    Ok(item) => {
                        println!("Added: {item}");
                        planner.add_item(item);
                    }
                    Err(msg) => println!("{msg}"),
                }
            }
            "remove" => {
                let title = rest_of_line(parts);
                if title.is_empty() {
                    println!("Usage: remove <title...>");
                    continue;
                }
                match planner.remove_item_by_title(&title) {
                    Ok(item) => println!("Removed: {item}"),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "complete" => {
                let Some((title, score_s)) = title_and_last(parts) else {
                    println!("Usage: complete <title...> <score>");
                    continue;
                };
                let score: f64 = match score_s.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        println!("Invalid score");
                        continue;
                    }
                };
                match planner.update_item(&title, |item| item.mark_completed(score, Some(today))) {
                    Ok(()) => println!("Completed {title} with score {score:.1}"),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "start" => {
                let title = rest_of_line(parts);
                if title.is_empty() {
                    println!("Usage: start <title...>");
                    continue;
                }
                let result = planner.update_item(&title, |item| {
                    item.set_status(ItemStatus::InProgress);
                    Ok(())
                });
                match result {
                    Ok(()) => println!("{title} is in progress"),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "milestone" => {
                let Some((title, date, name)) = title_date_and_rest(parts) else {
                    println!("Usage: milestone <title...> <YYYY-MM-DD> <name...>");
                    continue;
                };
                let Some(item) = planner.find_item_mut(&title) else {
                    println!("No item titled '{title}'");
                    continue;
                };
                match item.as_project_mut() {
                    Some(project) => match project.add_milestone(name, date) {
                        Ok(()) => println!("Milestone added to {title}"),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("{title} is not a project"),
                }
            }
            "note" => {
                let line = rest_of_line(parts.clone());
                if line.is_empty() {
                    println!("Usage: note <title...> <text...>");
                    continue;
                }
                let Some((title, text)) = known_title_and_rest(&planner, parts) else {
                    println!("No item matches '{line}'");
                    continue;
                };
                let Some(item) = planner.find_item_mut(&title) else {
                    println!("No item titled '{title}'");
                    continue;
                };
                match item.as_assignment_mut() {
                    Some(assignment) => match assignment.add_notes(text) {
                        Ok(()) => println!("Note added to {title}"),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("{title} is not an assignment"),
                }
            }
            "total" => println!("Total workload: {:.2} hours", planner.total_workload()),
            "remaining" => println!(
                "Remaining workload: {:.2} hours",
                planner.remaining_workload()
            ),
            "week" => {
                let weeks = match parts.next().map(str::parse::<u32>) {
                    None => config.default_weeks_ahead,
                    Some(Ok(n)) if n <= MAX_WEEKS_AHEAD => n,
                    Some(Ok(_)) => {
                        println!("Week count must be at most {MAX_WEEKS_AHEAD}");
                        continue;
                    }
                    Some(Err(_)) => {
                        println!("Invalid week count");
                        continue;
                    }
                };
                let dist = planner.calculate_weekly_workload(weeks, today);
                println!("Weekly workload from {today}:");
                for (bucket, hours) in &dist.buckets {
                    match dist.window_start(*bucket) {
                        Some(start) => println!("  week {bucket} (from {start}): {hours:.2}h"),
                        None => println!("  week {bucket}: {hours:.2}h"),
                    }
                }
                if dist.past_due_count > 0 {
                    println!(
                        "  past due: {:.2}h ({} items)",
                        dist.past_due_hours, dist.past_due_count
                    );
                }
            }
            "upcoming" => {
                let days = match parts.next().map(str::parse::<u32>) {
                    None => config.default_days_ahead,
                    Some(Ok(n)) => n,
                    Some(Err(_)) => {
                        println!("Invalid day count");
                        continue;
                    }
                };
                println!("Upcoming deadlines (next {days} days):");
                print_items(planner.upcoming_deadlines(days, today), today);
            }
            "priority" => match parts.next() {
                None => {
                    println!("Priority summary as of {today}:");
                    for (band, count) in planner.priority_summary(today).iter() {
                        println!("  {:<8} {}", band, count);
                    }
                }
                Some(band_s) => match band_s.parse::<Priority>() {
                    Ok(band) => {
                        println!("{band} items:");
                        print_items(planner.items_by_priority(band, today), today);
                    }
                    Err(e) => println!("Error: {}", e),
                },
            },
            "type" => match parts.next().map(str::parse::<ItemKind>) {
                Some(Ok(kind)) => {
                    println!("{kind} items:");
                    print_items(planner.items_by_type(kind), today);
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: type <assignment|project|exam>"),
            },
            "overdue" => {
                println!("Overdue as of {today}:");
                print_items(planner.overdue_items(today), today);
            }
            "stats" => {
                let stats = planner.completion_stats();
                println!("Items            : {}", stats.total_items);
                println!("Completed        : {}", stats.completed);
                println!("In progress      : {}", stats.in_progress);
                println!("Not started      : {}", stats.not_started);
                println!("Completion rate  : {:.2}%", stats.completion_rate);
                println!("Average score    : {:.2}", stats.average_score);
            }
            "save" => {
                let path = parts
                    .next()
                    .map(std::path::PathBuf::from)
                    .unwrap_or_else(|| config.data_path.clone());
                match save_planner_to_json(&planner, &path) {
                    Ok(()) => println!("Saved {} items to {}", planner.len(), path.display()),
                    Err(e) => println!("Save error: {}", e),
                }
            }
            "load" => {
                let path = parts
                    .next()
                    .map(std::path::PathBuf::from)
                    .unwrap_or_else(|| config.data_path.clone());
                match load_planner_from_json(&path) {
                    Ok(loaded) => {
                        planner = loaded;
                        println!("Loaded {} items from {}", planner.len(), path.display());
                    }
                    Err(e) => println!("Load error: {}", e),
                }
            }
            "import" => {
                let Some(path) = parts.next() else {
                    println!("Usage: import <path> [course]");
                    continue;
                };
                match import_items_from_csv(path, parts.next()) {
                    Ok(report) => {
                        println!(
                            "Imported {} items ({} rows rejected)",
                            report.items.len(),
                            report.errors.len()
                        );
                        for err in &report.errors {
                            println!("  {err}");
                        }
                        for item in report.items {
                            planner.add_item(item);
                        }
                    }
                    Err(e) => println!("Import error: {}", e),
                }
            }
            "export" => {
                let Some(path) = parts.next() else {
                    println!("Usage: export <path> [days]");
                    continue;
                };
                let days = match parts.next().map(str::parse::<u32>) {
                    None => config.default_export_days,
                    Some(Ok(n)) => n,
                    Some(Err(_)) => {
                        println!("Invalid day count");
                        continue;
                    }
                };
                match export_deadlines_to_csv(&planner, path, days, today) {
                    Ok(rows) => println!("Exported {rows} deadlines to {path}"),
                    Err(e) => println!("Export error: {}", e),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
