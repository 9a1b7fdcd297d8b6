use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use setlog_core::{
    parse_date, AppContext, ExerciseSet, NewSet, NoticeKind, QueryParams, SetListController,
    SetRow, SortKey, SortOrder,
};

use super::exercises::resolve;
use super::{app_context, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct SetsCommand {
    #[command(subcommand)]
    pub command: SetsSubcommand,
}

#[derive(Subcommand)]
pub enum SetsSubcommand {
    /// List one page of logged sets
    List {
        /// Only show sets of this exercise (ID or name)
        #[arg(long)]
        exercise: Option<String>,

        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Latest date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Sort by: reps, weight, date
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort order: asc, desc
        #[arg(long)]
        order: Option<SortOrder>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Log a new set
    Add {
        /// Exercise ID or name
        #[arg(long)]
        exercise: String,

        /// Number of repetitions
        #[arg(long)]
        reps: Option<u32>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
    },

    /// Delete a set
    Delete {
        /// Set ID
        id: String,
    },

    /// Browse sets interactively
    Browse {
        /// Start scoped to this exercise (ID or name)
        #[arg(long)]
        exercise: Option<String>,
    },
}

impl SetsCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = app_context(config)?;
        let base = QueryParams::new().with_page_size(config.page_size.value);

        match &self.command {
            SetsSubcommand::List {
                exercise,
                from,
                to,
                sort,
                order,
                page,
                format,
            } => {
                let exercise_id = match exercise {
                    Some(identifier) => Some(resolve(&ctx, identifier).await?.id),
                    None => None,
                };
                let params = base
                    .with_exercise_filter(exercise_id)
                    .with_date_range(*from, *to)
                    .with_sort(sort.unwrap_or_default(), order.unwrap_or_default())
                    .with_page(*page);

                let controller = ctx.controller(params);
                if let Err(e) = controller.mount().await {
                    print_notice(&controller);
                    return Err(e.into());
                }

                match format {
                    OutputFormat::Json => {
                        let rows = controller.rows();
                        let output = PageOutput::new(&rows, &controller);
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        print_notice(&controller);
                        print!("{}", render_page(&controller));
                    }
                }
                Ok(())
            }

            SetsSubcommand::Add {
                exercise,
                reps,
                weight,
            } => {
                let exercise = resolve(&ctx, exercise).await?;

                let mut new_set = NewSet::new(exercise.id.clone());
                if let Some(reps) = reps {
                    new_set = new_set.with_reps(*reps);
                }
                if let Some(weight) = weight {
                    new_set = new_set.with_weight(*weight);
                }

                ctx.gateway().create_set(&new_set).await?;
                println!("Logged set for {}", exercise.name);
                Ok(())
            }

            SetsSubcommand::Delete { id } => {
                ctx.gateway().delete_set(id).await?;
                println!("Set deleted successfully!");
                Ok(())
            }

            SetsSubcommand::Browse { exercise } => {
                let params = match exercise {
                    Some(identifier) => {
                        base.with_exercise_filter(Some(resolve(&ctx, identifier).await?.id))
                    }
                    None => base,
                };
                browse(&ctx, params).await
            }
        }
    }
}

/// One command typed at the browse prompt.
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Sort(SortKey),
    Page(u32),
    Next,
    Prev,
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Exercise(Option<String>),
    Delete(String),
    Show,
    Help,
    Quit,
}

const BROWSE_HELP: &str = "\
Commands:
  sort <reps|weight|date>   sort by column (again to flip direction)
  page <n>                  go to page n
  next, prev                move one page
  from <YYYY-MM-DD|->       set or clear the start date
  to <YYYY-MM-DD|->         set or clear the end date
  exercise <id|name|->      scope to an exercise or show all
  delete <set id>           delete a set
  show                      reload and show the current page
  help                      show this help
  quit                      leave";

/// Parses a prompt line. Blank lines yield `Ok(None)`.
fn parse_action(line: &str) -> Result<Option<Action>, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();
    let arg = rest.join(" ");

    let action = match command.to_lowercase().as_str() {
        "sort" => Action::Sort(required(command, &arg, "a column")?.parse()?),
        "page" => {
            let page = required(command, &arg, "a page number")?;
            let page: u32 = page
                .parse()
                .map_err(|_| format!("Invalid page number '{}'", page))?;
            Action::Page(page)
        }
        "next" | "n" => Action::Next,
        "prev" | "p" => Action::Prev,
        "from" => Action::From(optional_date(command, &arg)?),
        "to" => Action::To(optional_date(command, &arg)?),
        "exercise" => match required(command, &arg, "an exercise or '-'")? {
            "-" => Action::Exercise(None),
            s => Action::Exercise(Some(s.to_string())),
        },
        "delete" | "rm" => Action::Delete(required(command, &arg, "a set id")?.to_string()),
        "show" | "ls" => Action::Show,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
    };
    Ok(Some(action))
}

fn required<'a>(command: &str, arg: &'a str, what: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("'{}' needs {}", command, what))
    } else {
        Ok(arg)
    }
}

/// A date, or `-` to clear it.
fn optional_date(command: &str, arg: &str) -> Result<Option<NaiveDate>, String> {
    match required(command, arg, "a date or '-'")? {
        "-" => Ok(None),
        s => parse_date(s).map(Some),
    }
}

async fn browse(ctx: &AppContext, params: QueryParams) -> Result<(), Box<dyn std::error::Error>> {
    let controller = ctx.controller(params);

    let mounted = controller.mount().await;
    print_notice(&controller);
    mounted?;
    show_view(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let action = match parse_action(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        let result = match action {
            Action::Quit => break,
            Action::Help => {
                println!("{}", BROWSE_HELP);
                continue;
            }
            Action::Sort(key) => controller.sort_by(key).await.map(|_| ()),
            Action::Page(page) => {
                if page > controller.total_pages() {
                    eprintln!("There are only {} pages", controller.total_pages());
                    continue;
                }
                controller.go_to_page(page).await.map(|_| ())
            }
            Action::Next => {
                let page = controller.params().page();
                if page >= controller.total_pages() {
                    eprintln!("Already on the last page");
                    continue;
                }
                controller.go_to_page(page + 1).await.map(|_| ())
            }
            Action::Prev => {
                let page = controller.params().page();
                if page <= 1 {
                    eprintln!("Already on the first page");
                    continue;
                }
                controller.go_to_page(page - 1).await.map(|_| ())
            }
            Action::From(date) => {
                let end = controller.params().date_end;
                controller.set_date_range(date, end).await.map(|_| ())
            }
            Action::To(date) => {
                let start = controller.params().date_start;
                controller.set_date_range(start, date).await.map(|_| ())
            }
            Action::Exercise(None) => controller.set_exercise_filter(None).await.map(|_| ()),
            Action::Exercise(Some(identifier)) => match resolve(ctx, &identifier).await {
                Ok(exercise) => controller
                    .set_exercise_filter(Some(exercise.id))
                    .await
                    .map(|_| ()),
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            },
            Action::Delete(id) => controller.delete(&id).await.map(|_| ()),
            Action::Show => controller.reload().await.map(|_| ()),
        };

        print_notice(&controller);
        match result {
            Ok(()) => show_view(&controller),
            // The token is gone; every further request would fail the same way
            Err(e) if e.is_session_ended() => return Err(e.into()),
            Err(_) => {}
        }
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("sets> ");
    std::io::stdout().flush()
}

fn show_view(controller: &SetListController) {
    let params = controller.params();
    let mut scope = Vec::new();
    if let Some(exercise) = controller.scoped_exercise() {
        scope.push(exercise.name);
    }
    if let Some(start) = params.date_start {
        scope.push(format!("from {}", start));
    }
    if let Some(end) = params.date_end {
        scope.push(format!("to {}", end));
    }
    scope.push(format!("by {} {}", params.sort_key, params.sort_order));

    println!("\n[{}]", scope.join(", "));
    print!("{}", render_page(controller));
}

fn print_notice(controller: &SetListController) {
    if let Some(notice) = controller.take_notice() {
        match notice.kind {
            NoticeKind::Success => eprintln!("{}", notice.message),
            NoticeKind::Failure => eprintln!("! {}", notice.message),
        }
    }
}

fn render_page(controller: &SetListController) -> String {
    render_rows(
        &controller.rows(),
        controller.params().page(),
        controller.total_pages(),
    )
}

fn render_rows(rows: &[SetRow], page: u32, total_pages: u32) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No sets found.\n");
    } else {
        out.push_str(&format!(
            "{:<24}  {:<20}  {:>5}  {:>8}  DATE\n",
            "ID", "EXERCISE", "REPS", "WEIGHT"
        ));
        out.push_str(&"-".repeat(70));
        out.push('\n');
        for row in rows {
            let set = &row.set;
            let exercise = row.exercise_name.as_deref().unwrap_or(&set.exercise);
            let reps = set.reps.map(|r| r.to_string()).unwrap_or_else(|| "-".into());
            let weight = set
                .weight
                .map(|w| format!("{} kg", w))
                .unwrap_or_else(|| "-".into());
            out.push_str(&format!(
                "{:<24}  {:<20}  {:>5}  {:>8}  {}\n",
                set.id,
                truncate(exercise, 20),
                reps,
                weight,
                set.created_at.format("%Y-%m-%d")
            ));
        }
    }
    out.push_str(&format!("Page {} of {}\n", page, total_pages));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[derive(Serialize)]
struct PageOutput<'a> {
    page: u32,
    total_pages: u32,
    sets: Vec<RowOutput<'a>>,
}

#[derive(Serialize)]
struct RowOutput<'a> {
    #[serde(flatten)]
    set: &'a ExerciseSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    exercise_name: Option<&'a str>,
}

impl<'a> PageOutput<'a> {
    fn new(rows: &'a [SetRow], controller: &SetListController) -> Self {
        Self {
            page: controller.params().page(),
            total_pages: controller.total_pages(),
            sets: rows
                .iter()
                .map(|row| RowOutput {
                    set: &row.set,
                    exercise_name: row.exercise_name.as_deref(),
                })
                .collect(),
        }
    }
}
