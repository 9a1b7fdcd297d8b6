use clap::{Args, Subcommand};

use setlog_core::{AppContext, Exercise, NewExercise};

use super::{app_context, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct ExercisesCommand {
    #[command(subcommand)]
    pub command: ExercisesSubcommand,
}

#[derive(Subcommand)]
pub enum ExercisesSubcommand {
    /// List all exercises
    List {
        /// Only show exercises whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show an exercise's details
    Show {
        /// Exercise ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new exercise
    Add {
        /// Name of the exercise
        #[arg(long)]
        name: String,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,
    },
}

impl ExercisesCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = app_context(config)?;

        match &self.command {
            ExercisesSubcommand::List { search, format } => {
                ctx.exercises().ensure_loaded().await?;
                let exercises = match search {
                    Some(query) => ctx.exercises().search(query),
                    None => ctx.exercises().all().to_vec(),
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&exercises)?);
                    }
                    OutputFormat::Text => {
                        if exercises.is_empty() {
                            println!("No exercises found.");
                            return Ok(());
                        }
                        println!("{:<24}  NAME", "ID");
                        println!("{}", "-".repeat(50));
                        for exercise in &exercises {
                            println!("{:<24}  {}", exercise.id, exercise.name);
                        }
                    }
                }
                Ok(())
            }

            ExercisesSubcommand::Show { identifier, format } => {
                let exercise = resolve(&ctx, identifier).await?;

                // Fetch by id to show the server's current copy
                let exercise = ctx.gateway().get_exercise(&exercise.id).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&exercise)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", exercise.name);
                        println!("{}", "=".repeat(exercise.name.len()));
                        println!("ID: {}", exercise.id);
                        if let Some(url) = &exercise.image_url {
                            println!("Image: {}", url);
                        }
                    }
                }
                Ok(())
            }

            ExercisesSubcommand::Add { name, image_url } => {
                let mut new_exercise = NewExercise::new(name.clone());
                if let Some(url) = image_url {
                    new_exercise = new_exercise.with_image_url(url.clone());
                }

                let exercise = ctx.exercises().create(&new_exercise).await?;
                println!("Created exercise: {} ({})", exercise.name, exercise.id);
                Ok(())
            }
        }
    }
}

/// Looks an exercise up in the loaded cache by ID or name.
pub async fn resolve(
    ctx: &AppContext,
    identifier: &str,
) -> Result<Exercise, Box<dyn std::error::Error>> {
    ctx.exercises().ensure_loaded().await?;
    find_by_id_or_name(&ctx.exercises().all(), identifier)
        .cloned()
        .ok_or_else(|| format!("Exercise not found: {}", identifier).into())
}

/// An exact ID match wins over a case-insensitive name match.
fn find_by_id_or_name<'a>(exercises: &'a [Exercise], identifier: &str) -> Option<&'a Exercise> {
    let identifier = identifier.trim();
    exercises
        .iter()
        .find(|e| e.id == identifier)
        .or_else(|| {
            exercises
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(identifier))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str, name: &str) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: name.to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_find_by_id() {
        let exercises = vec![exercise("ex1", "Bench Press"), exercise("ex2", "Squat")];
        let found = find_by_id_or_name(&exercises, "ex2").unwrap();
        assert_eq!(found.name, "Squat");
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let exercises = vec![exercise("ex1", "Bench Press"), exercise("ex2", "Squat")];
        let found = find_by_id_or_name(&exercises, "bench press").unwrap();
        assert_eq!(found.id, "ex1");
    }

    #[test]
    fn test_id_match_wins_over_name() {
        let exercises = vec![exercise("squat", "Front Squat"), exercise("ex2", "squat")];
        let found = find_by_id_or_name(&exercises, "squat").unwrap();
        assert_eq!(found.id, "squat");
    }

    #[test]
    fn test_not_found() {
        let exercises = vec![exercise("ex1", "Bench Press")];
        assert!(find_by_id_or_name(&exercises, "Deadlift").is_none());
    }
}
