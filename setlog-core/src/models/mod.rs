mod exercise;
mod exercise_set;
mod sort;

pub use exercise::{Exercise, NewExercise};
pub use exercise_set::{ExerciseSet, NewSet, SetPage};
pub use sort::{SortKey, SortOrder};
