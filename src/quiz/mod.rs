//! Multiple-choice quiz about one country. A perfect score earns the
//! country's badge.

mod engine;
mod generator;
mod runner;

pub use engine::{QuizSession, QuizState, Step};
pub use generator::{
    format_population, generate_questions, round_population, ImageOption, QuestionKind,
    QuizQuestion, OPTION_COUNT,
};
pub use runner::{BadgeAwarder, QuizOutcome, QuizRunner};
