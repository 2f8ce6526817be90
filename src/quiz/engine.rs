use rand::Rng;

use super::QuizQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    AwaitingAnswer(usize),
    Finished { score: usize, total: usize },
}

/// Result of [`QuizSession::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Stale, repeated or unknown selection; nothing changed.
    Ignored,
    Answered { correct: bool, next: usize },
    /// `award` holds the badge code on a perfect score. It is produced once,
    /// on the transition into `Finished`.
    Finished {
        correct: bool,
        score: usize,
        total: usize,
        award: Option<String>,
    },
}

/// In-memory quiz over an ordered list of questions.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    badge_code: Option<String>,
    answers: Vec<Option<String>>,
    score: usize,
    state: QuizState,
}

impl QuizSession {
    /// `badge_code` is the alpha-3 code awarded on a perfect score.
    pub fn new(questions: Vec<QuizQuestion>, badge_code: Option<String>) -> Self {
        let total = questions.len();
        Self {
            answers: vec![None; total],
            questions,
            badge_code,
            score: 0,
            state: Self::initial_state(total),
        }
    }

    fn initial_state(total: usize) -> QuizState {
        if total == 0 {
            QuizState::Finished { score: 0, total: 0 }
        } else {
            QuizState::AwaitingAnswer(0)
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Selected option per question, for progress display.
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn current(&self) -> Option<(usize, &QuizQuestion)> {
        match self.state {
            QuizState::AwaitingAnswer(i) => Some((i, &self.questions[i])),
            QuizState::Finished { .. } => None,
        }
    }

    pub fn is_perfect(&self) -> bool {
        matches!(self.state, QuizState::Finished { score, total } if total > 0 && score == total)
    }

    /// Records `option` as the answer to question `index`. Only the current
    /// question accepts an answer, and only once.
    pub fn select(&mut self, index: usize, option: &str) -> Step {
        let QuizState::AwaitingAnswer(current) = self.state else {
            return Step::Ignored;
        };
        if index != current || self.answers[index].is_some() {
            return Step::Ignored;
        }
        let question = &self.questions[index];
        if !question.options.iter().any(|o| o == option) {
            return Step::Ignored;
        }

        let correct = question.is_correct(option);
        self.answers[index] = Some(option.to_string());
        if correct {
            self.score += 1;
        }

        let next = index + 1;
        if next < self.questions.len() {
            self.state = QuizState::AwaitingAnswer(next);
            return Step::Answered { correct, next };
        }

        let total = self.questions.len();
        self.state = QuizState::Finished {
            score: self.score,
            total,
        };
        let award = if self.score == total {
            self.badge_code.clone()
        } else {
            None
        };
        Step::Finished {
            correct,
            score: self.score,
            total,
            award,
        }
    }

    /// Back to the first question with a zero score and freshly shuffled options.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for q in &mut self.questions {
            q.shuffle(rng);
        }
        self.answers = vec![None; self.questions.len()];
        self.score = 0;
        self.state = Self::initial_state(self.questions.len());
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::quiz::generate_questions;
    use crate::quiz::generator::tests::{france, pool};

    fn session() -> QuizSession {
        let mut rng = StdRng::seed_from_u64(42);
        QuizSession::new(
            generate_questions(&france(), &pool(), &mut rng),
            Some("FRA".into()),
        )
    }

    fn wrong_option(q: &QuizQuestion) -> String {
        q.options
            .iter()
            .find(|o| **o != q.correct_answer)
            .cloned()
            .unwrap()
    }

    #[test]
    fn perfect_run_awards_exactly_once() {
        let mut quiz = session();
        let total = quiz.total();
        let mut awards = Vec::new();

        while let Some((i, q)) = quiz.current() {
            let answer = q.correct_answer.clone();
            if let Step::Finished { award, .. } = quiz.select(i, &answer) {
                awards.extend(award);
            }
        }

        assert_eq!(quiz.state(), QuizState::Finished { score: total, total });
        assert!(quiz.is_perfect());
        assert_eq!(awards, vec!["FRA".to_string()]);
        assert_eq!(quiz.select(total - 1, "Paris"), Step::Ignored);
    }

    #[test]
    fn one_wrong_answer_awards_nothing() {
        let mut quiz = session();
        let total = quiz.total();
        let mut awards = 0;

        while let Some((i, q)) = quiz.current() {
            let answer = if i == 1 { wrong_option(q) } else { q.correct_answer.clone() };
            if let Step::Finished { award, .. } = quiz.select(i, &answer) {
                awards += award.iter().count();
            }
        }

        assert_eq!(
            quiz.state(),
            QuizState::Finished {
                score: total - 1,
                total
            }
        );
        assert!(!quiz.is_perfect());
        assert_eq!(awards, 0);
    }

    #[test]
    fn first_answer_is_final() {
        let mut quiz = session();
        let (_, q) = quiz.current().unwrap();
        let wrong = wrong_option(q);
        let right = q.correct_answer.clone();

        assert_eq!(quiz.select(0, &wrong), Step::Answered { correct: false, next: 1 });
        // A second click on question 0 arrives late.
        assert_eq!(quiz.select(0, &right), Step::Ignored);
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.answers()[0].as_deref(), Some(wrong.as_str()));
    }

    #[test]
    fn options_not_offered_are_ignored() {
        let mut quiz = session();
        assert_eq!(quiz.select(0, "Atlantis"), Step::Ignored);
        assert_eq!(quiz.state(), QuizState::AwaitingAnswer(0));
    }

    #[test]
    fn restart_resets_progress() {
        let mut quiz = session();
        while let Some((i, q)) = quiz.current() {
            let answer = wrong_option(q);
            quiz.select(i, &answer);
        }
        let mut rng = StdRng::seed_from_u64(5);
        quiz.restart(&mut rng);
        assert_eq!(quiz.state(), QuizState::AwaitingAnswer(0));
        assert_eq!(quiz.score(), 0);
        assert!(quiz.answers().iter().all(Option::is_none));

        while let Some((i, q)) = quiz.current() {
            let answer = q.correct_answer.clone();
            quiz.select(i, &answer);
        }
        assert!(quiz.is_perfect());
    }

    #[test]
    fn empty_quiz_is_finished_without_award() {
        let mut quiz = QuizSession::new(Vec::new(), Some("FRA".into()));
        assert_eq!(quiz.state(), QuizState::Finished { score: 0, total: 0 });
        assert!(!quiz.is_perfect());
        assert_eq!(quiz.select(0, "anything"), Step::Ignored);
    }
}
