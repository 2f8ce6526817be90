use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use super::{generate_questions, QuizQuestion, QuizSession, Step};
use crate::countries::{CountryError, CountryProvider};

/// Records an earned badge for the signed-in user.
#[async_trait]
pub trait BadgeAwarder: Send + Sync {
    async fn award_badge(&self, code: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub country: String,
    pub score: usize,
    pub total: usize,
    pub badge_awarded: bool,
}

/// Drives one quiz round: fetch data, ask the questions, award the badge.
pub struct QuizRunner<'a> {
    countries: &'a dyn CountryProvider,
    awarder: &'a dyn BadgeAwarder,
}

impl<'a> QuizRunner<'a> {
    pub fn new(countries: &'a dyn CountryProvider, awarder: &'a dyn BadgeAwarder) -> Self {
        Self { countries, awarder }
    }

    /// Builds a session for `identifier`. Only a failure to load the country
    /// itself is an error; if the distractor pool is unavailable the questions
    /// that need it are left out.
    pub async fn prepare<R: Rng + Send + ?Sized>(
        &self,
        identifier: &str,
        rng: &mut R,
    ) -> Result<(String, QuizSession), CountryError> {
        let country = self.countries.fetch_country(identifier).await?;
        let pool = match self.countries.fetch_all_countries().await {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, country = %country.common_name(), "distractor pool unavailable");
                Vec::new()
            }
        };
        let questions = generate_questions(&country, &pool, rng);
        let name = country.common_name().to_string();
        Ok((name, QuizSession::new(questions, country.alpha3.clone())))
    }

    /// Hands a finishing step's badge to the awarder. Award failures are
    /// logged and reported as `false`; they never fail the round.
    pub async fn settle(&self, step: &Step) -> bool {
        let Step::Finished {
            award: Some(code), ..
        } = step
        else {
            return false;
        };
        match self.awarder.award_badge(code).await {
            Ok(()) => {
                info!(badge = %code, "badge awarded");
                true
            }
            Err(e) => {
                warn!(error = %e, badge = %code, "badge award failed");
                false
            }
        }
    }

    /// Plays a full round, asking `answer` for each question in turn.
    pub async fn play<R, F>(
        &self,
        identifier: &str,
        rng: &mut R,
        mut answer: F,
    ) -> Result<QuizOutcome, CountryError>
    where
        R: Rng + Send + ?Sized,
        F: FnMut(&QuizQuestion) -> String + Send,
    {
        let (country, mut session) = self.prepare(identifier, rng).await?;
        let mut badge_awarded = false;
        while let Some((index, question)) = session.current() {
            let mut choice = answer(question);
            if !question.options.contains(&choice) {
                warn!(%choice, "answer is not an offered option; counted as wrong");
                choice = first_wrong_option(question);
            }
            let step = session.select(index, &choice);
            badge_awarded |= self.settle(&step).await;
        }
        Ok(QuizOutcome {
            country,
            score: session.score(),
            total: session.total(),
            badge_awarded,
        })
    }
}

fn first_wrong_option(question: &QuizQuestion) -> String {
    question
        .options
        .iter()
        .find(|o| !question.is_correct(o))
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::countries::CountryRecord;
    use crate::quiz::generator::tests::{france, pool};

    struct FakeCountries {
        pool_available: bool,
    }

    #[async_trait]
    impl CountryProvider for FakeCountries {
        async fn fetch_country(&self, identifier: &str) -> Result<CountryRecord, CountryError> {
            pool()
                .into_iter()
                .find(|c| c.common_name().eq_ignore_ascii_case(identifier))
                .ok_or_else(|| CountryError::NotFound(identifier.to_string()))
        }

        async fn fetch_all_countries(&self) -> Result<Vec<CountryRecord>, CountryError> {
            if self.pool_available {
                Ok(pool())
            } else {
                Err(CountryError::Upstream("timeout".into()))
            }
        }
    }

    #[derive(Default)]
    struct RecordingAwarder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl BadgeAwarder for RecordingAwarder {
        async fn award_badge(&self, code: &str) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(code.to_string());
            if self.fail {
                anyhow::bail!("network down");
            }
            Ok(())
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    #[tokio::test]
    async fn perfect_score_awards_badge_once() {
        let countries = FakeCountries { pool_available: true };
        let awarder = RecordingAwarder::default();
        let runner = QuizRunner::new(&countries, &awarder);

        let outcome = runner
            .play("France", &mut rng(), |q| q.correct_answer.clone())
            .await
            .unwrap();

        assert_eq!(outcome.total, 5);
        assert_eq!(outcome.score, 5);
        assert!(outcome.badge_awarded);
        assert_eq!(*awarder.calls.lock().unwrap(), vec!["FRA".to_string()]);
    }

    #[tokio::test]
    async fn imperfect_score_awards_nothing() {
        let countries = FakeCountries { pool_available: true };
        let awarder = RecordingAwarder::default();
        let runner = QuizRunner::new(&countries, &awarder);

        let outcome = runner
            .play("France", &mut rng(), |q| {
                if q.kind == crate::quiz::QuestionKind::Currency {
                    "Doubloon".to_string()
                } else {
                    q.correct_answer.clone()
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome.score, outcome.total - 1);
        assert!(!outcome.badge_awarded);
        assert!(awarder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_pool_degrades_to_no_questions() {
        let countries = FakeCountries { pool_available: false };
        let awarder = RecordingAwarder::default();
        let runner = QuizRunner::new(&countries, &awarder);

        let (_, session) = runner.prepare("France", &mut rng()).await.unwrap();
        assert_eq!(session.total(), 0);
        let outcome = runner
            .play("France", &mut rng(), |q| q.correct_answer.clone())
            .await
            .unwrap();
        assert!(!outcome.badge_awarded);
        assert!(awarder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_country_is_an_error() {
        let countries = FakeCountries { pool_available: true };
        let awarder = RecordingAwarder::default();
        let runner = QuizRunner::new(&countries, &awarder);
        let err = runner.prepare("Atlantis", &mut rng()).await.unwrap_err();
        assert!(matches!(err, CountryError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_award_does_not_fail_the_round() {
        let countries = FakeCountries { pool_available: true };
        let awarder = RecordingAwarder {
            fail: true,
            ..Default::default()
        };
        let runner = QuizRunner::new(&countries, &awarder);
        let outcome = runner
            .play("France", &mut rng(), |q| q.correct_answer.clone())
            .await
            .unwrap();
        assert_eq!(outcome.score, outcome.total);
        assert!(!outcome.badge_awarded);
        assert_eq!(awarder.calls.lock().unwrap().len(), 1);
    }
}
