use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::countries::CountryRecord;

/// Options shown per question: the correct answer plus three distractors.
pub const OPTION_COUNT: usize = 4;
const DISTRACTORS: usize = OPTION_COUNT - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Capital,
    Region,
    Population,
    Currency,
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOption {
    pub label: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub kind: QuestionKind,
    pub prompt: String,
    /// Always `OPTION_COUNT` distinct values, one of them `correct_answer`.
    pub options: Vec<String>,
    /// Flag questions only; same order as `options`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_options: Option<Vec<ImageOption>>,
    pub correct_answer: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match &mut self.image_options {
            Some(images) => {
                images.shuffle(rng);
                self.options = images.iter().map(|i| i.label.clone()).collect();
            }
            None => self.options.shuffle(rng),
        }
    }
}

/// Rounds to the nearest whole million.
pub fn round_population(population: u64) -> u64 {
    ((population as f64 / 1_000_000.0).round() as u64) * 1_000_000
}

/// `67000000` -> `"67,000,000"`.
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Picks `DISTRACTORS` distinct values that differ from `correct`. `None` if
/// the pool cannot supply enough.
fn pick_distractors<R: Rng + ?Sized>(
    correct: &str,
    candidates: impl Iterator<Item = String>,
    rng: &mut R,
) -> Option<Vec<String>> {
    let mut values: Vec<String> = candidates.filter(|v| v != correct).collect();
    values.sort();
    values.dedup();
    if values.len() < DISTRACTORS {
        return None;
    }
    Some(values.choose_multiple(rng, DISTRACTORS).cloned().collect())
}

fn text_question<R: Rng + ?Sized>(
    kind: QuestionKind,
    prompt: String,
    correct: String,
    distractors: Vec<String>,
    rng: &mut R,
) -> QuizQuestion {
    let mut question = QuizQuestion {
        kind,
        prompt,
        options: std::iter::once(correct.clone()).chain(distractors).collect(),
        image_options: None,
        correct_answer: correct,
    };
    question.shuffle(rng);
    question
}

/// Builds one question per attribute the country has, in the order capital,
/// region, population, currency, flag. Distractors come from `pool`, which
/// should hold other countries; an attribute whose pool cannot supply three
/// distinct distractors is skipped.
pub fn generate_questions<R: Rng + ?Sized>(
    country: &CountryRecord,
    pool: &[CountryRecord],
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let name = country.common_name();
    let others: Vec<&CountryRecord> = pool.iter().filter(|c| !c.same_country(country)).collect();
    let mut questions = Vec::with_capacity(5);

    if let Some(capital) = country.capital_city() {
        let candidates = others.iter().filter_map(|c| c.capital_city().map(str::to_string));
        if let Some(d) = pick_distractors(capital, candidates, rng) {
            questions.push(text_question(
                QuestionKind::Capital,
                format!("What is the capital of {name}?"),
                capital.to_string(),
                d,
                rng,
            ));
        }
    }

    if let Some(region) = country.region_name() {
        let candidates = others.iter().filter_map(|c| c.region_name().map(str::to_string));
        if let Some(d) = pick_distractors(region, candidates, rng) {
            questions.push(text_question(
                QuestionKind::Region,
                format!("Which region does {name} belong to?"),
                region.to_string(),
                d,
                rng,
            ));
        }
    }

    if let Some(population) = country.population_count() {
        let correct = format_population(round_population(population));
        let candidates = others.iter().filter_map(|c| {
            c.population_count()
                .map(|p| format_population(round_population(p)))
        });
        if let Some(d) = pick_distractors(&correct, candidates, rng) {
            questions.push(text_question(
                QuestionKind::Population,
                format!("What is the approximate population of {name}?"),
                correct,
                d,
                rng,
            ));
        }
    }

    if let Some(currency) = country.primary_currency() {
        let candidates = others
            .iter()
            .filter_map(|c| c.primary_currency().map(str::to_string));
        if let Some(d) = pick_distractors(currency, candidates, rng) {
            questions.push(text_question(
                QuestionKind::Currency,
                format!("What is the currency of {name}?"),
                currency.to_string(),
                d,
                rng,
            ));
        }
    }

    if let Some(flag) = country.flag_image() {
        if let Some(question) = flag_question(country, flag, &others, rng) {
            questions.push(question);
        }
    }

    questions
}

fn flag_question<R: Rng + ?Sized>(
    country: &CountryRecord,
    flag: &str,
    others: &[&CountryRecord],
    rng: &mut R,
) -> Option<QuizQuestion> {
    let name = country.common_name();
    let mut candidates: Vec<ImageOption> = others
        .iter()
        .filter(|c| c.common_name() != name)
        .filter_map(|c| {
            c.flag_image().map(|image| ImageOption {
                label: c.common_name().to_string(),
                image: image.to_string(),
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.label.cmp(&b.label));
    candidates.dedup_by(|a, b| a.label == b.label);
    if candidates.len() < DISTRACTORS {
        return None;
    }

    let mut images: Vec<ImageOption> = candidates
        .choose_multiple(rng, DISTRACTORS)
        .cloned()
        .collect();
    images.push(ImageOption {
        label: name.to_string(),
        image: flag.to_string(),
    });

    let mut question = QuizQuestion {
        kind: QuestionKind::Flag,
        prompt: format!("Which of the following is the flag of {name}?"),
        options: Vec::new(),
        image_options: Some(images),
        correct_answer: name.to_string(),
    };
    question.shuffle(rng);
    Some(question)
}
