//! Trivia quiz payload.

use crate::error::SessionError;
use crate::transition::{Step, Transition};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Answer letters, in button order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    /// First choice.
    A,
    /// Second choice.
    B,
    /// Third choice.
    C,
    /// Fourth choice.
    D,
}

impl Letter {
    /// All letters in order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Position of the choice this letter stands for.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Letter for the choice at `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parses `"A"`..`"D"`, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(letter)
    }
}

/// One multiple choice question with its choices already in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Category name.
    pub category: String,
    /// Difficulty, as provided by the source.
    pub difficulty: String,
    /// Question text.
    pub prompt: String,
    choices: Vec<String>,
    correct: Letter,
}

impl Question {
    /// Question whose choices are already ordered.
    pub fn new(
        category: impl Into<String>,
        difficulty: impl Into<String>,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct: Letter,
    ) -> Result<Self, SessionError> {
        if !(2..=4).contains(&choices.len()) || correct.index() >= choices.len() {
            return Err(SessionError::InvalidQuestion(choices.len()));
        }
        Ok(Self {
            category: category.into(),
            difficulty: difficulty.into(),
            prompt: prompt.into(),
            choices,
            correct,
        })
    }

    /// Mixes the correct answer in among the incorrect ones at a random position.
    pub fn shuffled<R>(
        category: impl Into<String>,
        difficulty: impl Into<String>,
        prompt: impl Into<String>,
        correct_answer: String,
        incorrect_answers: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, SessionError>
    where
        R: Rng + ?Sized,
    {
        let mut choices = incorrect_answers;
        choices.push(correct_answer.clone());
        choices.shuffle(rng);

        let correct = choices
            .iter()
            .position(|choice| *choice == correct_answer)
            .and_then(Letter::from_index)
            .ok_or(SessionError::InvalidQuestion(choices.len()))?;

        Self::new(category, difficulty, prompt, choices, correct)
    }

    /// Choices paired with their letters.
    pub fn choices(&self) -> impl Iterator<Item = (Letter, &str)> {
        Letter::ALL
            .into_iter()
            .zip(self.choices.iter().map(String::as_str))
    }

    /// Text of the choice behind `letter`.
    pub fn choice(&self, letter: Letter) -> Option<&str> {
        self.choices.get(letter.index()).map(String::as_str)
    }

    /// Letter of the correct choice.
    pub const fn correct(&self) -> Letter {
        self.correct
    }

    /// Text of the correct choice.
    pub fn correct_answer(&self) -> &str {
        &self.choices[self.correct.index()]
    }
}

/// Where the current question stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaPhase {
    /// Waiting for an answer.
    Asking,
    /// Answered; only "continue" is offered.
    Answered {
        /// Letter the player picked.
        chosen: Letter,
        /// Whether it was right.
        correct: bool,
    },
}

/// Trivia events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriviaEvent {
    /// Pick an answer for the current question.
    Answer(Letter),
    /// Move on to the next question, fetched by the binding.
    Continue(Box<Question>),
}

/// Running quiz state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    question: Question,
    phase: TriviaPhase,
    score: u32,
    answered: u32,
}

impl Trivia {
    /// Starts a quiz with its first question.
    pub const fn new(question: Question) -> Self {
        Self {
            question,
            phase: TriviaPhase::Asking,
            score: 0,
            answered: 0,
        }
    }

    /// The question on screen.
    pub const fn question(&self) -> &Question {
        &self.question
    }

    /// Phase of the current question.
    pub const fn phase(&self) -> TriviaPhase {
        self.phase
    }

    /// Correct answers so far.
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Questions answered so far.
    pub const fn answered(&self) -> u32 {
        self.answered
    }

    /// Feedback line for an answered question.
    pub fn feedback(&self) -> Option<String> {
        let TriviaPhase::Answered { chosen, correct } = self.phase else {
            return None;
        };

        let answer = self.question.correct_answer();
        if correct {
            Some(format!("**Correct!** The answer was {answer}."))
        } else {
            let picked = self.question.choice(chosen).unwrap_or_default();
            Some(format!(
                "**{picked}** was not the correct answer. The correct answer was **{answer}**."
            ))
        }
    }
}

impl Transition for Trivia {
    type Event = TriviaEvent;

    fn apply(&mut self, event: Self::Event) -> Step<Self::Event> {
        match (event, self.phase) {
            (TriviaEvent::Answer(letter), TriviaPhase::Asking) => {
                if self.question.choice(letter).is_none() {
                    return Step::reject("That answer is not available for this question.");
                }
                let correct = letter == self.question.correct();
                if correct {
                    self.score += 1;
                }
                self.answered += 1;
                self.phase = TriviaPhase::Answered {
                    chosen: letter,
                    correct,
                };
                Step::render()
            }
            (TriviaEvent::Continue(next), TriviaPhase::Answered { .. }) => {
                self.question = *next;
                self.phase = TriviaPhase::Asking;
                Step::render()
            }
            _ => Step::ignore(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question() -> Question {
        Question::new(
            "Science: Computers",
            "easy",
            "What does CPU stand for?",
            vec![
                "Central Processing Unit".into(),
                "Computer Personal Unit".into(),
                "Central Process Unit".into(),
                "Central Processor Unit".into(),
            ],
            Letter::A,
        )
        .unwrap()
    }

    #[test]
    fn test_correct_answer_scores() {
        let mut trivia = Trivia::new(question());
        assert_eq!(trivia.apply(TriviaEvent::Answer(Letter::A)), Step::render());
        assert_eq!(trivia.score(), 1);
        assert_eq!(
            trivia.feedback().unwrap(),
            "**Correct!** The answer was Central Processing Unit."
        );
    }

    #[test]
    fn test_wrong_answer_reveals_correct_one() {
        let mut trivia = Trivia::new(question());
        trivia.apply(TriviaEvent::Answer(Letter::C));
        assert_eq!(trivia.score(), 0);
        assert_eq!(
            trivia.feedback().unwrap(),
            "**Central Process Unit** was not the correct answer. The correct answer was **Central Processing Unit**."
        );
    }

    #[test]
    fn test_second_answer_is_ignored() {
        let mut trivia = Trivia::new(question());
        trivia.apply(TriviaEvent::Answer(Letter::B));
        assert_eq!(trivia.apply(TriviaEvent::Answer(Letter::A)), Step::ignore());
        assert_eq!(trivia.score(), 0);
        assert_eq!(trivia.answered(), 1);
    }

    #[test]
    fn test_continue_only_after_answer() {
        let mut trivia = Trivia::new(question());
        assert_eq!(
            trivia.apply(TriviaEvent::Continue(Box::new(question()))),
            Step::ignore()
        );

        trivia.apply(TriviaEvent::Answer(Letter::A));
        trivia.apply(TriviaEvent::Continue(Box::new(question())));
        assert_eq!(trivia.phase(), TriviaPhase::Asking);
        assert_eq!(trivia.score(), 1);
    }

    #[test]
    fn test_true_false_question_rejects_letter_c() {
        let q = Question::new("General", "easy", "Sky is blue?", vec!["True".into(), "False".into()], Letter::A)
            .unwrap();
        let mut trivia = Trivia::new(q);
        let step = trivia.apply(TriviaEvent::Answer(Letter::C));
        assert!(matches!(step.directive, crate::transition::Directive::Reject(_)));
        assert_eq!(trivia.phase(), TriviaPhase::Asking);
    }

    #[test]
    fn test_shuffled_tracks_correct_answer() {
        let mut rng = StdRng::seed_from_u64(42);
        let q = Question::shuffled(
            "History",
            "medium",
            "Who?",
            "Right".into(),
            vec!["W1".into(), "W2".into(), "W3".into()],
            &mut rng,
        )
        .unwrap();
        assert_eq!(q.correct_answer(), "Right");
        assert_eq!(q.choices().count(), 4);
    }

    #[test]
    fn test_letter_parse() {
        assert_eq!(Letter::parse("b"), Some(Letter::B));
        assert_eq!(Letter::parse("E"), None);
        assert_eq!(Letter::from_index(3), Some(Letter::D));
    }
}
