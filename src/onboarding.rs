//! Account creation wizard.
//!
//! Five linear steps: name, account credentials, body measurements,
//! activity level, confirmation. Each submission is validated before the
//! wizard advances; a failure names the step the user has to go back to.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ledger;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Name,
    Account,
    Body,
    Activity,
    Confirm,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Name => 1,
            Step::Account => 2,
            Step::Body => 3,
            Step::Activity => 4,
            Step::Confirm => 5,
        }
    }

    fn next(self) -> Step {
        match self {
            Step::Name => Step::Account,
            Step::Account => Step::Body,
            Step::Body => Step::Activity,
            Step::Activity | Step::Confirm => Step::Confirm,
        }
    }

    fn previous(self) -> Step {
        match self {
            Step::Name | Step::Account => Step::Name,
            Step::Body => Step::Account,
            Step::Activity => Step::Body,
            Step::Confirm => Step::Activity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Very,
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Very => "very",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct OnboardingError {
    pub step: Step,
    pub message: String,
}

impl OnboardingError {
    pub fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// What the user entered on one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    Name {
        name: String,
    },
    Account {
        email: String,
        password: String,
    },
    Body {
        current_weight_kg: f64,
        goal_weight_kg: f64,
    },
    Activity {
        activity_level: ActivityLevel,
    },
}

impl StepData {
    fn step(&self) -> Step {
        match self {
            StepData::Name { .. } => Step::Name,
            StepData::Account { .. } => Step::Account,
            StepData::Body { .. } => Step::Body,
            StepData::Activity { .. } => Step::Activity,
        }
    }
}

/// Everything collected so far. Also the body of `POST /onboarding`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Draft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub current_weight_kg: Option<f64>,
    pub goal_weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

/// A completed wizard, ready to become an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub current_weight_kg: Option<f64>,
    pub goal_weight_kg: f64,
    pub activity_level: Option<ActivityLevel>,
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step: Option<Step>,
    draft: Draft,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step.unwrap_or(Step::Name)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Validates `data` for the current step, keeps it and moves forward.
    pub fn submit(&mut self, data: StepData) -> Result<Step, OnboardingError> {
        let current = self.step();
        if data.step() != current {
            return Err(OnboardingError::new(
                current,
                format!("expected data for step {}", current.number()),
            ));
        }

        match data {
            StepData::Name { name } => {
                let name = name.trim();
                if name.chars().count() < MIN_NAME_LEN {
                    return Err(OnboardingError::new(Step::Name, "Please enter your name."));
                }
                self.draft.name = Some(name.to_string());
            }
            StepData::Account { email, password } => {
                let email = email.trim();
                if !is_valid_email(email) {
                    return Err(OnboardingError::new(
                        Step::Account,
                        "Please enter a valid email.",
                    ));
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(OnboardingError::new(
                        Step::Account,
                        "Password must be at least 6 characters.",
                    ));
                }
                self.draft.email = Some(email.to_lowercase());
                self.draft.password = Some(password);
            }
            StepData::Body {
                current_weight_kg,
                goal_weight_kg,
            } => {
                let current = ledger::positive("current_weight_kg", current_weight_kg)
                    .map_err(|_| OnboardingError::new(Step::Body, "Please enter a valid weight."))?;
                let goal = ledger::positive("goal_weight_kg", goal_weight_kg)
                    .map_err(|_| OnboardingError::new(Step::Body, "Please enter a valid weight."))?;
                if goal >= current {
                    return Err(OnboardingError::new(
                        Step::Body,
                        "Goal weight must be less than current weight.",
                    ));
                }
                self.draft.current_weight_kg = Some(current);
                self.draft.goal_weight_kg = Some(goal);
            }
            StepData::Activity { activity_level } => {
                self.draft.activity_level = Some(activity_level);
            }
        }

        let next = current.next();
        self.step = Some(next);
        Ok(next)
    }

    pub fn back(&mut self) -> Step {
        let previous = self.step().previous();
        self.step = Some(previous);
        previous
    }

    /// Completes the wizard from the confirmation step.
    ///
    /// On failure the wizard is moved to the step that needs attention.
    pub fn finish(&mut self) -> Result<Registration, OnboardingError> {
        if self.step() != Step::Confirm {
            return Err(OnboardingError::new(
                self.step(),
                "Please complete all previous steps.",
            ));
        }

        let result = registration_from(self.draft.clone());
        if let Err(e) = &result {
            self.step = Some(e.step);
        }
        result
    }

    /// Runs a whole draft through every step in order.
    pub fn complete(draft: Draft) -> Result<Registration, OnboardingError> {
        let mut wizard = Wizard::new();

        wizard.submit(StepData::Name {
            name: draft.name.ok_or_else(|| incomplete(Step::Name))?,
        })?;
        match (draft.email, draft.password) {
            (Some(email), Some(password)) => {
                wizard.submit(StepData::Account { email, password })?;
            }
            _ => return Err(incomplete(Step::Account)),
        }
        match (draft.current_weight_kg, draft.goal_weight_kg) {
            (Some(current_weight_kg), Some(goal_weight_kg)) => {
                wizard.submit(StepData::Body {
                    current_weight_kg,
                    goal_weight_kg,
                })?;
            }
            _ => return Err(incomplete(Step::Body)),
        }
        wizard.submit(StepData::Activity {
            activity_level: draft.activity_level.ok_or_else(|| incomplete(Step::Activity))?,
        })?;
        wizard.finish()
    }
}

fn incomplete(step: Step) -> OnboardingError {
    OnboardingError::new(step, "Please complete all previous steps.")
}

fn registration_from(draft: Draft) -> Result<Registration, OnboardingError> {
    let name = draft.name.ok_or_else(|| incomplete(Step::Name))?;
    let (email, password) = match (draft.email, draft.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(incomplete(Step::Account)),
    };
    let goal_weight_kg = draft.goal_weight_kg.ok_or_else(|| incomplete(Step::Body))?;
    Ok(Registration {
        name,
        email,
        password,
        current_weight_kg: draft.current_weight_kg,
        goal_weight_kg,
        activity_level: draft.activity_level,
    })
}
