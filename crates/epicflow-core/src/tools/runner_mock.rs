//! Scripted [`StepRunner`] for orchestration tests.

use crate::error::Result;
use crate::tools::runner::{Step, StepKind, StepOutcome, StepRunner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// URL the mock reports for created pull requests unless told otherwise.
pub const MOCK_PR_URL: &str = "https://github.com/acme/shop/pull/1";

/// Step runner that records every step and passes unless a failure was
/// scripted for its kind.
///
/// # Examples
///
/// ```
/// use epicflow_core::tools::runner::{Step, StepKind, StepRunner, run_sequence};
/// use epicflow_core::tools::runner_mock::MockStepRunner;
///
/// let runner = MockStepRunner::new();
/// runner.fail(StepKind::Tests, "1 failed");
///
/// assert!(run_sequence(&runner, &Step::checks()).is_err());
/// assert_eq!(runner.ran(), vec![StepKind::Tests]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockStepRunner {
    steps: Arc<Mutex<Vec<Step>>>,
    failures: Arc<Mutex<HashMap<StepKind, String>>>,
    existing_pr: Arc<Mutex<Option<String>>>,
    locate_calls: Arc<Mutex<usize>>,
}

impl MockStepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every run of `kind` fail with `output`.
    pub fn fail(&self, kind: StepKind, output: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(kind, output.to_string());
    }

    /// Pretends a pull request already exists for the branch.
    pub fn set_existing_pr(&self, url: &str) {
        *self.existing_pr.lock().unwrap() = Some(url.to_string());
    }

    /// Kinds of the steps run so far, in order.
    pub fn ran(&self) -> Vec<StepKind> {
        self.steps.lock().unwrap().iter().map(Step::kind).collect()
    }

    /// The steps run so far, with their data.
    pub fn steps(&self) -> Vec<Step> {
        self.steps.lock().unwrap().clone()
    }

    /// How often `locate_pr` was called.
    pub fn locate_calls(&self) -> usize {
        *self.locate_calls.lock().unwrap()
    }
}

impl StepRunner for MockStepRunner {
    fn run(&self, step: &Step) -> Result<StepOutcome> {
        self.steps.lock().unwrap().push(step.clone());

        if let Some(output) = self.failures.lock().unwrap().get(&step.kind()) {
            return Ok(StepOutcome::Failed {
                output: output.clone(),
            });
        }

        let output = match step {
            Step::PrCreate(_) => self
                .existing_pr
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| MOCK_PR_URL.to_string()),
            _ => String::new(),
        };
        Ok(StepOutcome::Passed { output })
    }

    fn locate_pr(&self) -> Result<Option<String>> {
        *self.locate_calls.lock().unwrap() += 1;
        Ok(self.existing_pr.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::runner::PrRequest;

    #[test]
    fn test_mock_runner_records_steps() {
        let runner = MockStepRunner::new();
        runner.run(&Step::Tests).unwrap();
        runner
            .run(&Step::VcsCommit {
                message: "msg".to_string(),
            })
            .unwrap();

        assert_eq!(runner.ran(), vec![StepKind::Tests, StepKind::VcsCommit]);
        assert_eq!(
            runner.steps()[1],
            Step::VcsCommit {
                message: "msg".to_string()
            }
        );
    }

    #[test]
    fn test_mock_runner_pr_url() {
        let runner = MockStepRunner::new();
        let pr = Step::PrCreate(PrRequest {
            title: "t".to_string(),
            body: "b".to_string(),
            draft: false,
        });

        assert_eq!(runner.run(&pr).unwrap().output(), MOCK_PR_URL);
        assert_eq!(runner.locate_pr().unwrap(), None);

        runner.set_existing_pr("https://github.com/acme/shop/pull/5");
        assert_eq!(
            runner.locate_pr().unwrap().as_deref(),
            Some("https://github.com/acme/shop/pull/5")
        );
        assert_eq!(runner.locate_calls(), 2);
    }
}
