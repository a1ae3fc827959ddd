//! Quiz grading.

use serde::Serialize;

use crate::course::Module;

/// Result of scoring one answer sheet against a module quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
  pub score:           u32,
  pub total:           u32,
  pub correct_answers: Vec<u8>,
}

/// Score `answers` positionally against `module.quiz`.
///
/// One point per question whose answer equals the stored correct index.
/// Missing answers, out-of-range values and surplus entries never raise;
/// they simply earn nothing.
pub fn grade(module: &Module, answers: &[Option<i64>]) -> Grade {
  let score = module
    .quiz
    .iter()
    .enumerate()
    .filter(|(i, q)| {
      matches!(answers.get(*i), Some(Some(a)) if *a == i64::from(q.correct_index))
    })
    .count();

  Grade {
    score:           score as u32,
    total:           module.quiz.len() as u32,
    correct_answers: module.correct_answers(),
  }
}
