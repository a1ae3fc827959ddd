//! Course structure: the read-only shape of a course as the engine sees it.
//!
//! The catalog owns courses; this crate only reads them through
//! [`CourseReader`](crate::store::CourseReader). A course is validated once
//! when it crosses that boundary and is trusted afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Every quiz question offers exactly this many options.
pub const QUIZ_OPTION_COUNT: usize = 4;

// ─── Publication ─────────────────────────────────────────────────────────────

/// Whether a course is visible to students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
  #[default]
  Draft,
  Published,
}

// ─── Modules ─────────────────────────────────────────────────────────────────

/// A single lesson. Only the number of lessons in a module matters for
/// progress; the fields are carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  pub title:     String,
  #[serde(default)]
  pub video_url: Option<String>,
}

/// One multiple-choice question with its correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub question:      String,
  pub options:       Vec<String>,
  /// Zero-based index into `options`.
  pub correct_index: u8,
}

/// The assignment attached to a module, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentBrief {
  pub url:         Option<String>,
  pub description: Option<String>,
}

/// An ordered unit of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
  pub title:      String,
  #[serde(default)]
  pub lessons:    Vec<Lesson>,
  #[serde(default)]
  pub assignment: Option<AssignmentBrief>,
  /// Empty when the module has no quiz.
  #[serde(default)]
  pub quiz:       Vec<QuizQuestion>,
}

impl Module {
  pub fn has_quiz(&self) -> bool { !self.quiz.is_empty() }

  /// Correct option indices in question order.
  pub fn correct_answers(&self) -> Vec<u8> {
    self.quiz.iter().map(|q| q.correct_index).collect()
  }
}

// ─── Course ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
  pub course_id: Uuid,
  pub title:     String,
  #[serde(default)]
  pub status:    CourseStatus,
  #[serde(default)]
  pub modules:   Vec<Module>,
}

impl Course {
  pub fn is_published(&self) -> bool { self.status == CourseStatus::Published }

  /// Sum of lesson counts across all modules.
  pub fn total_lessons(&self) -> usize {
    self.modules.iter().map(|m| m.lessons.len()).sum()
  }

  /// Look up a module by its position.
  pub fn module(&self, index: u32) -> Option<&Module> {
    self.modules.get(usize::try_from(index).ok()?)
  }

  /// Check the structural rules every stored course must satisfy.
  ///
  /// Quiz questions need exactly [`QUIZ_OPTION_COUNT`] options and a correct
  /// index that addresses one of them.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::InvalidInput("course title is required".into()));
    }
    for (m, module) in self.modules.iter().enumerate() {
      if module.title.trim().is_empty() {
        return Err(Error::InvalidInput(format!("module {m}: title is required")));
      }
      for (q, question) in module.quiz.iter().enumerate() {
        if question.options.len() != QUIZ_OPTION_COUNT {
          return Err(Error::InvalidInput(format!(
            "module {m}, question {q}: expected {QUIZ_OPTION_COUNT} options, got {}",
            question.options.len()
          )));
        }
        if usize::from(question.correct_index) >= QUIZ_OPTION_COUNT {
          return Err(Error::InvalidInput(format!(
            "module {m}, question {q}: correct index {} out of range",
            question.correct_index
          )));
        }
      }
    }
    Ok(())
  }
}
