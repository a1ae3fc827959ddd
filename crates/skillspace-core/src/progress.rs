//! Progress derivation.
//!
//! `progress` on an [`Enrollment`] is a cache. It is always recomputed from
//! the distinct completed lessons and the course's current lesson count,
//! never trusted from storage or from a client.

use std::collections::HashSet;

use crate::{
  course::Course,
  enrollment::{Enrollment, EnrollmentStatus},
};

/// Percentage of `completed` out of `total`, rounded half-up and clamped to
/// 100. A course without lessons yields 0.
///
/// Half-up rounding is done in integers: `(200c + t) / 2t` equals
/// `floor(100c/t + 0.5)`. So 1/8 (12.5%) rounds to 13 and 1/3 to 33.
pub fn percentage(completed: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  let completed = completed as u128;
  let total = total as u128;
  let rounded = (200 * completed + total) / (2 * total);
  rounded.min(100) as u8
}

/// Number of distinct lessons recorded as complete.
///
/// Indices that no longer exist in the course still count; the clamp in
/// [`percentage`] keeps the result in range.
pub fn completed_count(enrollment: &Enrollment) -> usize {
  enrollment.completed_lessons.iter().collect::<HashSet<_>>().len()
}

/// Derive `(progress, status)` for `enrollment` against `course`.
///
/// Status only ever moves forward: once `completed`, it stays `completed`
/// even if the course later grows more lessons.
pub fn recompute(enrollment: &Enrollment, course: &Course) -> (u8, EnrollmentStatus) {
  let total = course.total_lessons();
  if total == 0 {
    return (0, enrollment.status);
  }

  let progress = percentage(completed_count(enrollment), total);
  let status = if progress >= 100 {
    EnrollmentStatus::Completed
  } else {
    enrollment.status
  };
  (progress, status)
}

/// Recompute and write the result back onto `enrollment`.
///
/// Returns `true` when this call moved the enrollment to `completed`.
pub fn apply(enrollment: &mut Enrollment, course: &Course) -> bool {
  let was_completed = enrollment.status == EnrollmentStatus::Completed;
  let (progress, status) = recompute(enrollment, course);
  enrollment.progress = progress;
  enrollment.status = status;
  !was_completed && status == EnrollmentStatus::Completed
}
