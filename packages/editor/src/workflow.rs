//! # Publish Workflow
//!
//! ```text
//!   draft ──submit──▶ in_review ──approve──▶ approved ──publish──▶ published
//!     ▲                   │                     │  ▲                  │
//!     └─request_changes───┘             schedule│  │unschedule        │ publish
//!                                               ▼  │                  ▼
//!                                             scheduled ──fire──▶ published
//! ```
//!
//! Transitions never panic and never partially apply: a refused transition
//! returns a [`WorkflowError`] and leaves the document untouched.

use chrono::{DateTime, Utc};
use pagecraft_model::{Document, WorkflowStatus};
use pagecraft_seo::SeoValidation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::info;

/// User-visible workflow refusal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Page must be approved before publishing (status: {0})")]
    NotApproved(WorkflowStatus),

    #[error("SEO checks are blocking publish: {}", .0.join(", "))]
    SeoBlocked(Vec<String>),

    #[error("Cannot {action} a page that is {from}")]
    InvalidTransition {
        from: WorkflowStatus,
        action: WorkflowAction,
    },

    #[error("Scheduled time {0} is in the past")]
    ScheduleInPast(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    Approve,
    RequestChanges,
    Publish,
    Schedule,
    Unschedule,
}

impl WorkflowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowAction::Submit => "submit",
            WorkflowAction::Approve => "approve",
            WorkflowAction::RequestChanges => "request changes for",
            WorkflowAction::Publish => "publish",
            WorkflowAction::Schedule => "schedule",
            WorkflowAction::Unschedule => "unschedule",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require(
    doc: &Document,
    action: WorkflowAction,
    allowed: &[WorkflowStatus],
) -> Result<(), WorkflowError> {
    if allowed.contains(&doc.status) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition {
            from: doc.status,
            action,
        })
    }
}

fn transition(doc: &mut Document, to: WorkflowStatus) {
    let from = doc.status;
    doc.status = to;
    if to != WorkflowStatus::Scheduled {
        doc.scheduled_at = None;
    }
    info!(document_id = %doc.id, from = %from, to = %to, "Workflow transition");
}

/// draft → in_review
pub fn submit_for_review(doc: &mut Document) -> Result<(), WorkflowError> {
    require(doc, WorkflowAction::Submit, &[WorkflowStatus::Draft])?;
    transition(doc, WorkflowStatus::InReview);
    Ok(())
}

/// in_review → approved
pub fn approve(doc: &mut Document) -> Result<(), WorkflowError> {
    require(doc, WorkflowAction::Approve, &[WorkflowStatus::InReview])?;
    transition(doc, WorkflowStatus::Approved);
    Ok(())
}

/// in_review → draft
pub fn request_changes(doc: &mut Document) -> Result<(), WorkflowError> {
    require(doc, WorkflowAction::RequestChanges, &[WorkflowStatus::InReview])?;
    transition(doc, WorkflowStatus::Draft);
    Ok(())
}

/// Check both publish preconditions without changing anything.
///
/// Status is checked first, so an unapproved page reports `NotApproved`
/// even when SEO is also blocking.
pub fn check_publish(doc: &Document, seo: &SeoValidation) -> Result<(), WorkflowError> {
    match doc.status {
        WorkflowStatus::Approved | WorkflowStatus::Published | WorkflowStatus::Scheduled => {}
        other => return Err(WorkflowError::NotApproved(other)),
    }

    if !seo.can_publish {
        return Err(WorkflowError::SeoBlocked(seo.blocking.clone()));
    }

    Ok(())
}

/// approved | published | scheduled → published
pub fn publish(doc: &mut Document, seo: &SeoValidation) -> Result<(), WorkflowError> {
    check_publish(doc, seo)?;
    transition(doc, WorkflowStatus::Published);
    Ok(())
}

/// Record a publish the backend has already confirmed
pub(crate) fn mark_published(doc: &mut Document) {
    transition(doc, WorkflowStatus::Published);
}

/// approved → scheduled
pub fn schedule(
    doc: &mut Document,
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    require(doc, WorkflowAction::Schedule, &[WorkflowStatus::Approved])?;
    if at <= now {
        return Err(WorkflowError::ScheduleInPast(at));
    }

    transition(doc, WorkflowStatus::Scheduled);
    doc.scheduled_at = Some(at);
    Ok(())
}

/// scheduled → approved
pub fn unschedule(doc: &mut Document) -> Result<(), WorkflowError> {
    require(doc, WorkflowAction::Unschedule, &[WorkflowStatus::Scheduled])?;
    transition(doc, WorkflowStatus::Approved);
    Ok(())
}

/// Publish a scheduled page once its time has come; returns whether it fired
pub fn fire_schedule(doc: &mut Document, now: DateTime<Utc>) -> bool {
    match (doc.status, doc.scheduled_at) {
        (WorkflowStatus::Scheduled, Some(at)) if now >= at => {
            transition(doc, WorkflowStatus::Published);
            true
        }
        _ => false,
    }
}

/// Actions the UI can offer for the current status
pub fn available_actions(status: WorkflowStatus) -> &'static [WorkflowAction] {
    match status {
        WorkflowStatus::Draft => &[WorkflowAction::Submit],
        WorkflowStatus::InReview => &[WorkflowAction::Approve, WorkflowAction::RequestChanges],
        WorkflowStatus::Approved => &[WorkflowAction::Publish, WorkflowAction::Schedule],
        WorkflowStatus::Scheduled => &[WorkflowAction::Publish, WorkflowAction::Unschedule],
        WorkflowStatus::Published => &[WorkflowAction::Publish],
    }
}
