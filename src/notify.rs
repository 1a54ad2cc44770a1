// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Transient user notifications

use std::cell::RefCell;
use std::fmt;

/// How a notification is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Confirmation
    Info,
    /// Something failed
    Destructive,
}

/// A toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short heading
    pub title: String,
    /// Details
    pub description: String,
    /// Presentation
    pub severity: Severity,
}

impl Notification {
    /// Confirmation toast
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    /// Failure toast
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Receives notifications
pub trait Notifier {
    /// Show a notification
    fn notify(&self, notification: Notification);
}

/// Emits notifications as log events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => tracing::info!("{}", notification),
            Severity::Destructive => tracing::error!("{}", notification),
        }
    }
}

/// Keeps every notification
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: RefCell<Vec<Notification>>,
}

impl NotificationLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far
    #[must_use]
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    /// Number of failure notifications received
    #[must_use]
    pub fn errors(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|n| n.severity == Severity::Destructive)
            .count()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.borrow_mut().push(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}
