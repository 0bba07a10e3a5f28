//! services/app/src/app/notify.rs
//!
//! User-facing notifications. Each view-model owns its own queue, which the
//! shell drains and presents; nothing here is fatal to the process.

use learnx_core::ports::PortError;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// A drained-by-the-shell queue of notifications.
#[derive(Debug, Default)]
pub struct Toasts {
    queue: Vec<Toast>,
}

impl Toasts {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    /// Surfaces a port failure per the error taxonomy: business rejections
    /// show the backend's message, expired sessions say so, and transport
    /// or shape problems are logged and shown generically.
    pub fn port_error(&mut self, fallback: &str, err: &PortError) {
        match err {
            PortError::Api { message, .. } if !message.is_empty() => {
                self.error(message.clone());
            }
            PortError::Unauthorized => {
                self.error("Your session has expired. Please sign in again.");
            }
            other => {
                error!("{}: {}", fallback, other);
                self.error(fallback);
            }
        }
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.queue.push(Toast {
            level,
            message: message.into(),
        });
    }
}
