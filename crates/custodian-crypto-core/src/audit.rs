//! Append-only, in-memory log of security-relevant events.
//!
//! The log is shared (`Arc<AuditLog>`) between the encryption engine and
//! the authentication state machine. It never evicts and is not persisted;
//! every recorded event is mirrored to `tracing`.

use std::sync::Mutex;

use serde::Serialize;

use crate::algorithm::AlgorithmTag;
use crate::current_epoch_secs;

/// A security-relevant event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuditEvent {
    /// A payload was sealed into a secure record.
    #[serde(rename_all = "camelCase")]
    Encryption {
        key_id: String,
        algorithm: AlgorithmTag,
    },
    /// A secure record was opened.
    #[serde(rename_all = "camelCase")]
    Decryption {
        key_id: String,
        algorithm: AlgorithmTag,
    },
    /// A biometric prompt resolved.
    BiometricAuth { success: bool },
    /// A record failed its integrity hash or AEAD tag check.
    TamperDetected,
    /// An expired key was presented.
    #[serde(rename_all = "camelCase")]
    KeyExpired { key_id: String },
    /// Access was refused (lockout, retry budget exhausted).
    AccessDenied { reason: String },
}

/// Discriminant of an [`AuditEvent`], for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEventKind {
    Encryption,
    Decryption,
    BiometricAuth,
    TamperDetected,
    KeyExpired,
    AccessDenied,
}

impl AuditEvent {
    #[must_use]
    pub const fn kind(&self) -> AuditEventKind {
        match self {
            Self::Encryption { .. } => AuditEventKind::Encryption,
            Self::Decryption { .. } => AuditEventKind::Decryption,
            Self::BiometricAuth { .. } => AuditEventKind::BiometricAuth,
            Self::TamperDetected => AuditEventKind::TamperDetected,
            Self::KeyExpired { .. } => AuditEventKind::KeyExpired,
            Self::AccessDenied { .. } => AuditEventKind::AccessDenied,
        }
    }
}

/// One entry in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Unix seconds at which the event was recorded.
    pub recorded_at: u64,
    pub event: AuditEvent,
}

/// Append-only audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    ///
    /// Best-effort: a poisoned lock still accepts the entry, so a panic in
    /// one consumer never silences later events.
    pub fn record(&self, event: AuditEvent) {
        trace_event(&event);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let sequence = entries.len() as u64;
        entries.push(AuditEntry {
            sequence,
            recorded_at: current_epoch_secs(),
            event,
        });
    }

    /// Snapshot of every entry in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the events only.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.entries().into_iter().map(|e| e.event).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of recorded events of `kind`.
    #[must_use]
    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|e| e.event.kind() == kind)
            .count()
    }
}

fn trace_event(event: &AuditEvent) {
    match event {
        AuditEvent::Encryption { key_id, algorithm } => {
            tracing::info!(key_id = %key_id, algorithm = %algorithm, "audit: encryption");
        }
        AuditEvent::Decryption { key_id, algorithm } => {
            tracing::info!(key_id = %key_id, algorithm = %algorithm, "audit: decryption");
        }
        AuditEvent::BiometricAuth { success } => {
            tracing::info!(success, "audit: biometric authentication");
        }
        AuditEvent::TamperDetected => tracing::warn!("audit: tamper detected"),
        AuditEvent::KeyExpired { key_id } => {
            tracing::warn!(key_id = %key_id, "audit: key expired");
        }
        AuditEvent::AccessDenied { reason } => {
            tracing::warn!(reason = %reason, "audit: access denied");
        }
    }
}
