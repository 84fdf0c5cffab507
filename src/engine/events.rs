// ==========================================
// Setup Sheet Analyzer - Ledger events
// ==========================================
// Scope: notify observers after every merged-ledger rebuild
// The engine defines the trait; UI or persistence adapters implement it
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// Rebuild trigger
// ==========================================

/// What caused the merged ledger to be rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildTrigger {
    SheetAdded,
    SheetRemoved,
    SheetIgnored,
    SheetUnignored,
    SheetScaled,
    ProjectScaled,
    GroupsChanged,
    CatalogChanged,
    Reloaded,
}

impl RebuildTrigger {
    pub fn as_str(&self) -> &str {
        match self {
            RebuildTrigger::SheetAdded => "SheetAdded",
            RebuildTrigger::SheetRemoved => "SheetRemoved",
            RebuildTrigger::SheetIgnored => "SheetIgnored",
            RebuildTrigger::SheetUnignored => "SheetUnignored",
            RebuildTrigger::SheetScaled => "SheetScaled",
            RebuildTrigger::ProjectScaled => "ProjectScaled",
            RebuildTrigger::GroupsChanged => "GroupsChanged",
            RebuildTrigger::CatalogChanged => "CatalogChanged",
            RebuildTrigger::Reloaded => "Reloaded",
        }
    }
}

/// Ledger rebuilt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Owning project (None for in-memory sessions)
    pub project_id: Option<String>,
    pub trigger: RebuildTrigger,
    /// Rows in the rebuilt ledger, groups included
    pub tool_count: usize,
    pub group_count: usize,
}

// ==========================================
// Publisher trait
// ==========================================

/// Ledger event publisher
///
/// Called synchronously at the end of every rebuild. A failing
/// publisher never fails the rebuild; the error is logged.
pub trait LedgerEventPublisher: Send + Sync {
    fn publish(&self, event: &LedgerEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Publisher that drops every event
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl LedgerEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: &LedgerEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::trace!(
            "NoOpEventPublisher: skipping event - trigger={}, tools={}",
            event.trigger.as_str(),
            event.tool_count
        );
        Ok(())
    }
}

/// Wrapper around an optional shared publisher
#[derive(Clone, Default)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn LedgerEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn LedgerEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Publish if configured; failures are logged, not returned.
    pub fn publish(&self, event: LedgerEvent) {
        if let Some(publisher) = &self.inner {
            if let Err(e) = publisher.publish(&event) {
                tracing::warn!(
                    trigger = event.trigger.as_str(),
                    error = %e,
                    "ledger event publisher failed"
                );
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl std::fmt::Debug for OptionalEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalEventPublisher")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn event(trigger: RebuildTrigger) -> LedgerEvent {
        LedgerEvent {
            project_id: Some("P001".to_string()),
            trigger,
            tool_count: 3,
            group_count: 1,
        }
    }

    struct FailingPublisher;

    impl LedgerEventPublisher for FailingPublisher {
        fn publish(&self, _event: &LedgerEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            Err("subscriber gone".into())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<RebuildTrigger>>);

    impl LedgerEventPublisher for Recorder {
        fn publish(&self, event: &LedgerEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.0.lock().unwrap().push(event.trigger);
            Ok(())
        }
    }

    #[test]
    fn test_noop_publisher() {
        assert!(NoOpEventPublisher.publish(&event(RebuildTrigger::Reloaded)).is_ok());
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        publisher.publish(event(RebuildTrigger::SheetAdded));
    }

    #[test]
    fn test_optional_publisher_forwards() {
        let recorder = Arc::new(Recorder::default());
        let publisher = OptionalEventPublisher::with_publisher(recorder.clone());
        publisher.publish(event(RebuildTrigger::SheetScaled));
        publisher.publish(event(RebuildTrigger::ProjectScaled));

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![RebuildTrigger::SheetScaled, RebuildTrigger::ProjectScaled]
        );
    }

    #[test]
    fn test_optional_publisher_swallows_failure() {
        let publisher = OptionalEventPublisher::with_publisher(Arc::new(FailingPublisher));
        publisher.publish(event(RebuildTrigger::GroupsChanged));
    }
}
