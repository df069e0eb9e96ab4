//! Gateway reset
//!
//! Deletes every resource of every managed collection. Routes go before the
//! services they reference and consumers before plugins; certificates are last.

use gateway_model::Collection;
use tracing::{error, info};

use crate::admin::ResourceClient;

/// Collections in deletion order
pub const RESET_ORDER: [Collection; 5] = [
    Collection::Routes,
    Collection::Services,
    Collection::Consumers,
    Collection::Plugins,
    Collection::Certificates,
];

/// Outcome of a reset run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Resources deleted
    pub deleted: usize,
    /// Rendered list/delete failures, in order
    pub failures: Vec<String>,
}

impl ResetReport {
    /// Nothing failed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Clears all managed gateway state
pub struct Resetter {
    client: ResourceClient,
}

impl Resetter {
    /// Create a resetter
    #[must_use]
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// Delete every resource, collection by collection
    pub async fn reset(&self) -> ResetReport {
        let mut report = ResetReport::default();
        info!("Resetting gateway");

        for collection in RESET_ORDER {
            let ids = match self.client.list(collection).await {
                Ok(ids) => ids,
                Err(e) => {
                    error!(collection = %collection, error = %e, "Failed to list collection");
                    report.failures.push(e.to_string());
                    continue;
                }
            };

            for item in ids {
                match self.client.delete(collection, &item.id).await {
                    Ok(()) => {
                        info!(collection = %collection, id = %item.id, "Deleted");
                        report.deleted += 1;
                    }
                    Err(e) => {
                        error!(collection = %collection, id = %item.id, error = %e, "Failed to delete");
                        report.failures.push(e.to_string());
                    }
                }
            }
        }

        info!(
            deleted = report.deleted,
            failures = report.failures.len(),
            "Reset finished"
        );
        report
    }
}
