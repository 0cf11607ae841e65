//! Test support: one-time logging setup and a shared glossary fixture.

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{DomainItem, DomainType};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else if let Err(e) = subscriber.try_init() {
        eprintln!("Error: Failed to set up logging: {}", e);
    }
}

fn item(id: &str, name: &str, kind: DomainType, path: &str) -> DomainItem {
    DomainItem::new(id, name, kind).with_path(path)
}

/// Small but complete glossary, deliberately listed out of depth order:
///
/// ```text
/// G1 Finance (group)
/// ├── D1 Billing (domain)
/// │   ├── O1 Invoice (object)
/// │   │   ├── E1 Invoice line (entity)
/// │   │   └── E2 Invoice header (entity)
/// │   └── A1 Issue invoice (activity)
/// └── D2 Ledger (domain)
///     └── O2 Journal entry (object)
/// G2 Customer (group)
/// └── D3 Accounts (domain)
/// ```
pub fn glossary_items() -> Vec<DomainItem> {
    vec![
        item("E1", "Invoice line", DomainType::Entity, "G1/D1/O1/E1"),
        item("G1", "Finance", DomainType::Group, "G1"),
        item("D1", "Billing", DomainType::Domain, "G1/D1"),
        item("O1", "Invoice", DomainType::Object, "G1/D1/O1"),
        item("E2", "Invoice header", DomainType::Entity, "G1/D1/O1/E2"),
        item("A1", "Issue invoice", DomainType::Activity, "G1/D1/A1"),
        item("D2", "Ledger", DomainType::Domain, "G1/D2"),
        item("O2", "Journal entry", DomainType::Object, "G1/D2/O2"),
        item("G2", "Customer", DomainType::Group, "G2"),
        item("D3", "Accounts", DomainType::Domain, "G2/D3"),
    ]
}

/// The three-item example `A -> [B, C]`.
pub fn abc_items() -> Vec<DomainItem> {
    vec![
        item("A", "A", DomainType::Group, "A"),
        item("B", "B", DomainType::Domain, "A/B"),
        item("C", "C", DomainType::Domain, "A/C"),
    ]
}
