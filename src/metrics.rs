//! Prometheus metrics for the header relayer
//!
//! Exposed on the /metrics endpoint for Prometheus scraping.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Gauge,
};

lazy_static! {
    pub static ref HEADERS_RELAYED: Counter = register_counter!(
        "relayer_headers_relayed_total",
        "Total number of source headers submitted to the bridge"
    )
    .unwrap();

    pub static ref BATCHES_SUBMITTED: CounterVec = register_counter_vec!(
        "relayer_batches_submitted_total",
        "Total number of header batches submitted",
        &["status"]
    )
    .unwrap();

    pub static ref RELAY_ERRORS: CounterVec = register_counter_vec!(
        "relayer_errors_total",
        "Total number of relay errors",
        &["class"]
    )
    .unwrap();

    pub static ref BRIDGE_SYNCED_HEIGHT: Gauge = register_gauge!(
        "relayer_bridge_synced_height",
        "Synchronized height reported by the destination bridge contract"
    )
    .unwrap();

    pub static ref SOURCE_CONFIRMED_HEIGHT: Gauge = register_gauge!(
        "relayer_source_confirmed_height",
        "Latest source height eligible for relay after confirmation depth"
    )
    .unwrap();

    pub static ref LAST_SUCCESSFUL_SUBMISSION: Gauge = register_gauge!(
        "relayer_last_successful_submission_timestamp",
        "Unix timestamp of the last successful batch submission"
    )
    .unwrap();

    pub static ref UP: Gauge = register_gauge!(
        "relayer_up",
        "Whether the relayer is up and running"
    )
    .unwrap();
}
