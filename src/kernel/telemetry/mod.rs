//! Sampling and delivery bookkeeping for the telemetry pipeline.
//!
//! # INVARIANT
//! The recorder is a READ-ONLY side-effect layer. Scheduling decisions never consult it;
//! it exists so delivery health can be inspected without scraping logs.
//!
//! # PAYLOAD INVARIANT
//! Recorded events carry ids, counts, sizes and codes only. Snapshot contents (names,
//! positions) and collector response bodies are never retained here.

pub mod event;
pub mod metrics;
pub mod recorder;
pub mod window;
