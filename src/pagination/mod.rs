//! Pagination module
//!
//! Supports: cursor links, offset/count batch fan-out, bounded cursor walk
//!
//! # Overview
//!
//! Every provider response is normalised into a `PageEnvelope` (items, next
//! cursor, total count). A `PaginationRequest` names one of the three
//! strategies together with its parameters; each strategy turns a request
//! into the full ordered list of records.

mod strategies;
mod types;

pub use strategies::{
    plan_batches, BatchFanOutFetcher, BatchSpec, BoundedCursorWalker, PageWalker,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_PAGES,
};
pub use types::{
    CursorLinkSource, CursorWalkRequest, EnvelopeLayout, FanOutRequest, PageEnvelope,
    PaginationRequest,
};
