//! `stockroom-requests` — supplier request workflows.
//!
//! Suppliers ask to list a product (display request) and to deliver stock
//! for it (quantity request). Accepted quantity requests feed the inventory
//! collection through the approval workflow.

pub mod approval;
pub mod display;
pub mod quantity;

pub use approval::{ApprovalDecision, ApprovalOutcome, ApprovalWorkflow};
pub use display::{
    DisplayDecision, DisplayRequest, DisplayRequestRepository, DisplayRequestStatus,
    NewDisplayRequest,
};
pub use quantity::{
    NewQuantityRequest, QuantityRequest, QuantityRequestRepository, QuantityRequestStatus,
};
