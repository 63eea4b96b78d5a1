//! Diagnostic harness for the approval workflow.
//!
//! Files a handful of quantity requests against the in-memory store, runs
//! every response variant (full, partial, reject, and the failure cases) and
//! prints the resulting request and inventory state.

use std::sync::Arc;

use anyhow::Result;

use stockroom_core::{ProductId, UserId};
use stockroom_requests::{ApprovalDecision, ApprovalOutcome, ApprovalWorkflow, NewQuantityRequest};
use stockroom_store::InMemoryStore;

fn main() -> Result<()> {
    stockroom_observability::init();

    let workflow = ApprovalWorkflow::new(Arc::new(InMemoryStore::new()));
    let supplier = UserId::new();
    let admin = UserId::new();
    let bolts = ProductId::new();

    let file = |name: &str, product: ProductId, quantity: u32| {
        workflow.requests().create(NewQuantityRequest {
            supplier_id: supplier,
            product_id: product,
            product_name: name.to_string(),
            requested_quantity: quantity,
            note: None,
        })
    };

    // Full approval with no existing stock: creates the record.
    let request = file("Hex bolts M8", bolts, 100)?;
    match workflow.respond(request.id, ApprovalDecision::ApproveFull, admin)? {
        ApprovalOutcome::InventoryCreated(resolved, item) => {
            println!(
                "full approval: request {} -> new item {} (qty {}, min {}, max {}, {:?})",
                resolved.id, item.id, item.quantity, item.min_stock_level, item.max_stock_level,
                item.status
            );
        }
        other => println!("unexpected outcome: {other:?}"),
    }

    // Partial approval on the same product: increments the record.
    let request = file("Hex bolts M8", bolts, 80)?;
    match workflow.respond(
        request.id,
        ApprovalDecision::ApprovePartial { approved_quantity: 30 },
        admin,
    )? {
        ApprovalOutcome::StockIncreased(resolved, item) => {
            println!(
                "partial approval: request {} -> item {} now at qty {}",
                resolved.id, item.id, item.quantity
            );
        }
        other => println!("unexpected outcome: {other:?}"),
    }

    // Rejection: no inventory change.
    let request = file("Wing nuts M6", ProductId::new(), 500)?;
    let outcome = workflow.respond(request.id, ApprovalDecision::Reject, admin)?;
    println!("rejection outcome: {outcome:?}");

    // Failure cases: overshooting partial, double response.
    let request = file("Washers M8", ProductId::new(), 10)?;
    let err = workflow
        .respond(
            request.id,
            ApprovalDecision::ApprovePartial { approved_quantity: 11 },
            admin,
        )
        .unwrap_err();
    println!("overshooting partial: {err}");

    workflow.respond(request.id, ApprovalDecision::ApproveFull, admin)?;
    let err = workflow
        .respond(request.id, ApprovalDecision::ApproveFull, admin)
        .unwrap_err();
    println!("double response: {err}");

    println!("\nfinal inventory:");
    for item in workflow.inventory().get_all()? {
        println!(
            "  {} | {:<16} qty {:>5} [{:?}] at {}",
            item.product_id, item.name, item.quantity, item.status, item.location
        );
    }

    Ok(())
}
