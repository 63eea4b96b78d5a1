//! Diagnostic harness for the full supplier pipeline: display request,
//! acceptance, linked quantity request, approval, catalog publication.

use std::sync::Arc;

use anyhow::Result;

use stockroom_core::{ProductId, UserId};
use stockroom_inventory::InventoryRepository;
use stockroom_requests::{
    ApprovalDecision, ApprovalOutcome, ApprovalWorkflow, DisplayDecision,
    DisplayRequestRepository, NewDisplayRequest, NewQuantityRequest,
};
use stockroom_store::InMemoryStore;

fn main() -> Result<()> {
    stockroom_observability::init();

    let store = Arc::new(InMemoryStore::new());
    let displays = DisplayRequestRepository::new(store.clone());
    let workflow = ApprovalWorkflow::new(store.clone());
    let inventory = InventoryRepository::new(store);

    let supplier = UserId::new();
    let admin = UserId::new();
    let product = ProductId::new();

    let display = displays.create(NewDisplayRequest {
        supplier_id: supplier,
        product_id: product,
        product_name: "Stainless hinges".to_string(),
    })?;
    println!("display request filed: {} [{:?}]", display.id, display.status);

    let display = displays.respond(display.id, DisplayDecision::Accept, admin)?;
    println!("display request accepted by {admin}");

    let request = workflow.requests().create(NewQuantityRequest {
        supplier_id: supplier,
        product_id: product,
        product_name: "Stainless hinges".to_string(),
        requested_quantity: 40,
        note: Some("first delivery".to_string()),
    })?;
    let display = displays.link_quantity_request(display.id, request.id)?;
    println!(
        "quantity request {} linked to display request {}",
        request.id, display.id
    );

    let ApprovalOutcome::InventoryCreated(_, item) =
        workflow.respond(request.id, ApprovalDecision::ApproveFull, admin)?
    else {
        anyhow::bail!("expected a fresh inventory record");
    };
    println!(
        "approved in full: item {} qty {} [{:?}]",
        item.id, item.quantity, item.status
    );

    let item = inventory.set_published(item.id, true)?;
    println!("published to catalog: {} ({})", item.name, item.id);

    Ok(())
}
