//! Client controller driven against the real HTTP API.

mod common;

use std::sync::Arc;

use ticketdesk_core::{
    ClientError, FilterCriteria, HttpTicketService, Priority, TicketController, TicketDraft,
    TicketPatch, TicketStatus, TicketStore,
};

use common::TestFixture;

async fn setup() -> (TestFixture, TicketController) {
    let fixture = TestFixture::new();
    let base_url = fixture.serve().await;
    let controller = TicketController::new(Arc::new(HttpTicketService::new(base_url)));
    (fixture, controller)
}

#[tokio::test]
async fn test_create_against_empty_store() {
    let (fixture, controller) = setup().await;
    controller.load().await.unwrap();
    assert!(controller.tickets().await.is_empty());

    let draft = TicketDraft::new("Printer down", "No toner", "jdoe").with_priority(Priority::Medium);
    let ticket = controller.create(draft).await.unwrap();

    let tickets = controller.tickets().await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, ticket.id);
    assert_eq!(tickets[0].title, "Printer down");
    assert_eq!(tickets[0].description, "No toner");
    assert_eq!(tickets[0].created_by, "jdoe");
    assert_eq!(tickets[0].priority, Priority::Medium);
    assert_eq!(tickets[0].status, TicketStatus::Open);

    let stored = fixture.store.get(&ticket.id).unwrap().unwrap();
    assert_eq!(stored, tickets[0]);
}

#[tokio::test]
async fn test_load_mirrors_server_list() {
    let (fixture, controller) = setup().await;
    for title in ["one", "two", "three"] {
        fixture
            .store
            .create(TicketDraft::new(title, "body", "seed"))
            .unwrap();
    }

    controller.load().await.unwrap();

    let server = fixture.store.list(&Default::default()).unwrap();
    assert_eq!(controller.tickets().await, server);
}

#[tokio::test]
async fn test_update_priority_and_delete_round_trip() {
    let (fixture, controller) = setup().await;
    let a = fixture.store.create(TicketDraft::new("a", "body", "x")).unwrap();
    let b = fixture.store.create(TicketDraft::new("b", "body", "x")).unwrap();
    controller.load().await.unwrap();

    let updated = controller.update_priority(&a.id, Priority::High).await.unwrap();
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(controller.tickets().await[0].priority, Priority::High);
    assert_eq!(
        fixture.store.get(&a.id).unwrap().unwrap().priority,
        Priority::High
    );

    controller.delete(&b.id).await.unwrap();
    assert_eq!(controller.tickets().await.len(), 1);
    assert!(fixture.store.get(&b.id).unwrap().is_none());
}

#[tokio::test]
async fn test_delete_rejected_by_server_rolls_back() {
    let (fixture, controller) = setup().await;
    let a = fixture.store.create(TicketDraft::new("a", "body", "x")).unwrap();
    controller.load().await.unwrap();

    // Gone on the server, still held locally
    fixture.store.delete(&a.id).unwrap();
    let result = controller.delete(&a.id).await;

    assert!(matches!(result, Err(ClientError::Service { status: 404, .. })));
    assert_eq!(controller.tickets().await.len(), 1);
    assert!(controller.last_error().await.is_some());
}

#[tokio::test]
async fn test_create_rejected_by_server_keeps_draft() {
    let (_fixture, controller) = setup().await;

    let draft = TicketDraft::new("", "missing title", "jdoe");
    let result = controller.create(draft.clone()).await;

    match result {
        Err(ClientError::Service { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("title"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
    assert!(controller.tickets().await.is_empty());
    assert_eq!(controller.draft().await, draft);
}

#[tokio::test]
async fn test_filter_and_search_over_loaded_tickets() {
    let (fixture, controller) = setup().await;
    let alpha = fixture
        .store
        .create(TicketDraft::new("Alpha bug", "crash", "x"))
        .unwrap();
    fixture
        .store
        .create(TicketDraft::new("Beta issue", "slow", "x"))
        .unwrap();
    fixture
        .store
        .create(TicketDraft::new("alpha2", "typo", "x"))
        .unwrap();
    fixture
        .store
        .update(&alpha.id, TicketPatch::status(TicketStatus::Resolved))
        .unwrap();
    controller.load().await.unwrap();

    controller.search("alpha").await;
    let titles: Vec<String> = controller.view().await.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Alpha bug", "alpha2"]);

    controller
        .set_filter(FilterCriteria::all().with_status(TicketStatus::Open))
        .await;
    let titles: Vec<String> = controller.view().await.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["alpha2"]);

    controller.search("").await;
    controller.set_filter(FilterCriteria::all()).await;
    assert_eq!(controller.view().await.len(), 3);
}
