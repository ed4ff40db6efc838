use std::sync::{Arc, Barrier};
use std::thread;

use marketplace_orders::config::HandoverSettings;
use marketplace_orders::domain::order::OrderStatus;
use marketplace_orders::domain::user::{AgentType, Role};
use marketplace_orders::repository::OrderReader;
use marketplace_orders::services::errors::ServiceError;
use marketplace_orders::services::{assignment, orders};

mod common;

const AGENTS: usize = 8;

#[test]
fn test_racing_agents_claim_once() {
    let test_db = common::TestDb::new("test_racing_agents_claim_once.db");
    let repo = test_db.repo();
    let buyer = common::create_user(&repo, "Buyer", Role::Buyer);
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let product = common::create_product(&repo, &seller, 1500, 10);

    let order = orders::place_order(
        &repo,
        &common::auth(&buyer),
        common::order_form(product.id, 1),
        &common::settings(),
    )
    .unwrap();
    orders::mark_processing(&repo, &common::auth(&seller), order.id).unwrap();
    orders::mark_ready_for_pickup(&repo, &common::auth(&seller), order.id).unwrap();

    let agents: Vec<_> = (0..AGENTS)
        .map(|n| common::create_agent(&repo, &format!("Courier{n}"), AgentType::FastDelivery))
        .collect();

    let barrier = Arc::new(Barrier::new(AGENTS));
    let handles: Vec<_> = agents
        .iter()
        .map(|(user, _)| {
            let repo = repo.clone();
            let barrier = Arc::clone(&barrier);
            let caller = common::auth(user);
            let order_id = order.id;
            thread::spawn(move || {
                barrier.wait();
                assignment::accept_order(&repo, &caller, order_id, &HandoverSettings::default())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked"))
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    for result in &results {
        if let Err(err) = result {
            assert!(
                matches!(err, ServiceError::AlreadyAssigned),
                "unexpected error {err:?}"
            );
        }
    }

    let stored = repo.get_order_by_id(order.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Assigned);
    assert_eq!(stored.agent_id, winners[0].agent_id);
    assert_eq!(stored.pickup_code, winners[0].pickup_code);
}
