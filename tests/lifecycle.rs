use marketplace_orders::config::HandoverSettings;
use marketplace_orders::domain::approval::{ApprovalKind, ApprovalState};
use marketplace_orders::domain::handover::CodeKind;
use marketplace_orders::domain::order::{Order, OrderKind, OrderStatus, PayoutStatus};
use marketplace_orders::domain::user::{AgentType, Role, User};
use marketplace_orders::forms::handover::CodeForm;
use marketplace_orders::forms::orders::{ManualOrderForm, OrderLineForm, PlaceOrderForm};
use marketplace_orders::forms::payouts::ApprovalFilter;
use marketplace_orders::forms::pickup_sites::AddPickupSiteForm;
use marketplace_orders::pagination::Pagination;
use marketplace_orders::repository::DieselRepository;
use marketplace_orders::services::errors::ServiceError;
use marketplace_orders::services::{assignment, handover, orders, payouts, pickup_sites};

mod common;

fn code(value: &str) -> CodeForm {
    CodeForm {
        code: value.to_string(),
    }
}

fn wrong_code(actual: &str) -> String {
    if actual == "000000" {
        "111111".to_string()
    } else {
        "000000".to_string()
    }
}

/// Walk a fresh order up to the point where the courier holds it.
fn assigned_order(
    repo: &DieselRepository,
    buyer: &User,
    seller: &User,
    agent: &User,
) -> (Order, Order) {
    let settings = common::settings();
    let product = common::create_product(repo, seller, 1500, 10);

    let placed = orders::place_order(
        repo,
        &common::auth(buyer),
        common::order_form(product.id, 3),
        &settings,
    )
    .unwrap();

    orders::mark_processing(repo, &common::auth(seller), placed.id).unwrap();
    orders::mark_ready_for_pickup(repo, &common::auth(seller), placed.id).unwrap();
    let accepted =
        assignment::accept_order(repo, &common::auth(agent), placed.id, &settings.handover)
            .unwrap();

    (placed, accepted)
}

#[test]
fn test_standard_order_runs_to_completion() {
    let test_db = common::TestDb::new("test_standard_order_runs_to_completion.db");
    let repo = test_db.repo();
    let handover_settings = HandoverSettings::default();

    let admin = common::create_user(&repo, "Admin", Role::Admin);
    let buyer = common::create_user(&repo, "Buyer", Role::Buyer);
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let (agent_user, _) = common::create_agent(&repo, "Courier", AgentType::FastDelivery);

    let (placed, accepted) = assigned_order(&repo, &buyer, &seller, &agent_user);
    assert_eq!(placed.total_amount, 4500);
    assert_eq!(placed.status, OrderStatus::Pending);
    let delivery_code = placed.delivery_code.clone().expect("buyer sees delivery code");
    assert_eq!(accepted.status, OrderStatus::Assigned);
    assert!(accepted.delivery_code.is_none());
    let pickup_code = accepted.pickup_code.clone().expect("agent sees pickup code");

    let picked_up = handover::verify_pickup(
        &repo,
        &common::auth(&seller),
        placed.id,
        code(&pickup_code),
        &handover_settings,
    )
    .unwrap();
    assert_eq!(picked_up.status, OrderStatus::PickedUp);

    let replay = handover::verify_pickup(
        &repo,
        &common::auth(&seller),
        placed.id,
        code(&pickup_code),
        &handover_settings,
    )
    .expect_err("code is single use");
    assert!(matches!(replay, ServiceError::CodeAlreadyUsed));

    let en_route = handover::mark_en_route(&repo, &common::auth(&agent_user), placed.id).unwrap();
    assert_eq!(en_route.status, OrderStatus::EnRoute);

    let mismatch = handover::confirm_delivery(
        &repo,
        &common::auth(&agent_user),
        placed.id,
        code(&wrong_code(&delivery_code)),
        &handover_settings,
    )
    .expect_err("wrong delivery code");
    assert!(matches!(mismatch, ServiceError::CodeMismatch { remaining: 4 }));

    let delivered = handover::confirm_delivery(
        &repo,
        &common::auth(&agent_user),
        placed.id,
        code(&delivery_code),
        &handover_settings,
    )
    .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivered_at.is_some());

    let approvals = payouts::list_approvals(
        &repo,
        &common::auth(&admin),
        ApprovalFilter {
            order_id: Some(placed.id),
            ..ApprovalFilter::default()
        },
        Pagination::new(1, 20),
    )
    .unwrap();
    assert_eq!(approvals.total, 2);
    let seller_line = &approvals.items[0];
    let agent_line = &approvals.items[1];
    assert_eq!(seller_line.kind, ApprovalKind::SellerPayout);
    assert_eq!(seller_line.beneficiary_id, seller.id);
    assert_eq!(seller_line.amount, 4500);
    assert_eq!(agent_line.kind, ApprovalKind::FdaCommission);
    assert_eq!(agent_line.beneficiary_id, agent_user.id);
    assert_eq!(agent_line.amount, 450);

    let first = payouts::approve(&repo, &common::auth(&admin), seller_line.id).unwrap();
    assert!(first.changed);
    let in_between = orders::get_order(&repo, &common::auth(&admin), placed.id).unwrap();
    assert_eq!(in_between.status, OrderStatus::Delivered);

    payouts::approve(&repo, &common::auth(&admin), agent_line.id).unwrap();
    let repeat = payouts::approve(&repo, &common::auth(&admin), agent_line.id).unwrap();
    assert!(!repeat.changed);
    assert_eq!(repeat.approval.status, ApprovalState::Approved);

    let completed = orders::get_order(&repo, &common::auth(&admin), placed.id).unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.seller_payout_status, PayoutStatus::Released);
    assert_eq!(completed.fda_commission_status, PayoutStatus::Released);
    assert_eq!(completed.pda_commission_status, PayoutStatus::NotDue);

    let history = orders::tracking_history(&repo, &common::auth(&buyer), placed.id).unwrap();
    let statuses: Vec<_> = history.iter().map(|event| event.status).collect();
    assert_eq!(statuses.first(), Some(&OrderStatus::Pending));
    assert_eq!(statuses.last(), Some(&OrderStatus::Completed));
}

#[test]
fn test_delivery_code_locks_until_regenerated() {
    let test_db = common::TestDb::new("test_delivery_code_locks_until_regenerated.db");
    let repo = test_db.repo();
    let handover_settings = HandoverSettings::default();

    let admin = common::create_user(&repo, "Admin", Role::Admin);
    let buyer = common::create_user(&repo, "Buyer", Role::Buyer);
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let (agent_user, _) = common::create_agent(&repo, "Courier", AgentType::FastDelivery);

    let (placed, accepted) = assigned_order(&repo, &buyer, &seller, &agent_user);
    let delivery_code = placed.delivery_code.clone().unwrap();
    handover::verify_pickup(
        &repo,
        &common::auth(&seller),
        placed.id,
        code(accepted.pickup_code.as_deref().unwrap()),
        &handover_settings,
    )
    .unwrap();

    let wrong = wrong_code(&delivery_code);
    for remaining in (0..handover_settings.max_attempts).rev() {
        let err = handover::confirm_delivery(
            &repo,
            &common::auth(&agent_user),
            placed.id,
            code(&wrong),
            &handover_settings,
        )
        .expect_err("wrong code");
        assert!(
            matches!(err, ServiceError::CodeMismatch { remaining: left } if left == remaining),
            "unexpected error {err:?}"
        );
    }

    let locked = handover::confirm_delivery(
        &repo,
        &common::auth(&agent_user),
        placed.id,
        code(&delivery_code),
        &handover_settings,
    )
    .expect_err("locked code");
    assert!(matches!(locked, ServiceError::CodeLocked));

    let forbidden = handover::regenerate_code(
        &repo,
        &common::auth(&buyer),
        placed.id,
        CodeKind::Delivery,
        &handover_settings,
    )
    .expect_err("only admins regenerate");
    assert!(matches!(forbidden, ServiceError::Forbidden));

    let regenerated = handover::regenerate_code(
        &repo,
        &common::auth(&admin),
        placed.id,
        CodeKind::Delivery,
        &handover_settings,
    )
    .unwrap();
    assert_eq!(regenerated.delivery_code_attempts, 0);
    let fresh = regenerated.delivery_code.unwrap();

    let delivered = handover::confirm_delivery(
        &repo,
        &common::auth(&agent_user),
        placed.id,
        code(&fresh),
        &handover_settings,
    )
    .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[test]
fn test_only_buyers_place_orders() {
    let test_db = common::TestDb::new("test_only_buyers_place_orders.db");
    let repo = test_db.repo();
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let product = common::create_product(&repo, &seller, 1500, 10);

    let err = orders::place_order(
        &repo,
        &common::auth(&seller),
        common::order_form(product.id, 1),
        &common::settings(),
    )
    .expect_err("sellers cannot buy");
    assert!(matches!(err, ServiceError::Forbidden));
}

#[test]
fn test_cancelled_order_returns_stock() {
    let test_db = common::TestDb::new("test_cancelled_order_returns_stock.db");
    let repo = test_db.repo();
    let buyer = common::create_user(&repo, "Buyer", Role::Buyer);
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let stranger = common::create_user(&repo, "Stranger", Role::Buyer);
    let product = common::create_product(&repo, &seller, 1500, 4);

    let placed = orders::place_order(
        &repo,
        &common::auth(&buyer),
        common::order_form(product.id, 4),
        &common::settings(),
    )
    .unwrap();

    let hidden = orders::get_order(&repo, &common::auth(&stranger), placed.id)
        .expect_err("not a party");
    assert!(matches!(hidden, ServiceError::NotFound));

    let sold_out = orders::place_order(
        &repo,
        &common::auth(&stranger),
        common::order_form(product.id, 1),
        &common::settings(),
    )
    .expect_err("no stock left");
    assert!(matches!(sold_out, ServiceError::Conflict(_)));

    let cancelled = orders::cancel_order(
        &repo,
        &common::auth(&buyer),
        placed.id,
        Default::default(),
    )
    .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    orders::place_order(
        &repo,
        &common::auth(&stranger),
        common::order_form(product.id, 1),
        &common::settings(),
    )
    .unwrap();
}

#[test]
fn test_manual_order_requires_buyer_account() {
    let test_db = common::TestDb::new("test_manual_order_requires_buyer_account.db");
    let repo = test_db.repo();
    let admin = common::create_user(&repo, "Admin", Role::Admin);
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let buyer = common::create_user(&repo, "Walkin", Role::Buyer);
    let (manager, _) = common::create_agent(&repo, "Manager", AgentType::PickupSiteManager);
    let product = common::create_product(&repo, &seller, 1500, 10);

    let site = pickup_sites::create_pickup_site(
        &repo,
        &common::auth(&admin),
        AddPickupSiteForm {
            name: "Nyabugogo".to_string(),
            address: "KN 1 Rd".to_string(),
            manager_id: Some(manager.id),
        },
    )
    .unwrap();

    let form = |email: &str| ManualOrderForm {
        buyer_email: email.to_string(),
        items: vec![OrderLineForm {
            product_id: product.id,
            quantity: 2,
        }],
        delivery_address: None,
        notes: None,
    };

    let err = orders::place_manual_order(
        &repo,
        &common::auth(&manager),
        form(&seller.email),
        &common::settings(),
    )
    .expect_err("seller is not a buyer");
    assert!(matches!(err, ServiceError::Form(_)));

    let order = orders::place_manual_order(
        &repo,
        &common::auth(&manager),
        form(&buyer.email),
        &common::settings(),
    )
    .unwrap();
    assert_eq!(order.buyer_id, buyer.id);
    assert_eq!(order.pickup_site_id, Some(site.id));
    assert_eq!(order.created_by, manager.id);
    assert!(order.delivery_code.is_none());
}

#[test]
fn test_released_grocery_order_returns_to_pool() {
    let test_db = common::TestDb::new("test_released_grocery_order_returns_to_pool.db");
    let repo = test_db.repo();
    let settings = common::settings();
    let admin = common::create_user(&repo, "Admin", Role::Admin);
    let buyer = common::create_user(&repo, "Buyer", Role::Buyer);
    let seller = common::create_user(&repo, "Grocer", Role::Seller);
    let (courier, _) = common::create_agent(&repo, "Courier", AgentType::FastDelivery);
    let (walker, _) = common::create_agent(&repo, "Walker", AgentType::PickupDelivery);
    let product = common::create_product(&repo, &seller, 800, 10);

    let form = PlaceOrderForm {
        kind: OrderKind::Grocery,
        ..common::order_form(product.id, 2)
    };
    let placed = orders::place_order(&repo, &common::auth(&buyer), form, &settings).unwrap();
    assert_eq!(placed.kind, OrderKind::Grocery);
    assert_eq!(placed.status, OrderStatus::Pending);

    let pool = assignment::list_available_orders(
        &repo,
        &common::auth(&courier),
        Pagination::new(1, 20),
    )
    .unwrap();
    assert_eq!(pool.total, 1);
    assert_eq!(pool.items[0].id, placed.id);

    let other_pool =
        assignment::list_available_orders(&repo, &common::auth(&walker), Pagination::new(1, 20))
            .unwrap();
    assert_eq!(other_pool.total, 0);

    let accepted =
        assignment::accept_order(&repo, &common::auth(&courier), placed.id, &settings.handover)
            .unwrap();
    assert_eq!(accepted.status, OrderStatus::Assigned);
    assert!(accepted.pickup_code.is_some());

    let empty =
        assignment::list_available_orders(&repo, &common::auth(&courier), Pagination::new(1, 20))
            .unwrap();
    assert_eq!(empty.total, 0);

    let released = assignment::release_order(&repo, &common::auth(&courier), placed.id).unwrap();
    assert_eq!(released.status, OrderStatus::Pending);
    assert_eq!(released.agent_id, None);

    let stored = orders::get_order(&repo, &common::auth(&admin), placed.id).unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.agent_id, None);
    assert_eq!(stored.pickup_code, None);

    let pool_again =
        assignment::list_available_orders(&repo, &common::auth(&courier), Pagination::new(1, 20))
            .unwrap();
    assert_eq!(pool_again.total, 1);
    assert_eq!(pool_again.items[0].id, placed.id);
}

#[test]
fn test_manual_order_runs_to_completion_with_pickup_courier() {
    let test_db =
        common::TestDb::new("test_manual_order_runs_to_completion_with_pickup_courier.db");
    let repo = test_db.repo();
    let settings = common::settings();
    let admin = common::create_user(&repo, "Admin", Role::Admin);
    let seller = common::create_user(&repo, "Seller", Role::Seller);
    let buyer = common::create_user(&repo, "Walkin", Role::Buyer);
    let (manager, _) = common::create_agent(&repo, "Manager", AgentType::PickupSiteManager);
    let (walker, _) = common::create_agent(&repo, "Walker", AgentType::PickupDelivery);
    let (courier, _) = common::create_agent(&repo, "Courier", AgentType::FastDelivery);
    let product = common::create_product(&repo, &seller, 1500, 10);

    let site = pickup_sites::create_pickup_site(
        &repo,
        &common::auth(&admin),
        AddPickupSiteForm {
            name: "Remera".to_string(),
            address: "KG 9 Ave".to_string(),
            manager_id: Some(manager.id),
        },
    )
    .unwrap();

    let placed = orders::place_manual_order(
        &repo,
        &common::auth(&manager),
        ManualOrderForm {
            buyer_email: buyer.email.clone(),
            items: vec![OrderLineForm {
                product_id: product.id,
                quantity: 2,
            }],
            delivery_address: Some("KG 11 Ave, Kigali".to_string()),
            notes: None,
        },
        &settings,
    )
    .unwrap();
    assert_eq!(placed.kind, OrderKind::Manual);
    assert_eq!(placed.pickup_site_id, Some(site.id));
    assert_eq!(placed.subtotal_amount, 3000);

    orders::mark_processing(&repo, &common::auth(&seller), placed.id).unwrap();
    orders::mark_ready_for_pickup(&repo, &common::auth(&seller), placed.id).unwrap();

    let fast_pool =
        assignment::list_available_orders(&repo, &common::auth(&courier), Pagination::new(1, 20))
            .unwrap();
    assert_eq!(fast_pool.total, 0);
    let wrong_courier =
        assignment::accept_order(&repo, &common::auth(&courier), placed.id, &settings.handover)
            .expect_err("manual orders go to pickup couriers");
    assert!(matches!(wrong_courier, ServiceError::Forbidden));

    let accepted =
        assignment::accept_order(&repo, &common::auth(&walker), placed.id, &settings.handover)
            .unwrap();
    assert_eq!(accepted.status, OrderStatus::Assigned);
    let pickup_code = accepted.pickup_code.clone().expect("courier sees pickup code");

    let picked_up = handover::verify_pickup(
        &repo,
        &common::auth(&manager),
        placed.id,
        code(&pickup_code),
        &settings.handover,
    )
    .unwrap();
    assert_eq!(picked_up.status, OrderStatus::PickedUp);

    let delivery_code = orders::get_order(&repo, &common::auth(&buyer), placed.id)
        .unwrap()
        .delivery_code
        .expect("buyer sees delivery code");
    handover::mark_en_route(&repo, &common::auth(&walker), placed.id).unwrap();
    let delivered = handover::confirm_delivery(
        &repo,
        &common::auth(&walker),
        placed.id,
        code(&delivery_code),
        &settings.handover,
    )
    .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let approvals = payouts::list_approvals(
        &repo,
        &common::auth(&admin),
        ApprovalFilter {
            order_id: Some(placed.id),
            ..ApprovalFilter::default()
        },
        Pagination::new(1, 20),
    )
    .unwrap();
    assert_eq!(approvals.total, 2);
    let seller_line = &approvals.items[0];
    let walker_line = &approvals.items[1];
    assert_eq!(seller_line.kind, ApprovalKind::SellerPayout);
    assert_eq!(seller_line.amount, 3000);
    assert_eq!(walker_line.kind, ApprovalKind::PdaCommission);
    assert_eq!(walker_line.beneficiary_id, walker.id);
    assert_eq!(walker_line.amount, 300);

    payouts::approve(&repo, &common::auth(&admin), seller_line.id).unwrap();
    payouts::approve(&repo, &common::auth(&admin), walker_line.id).unwrap();

    let completed = orders::get_order(&repo, &common::auth(&admin), placed.id).unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(completed.seller_payout_status, PayoutStatus::Released);
    assert_eq!(completed.pda_commission_status, PayoutStatus::Released);
    assert_eq!(completed.fda_commission_status, PayoutStatus::NotDue);
}
