//! Builders shared by the service unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::agent::{Agent, AgentStatus, ApprovalStatus};
use crate::domain::approval::{Approval, ApprovalKind, ApprovalState};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::message::{Message, NewMessage};
use crate::domain::order::{Order, OrderItem, OrderKind, OrderStatus, PayoutStatus};
use crate::domain::pickup_site::PickupSite;
use crate::domain::product::Product;
use crate::domain::promotion::{DiscountKind, Promotion};
use crate::domain::user::{AgentType, Role, User};

pub const BUYER_ID: i32 = 1;
pub const SELLER_ID: i32 = 2;
pub const AGENT_USER_ID: i32 = 3;
pub const AGENT_ID: i32 = 30;
pub const ADMIN_ID: i32 = 9;

pub fn datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 15)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .expect("valid datetime")
}

pub fn user(id: i32, role: Role) -> User {
    User {
        id,
        name: format!("user {id}"),
        email: format!("user{id}@example.com"),
        phone: None,
        password_hash: String::new(),
        role,
        agent_type: None,
        is_active: true,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn agent_user(id: i32, agent_type: AgentType) -> User {
    User {
        agent_type: Some(agent_type),
        ..user(id, Role::Agent)
    }
}

pub fn auth(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        agent_type: user.agent_type,
        exp: 4_102_444_800,
    }
}

pub fn buyer() -> AuthenticatedUser {
    auth(&user(BUYER_ID, Role::Buyer))
}

pub fn seller() -> AuthenticatedUser {
    auth(&user(SELLER_ID, Role::Seller))
}

pub fn admin() -> AuthenticatedUser {
    auth(&user(ADMIN_ID, Role::Admin))
}

pub fn fda() -> AuthenticatedUser {
    auth(&agent_user(AGENT_USER_ID, AgentType::FastDelivery))
}

pub fn agent(id: i32, user_id: i32, agent_type: AgentType) -> Agent {
    Agent {
        id,
        user_id,
        agent_type,
        status: AgentStatus::Available,
        approval_status: ApprovalStatus::Approved,
        commission_rate_bp: 1000,
        latitude: None,
        longitude: None,
        pickup_site_id: None,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn product(id: i32, seller_id: i32, price_amount: i64, stock: i32) -> Product {
    Product {
        id,
        seller_id,
        name: format!("product {id}"),
        sku: None,
        description: None,
        price_amount,
        currency: "RWF".to_string(),
        stock,
        is_archived: false,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn promotion(code: &str, kind: DiscountKind, value: i64) -> Promotion {
    Promotion {
        id: 1,
        code: code.to_string(),
        discount_kind: kind,
        discount_value: value,
        min_order_amount: None,
        usage_limit: None,
        usage_count: 0,
        starts_at: None,
        ends_at: None,
        is_active: true,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn pickup_site(id: i32, manager_id: Option<i32>) -> PickupSite {
    PickupSite {
        id,
        name: format!("site {id}"),
        address: "KN 5 Rd".to_string(),
        manager_id,
        is_active: true,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn order(id: i32, kind: OrderKind, status: OrderStatus) -> Order {
    Order {
        id,
        kind,
        buyer_id: BUYER_ID,
        seller_id: SELLER_ID,
        agent_id: None,
        pickup_site_id: None,
        created_by: BUYER_ID,
        status,
        subtotal_amount: 4500,
        discount_amount: 0,
        delivery_fee_amount: 0,
        total_amount: 4500,
        currency: "RWF".to_string(),
        promo_code: None,
        delivery_address: Some("KG 11 Ave".to_string()),
        notes: None,
        pickup_code: None,
        pickup_code_attempts: 0,
        pickup_verified_at: None,
        delivery_code: Some("654321".to_string()),
        delivery_code_attempts: 0,
        delivered_at: None,
        seller_payout_status: PayoutStatus::NotDue,
        fda_commission_status: PayoutStatus::NotDue,
        pda_commission_status: PayoutStatus::NotDue,
        ready_at: None,
        assigned_at: None,
        completed_at: None,
        cancelled_at: None,
        cancel_reason: None,
        items: vec![OrderItem {
            product_id: 1,
            name: "product 1".to_string(),
            quantity: 3,
            unit_price_amount: 1500,
        }],
        created_at: datetime(),
        updated_at: datetime(),
    }
}

/// Order held by the test FDA agent with a pickup code.
pub fn assigned_order(id: i32, status: OrderStatus) -> Order {
    Order {
        agent_id: Some(AGENT_ID),
        pickup_code: Some("123456".to_string()),
        ..order(id, OrderKind::Standard, status)
    }
}

pub fn approval(id: i32, kind: ApprovalKind, status: ApprovalState) -> Approval {
    Approval {
        id,
        order_id: 10,
        kind,
        beneficiary_id: SELLER_ID,
        amount: 4500,
        status,
        decided_by: None,
        decided_at: None,
        note: None,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn message_from(new_message: &NewMessage) -> Message {
    Message {
        id: 1,
        sender_id: new_message.sender_id,
        receiver_id: new_message.receiver_id,
        order_id: new_message.order_id,
        content: new_message.content.clone(),
        is_read: false,
        created_at: datetime(),
    }
}
