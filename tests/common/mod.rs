//! Helpers for integration tests.
#![allow(dead_code)]

use marketplace_orders::config::{HandoverSettings, OrderSettings};
use marketplace_orders::db::{DbPool, establish_connection_pool, run_migrations};
use marketplace_orders::domain::agent::{Agent, AgentDecision, AgentStatus};
use marketplace_orders::domain::auth::AuthenticatedUser;
use marketplace_orders::domain::order::OrderKind;
use marketplace_orders::domain::product::{NewProduct, Product};
use marketplace_orders::domain::user::{AgentType, NewUser, Role, User};
use marketplace_orders::forms::orders::{OrderLineForm, PlaceOrderForm};
use marketplace_orders::repository::{AgentWriter, DieselRepository, ProductWriter, UserWriter};

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        run_migrations(&mut conn).expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

pub fn settings() -> OrderSettings {
    OrderSettings {
        delivery_fee: 0,
        currency: "RWF".to_string(),
        handover: HandoverSettings::default(),
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

pub fn create_user(repo: &DieselRepository, name: &str, role: Role) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    repo.create_user(&NewUser::new(name, email, "unused-hash", role))
        .expect("create user")
}

/// Agent account that is approved and available for work.
pub fn create_agent(repo: &DieselRepository, name: &str, agent_type: AgentType) -> (User, Agent) {
    let email = format!("{}@example.com", name.to_lowercase());
    let new_user = NewUser::new(name, email, "unused-hash", Role::Agent).with_agent_type(agent_type);
    let (user, agent) = repo
        .create_agent_user(&new_user, 1000, None)
        .expect("create agent");
    repo.decide_agent(
        agent.id,
        AgentDecision::Approve {
            commission_rate_bp: None,
        },
    )
    .expect("approve agent");
    let agent = repo
        .update_agent_status(agent.id, AgentStatus::Available)
        .expect("agent available");
    (user, agent)
}

pub fn create_product(repo: &DieselRepository, seller: &User, price: i64, stock: i32) -> Product {
    repo.create_product(&NewProduct::new(seller.id, "Rice 5kg", price, "RWF").with_stock(stock))
        .expect("create product")
}

pub fn order_form(product_id: i32, quantity: i32) -> PlaceOrderForm {
    PlaceOrderForm {
        kind: OrderKind::Standard,
        items: vec![OrderLineForm {
            product_id,
            quantity,
        }],
        promo_code: None,
        pickup_site_id: None,
        delivery_address: Some("KG 11 Ave, Kigali".to_string()),
        notes: None,
    }
}
