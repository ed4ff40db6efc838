use crate::db::{DbConnection, DbPool};
use crate::domain::{
    agent::{Agent, AgentDecision, AgentListQuery, AgentStatus},
    approval::{Approval, ApprovalListQuery, ApprovalOutcome, ApprovalState},
    handover::{CodeKind, HandoverOutcome},
    message::{Message, MessageListQuery, NewMessage},
    order::{
        AvailableOrdersQuery, ClaimOutcome, NewOrder, Order, OrderListQuery, OrderStatus,
        TransitionOutcome, TransitionPatch,
    },
    pickup_site::{NewPickupSite, PickupSite},
    product::{NewProduct, Product, ProductListQuery, UpdateProduct},
    promotion::{NewPromotion, Promotion},
    tracking::{NewTrackingEvent, TrackingEvent},
    user::{NewUser, User, UserListQuery},
};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod agent;
pub mod approval;
pub mod errors;
pub mod message;
pub mod order;
pub mod pickup_site;
pub mod product;
pub mod promotion;
pub mod user;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over user accounts.
pub trait UserReader {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
}

/// Write operations over user accounts.
pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    /// Insert an agent account and its pending profile in one transaction.
    fn create_agent_user(
        &self,
        new_user: &NewUser,
        commission_rate_bp: i32,
        pickup_site_id: Option<i32>,
    ) -> RepositoryResult<(User, Agent)>;
    fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<User>;
}

/// Read-only operations over agent profiles.
pub trait AgentReader {
    fn get_agent_by_id(&self, id: i32) -> RepositoryResult<Option<Agent>>;
    fn get_agent_by_user_id(&self, user_id: i32) -> RepositoryResult<Option<Agent>>;
    fn list_agents(&self, query: AgentListQuery) -> RepositoryResult<(usize, Vec<Agent>)>;
}

/// Write operations over agent profiles.
pub trait AgentWriter {
    /// Apply an admin decision to a pending agent. Fails with `Conflict` when
    /// the agent is no longer pending.
    fn decide_agent(&self, agent_id: i32, decision: AgentDecision) -> RepositoryResult<Agent>;
    fn update_agent_status(&self, agent_id: i32, status: AgentStatus) -> RepositoryResult<Agent>;
    fn update_agent_location(
        &self,
        agent_id: i32,
        latitude: f64,
        longitude: f64,
    ) -> RepositoryResult<Agent>;
}

/// Read-only operations over pickup sites.
pub trait PickupSiteReader {
    fn get_pickup_site_by_id(&self, id: i32) -> RepositoryResult<Option<PickupSite>>;
    fn get_pickup_site_by_manager(&self, manager_id: i32) -> RepositoryResult<Option<PickupSite>>;
    fn list_pickup_sites(&self) -> RepositoryResult<Vec<PickupSite>>;
}

/// Write operations over pickup sites.
pub trait PickupSiteWriter {
    fn create_pickup_site(&self, new_site: &NewPickupSite) -> RepositoryResult<PickupSite>;
    fn assign_manager(&self, site_id: i32, manager_id: i32) -> RepositoryResult<PickupSite>;
}

/// Read-only operations over catalog products.
pub trait ProductReader {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    fn get_products_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
}

/// Write operations over catalog products.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn create_products(&self, new_products: &[NewProduct]) -> RepositoryResult<usize>;
    fn update_product(
        &self,
        product_id: i32,
        seller_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product>;
}

/// Read-only operations over promotion codes.
pub trait PromotionReader {
    fn get_promotion_by_code(&self, code: &str) -> RepositoryResult<Option<Promotion>>;
    fn list_promotions(
        &self,
        pagination: Pagination,
    ) -> RepositoryResult<(usize, Vec<Promotion>)>;
}

/// Write operations over promotion codes.
pub trait PromotionWriter {
    fn create_promotion(&self, new_promotion: &NewPromotion) -> RepositoryResult<Promotion>;
    fn set_promotion_active(&self, promotion_id: i32, is_active: bool)
    -> RepositoryResult<Promotion>;
}

/// Read-only operations over orders and their history.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    fn list_available_orders(
        &self,
        query: AvailableOrdersQuery,
    ) -> RepositoryResult<(usize, Vec<Order>)>;
    fn list_tracking_events(&self, order_id: i32) -> RepositoryResult<Vec<TrackingEvent>>;
}

/// Write operations over orders. Every status change is a conditional update
/// on the current status and appends a tracking event.
pub trait OrderWriter {
    /// Insert an order with its items, decrementing stock and redeeming the
    /// promotion in the same transaction.
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
    fn transition_order(
        &self,
        order_id: i32,
        from: &[OrderStatus],
        to: OrderStatus,
        actor_id: i32,
        patch: &TransitionPatch,
    ) -> RepositoryResult<TransitionOutcome>;
    fn claim_order(
        &self,
        order_id: i32,
        agent_id: i32,
        actor_id: i32,
        claimable: &[OrderStatus],
        pickup_code: &str,
    ) -> RepositoryResult<ClaimOutcome>;
    fn release_order(
        &self,
        order_id: i32,
        agent_id: i32,
        actor_id: i32,
        to: OrderStatus,
    ) -> RepositoryResult<TransitionOutcome>;
    /// Check a handover code and, when it matches, consume it and advance the
    /// order. Delivery also creates the payout approvals.
    fn submit_code(
        &self,
        order_id: i32,
        kind: CodeKind,
        submitted: &str,
        max_attempts: i32,
        actor_id: i32,
    ) -> RepositoryResult<HandoverOutcome>;
    fn regenerate_code(
        &self,
        order_id: i32,
        kind: CodeKind,
        code: &str,
    ) -> RepositoryResult<Order>;
    /// Append a position update and move the agent to the same coordinates.
    fn record_location(
        &self,
        event: &NewTrackingEvent,
        agent_id: i32,
    ) -> RepositoryResult<TrackingEvent>;
}

/// Read-only operations over payout approvals.
pub trait ApprovalReader {
    fn list_approvals(&self, query: ApprovalListQuery)
    -> RepositoryResult<(usize, Vec<Approval>)>;
}

/// Write operations over payout approvals.
pub trait ApprovalWriter {
    /// Move a pending approval to `target`, updating the order payout column
    /// and completing the order once every line is approved. Repeating the
    /// same decision changes nothing.
    fn decide_approval(
        &self,
        approval_id: i32,
        target: ApprovalState,
        admin_id: i32,
        note: Option<String>,
    ) -> RepositoryResult<ApprovalOutcome>;
}

/// Read-only operations over the message mailbox.
pub trait MessageReader {
    fn list_messages(&self, query: MessageListQuery) -> RepositoryResult<(usize, Vec<Message>)>;
    fn count_unread(&self, receiver_id: i32) -> RepositoryResult<usize>;
}

/// Write operations over the message mailbox.
pub trait MessageWriter {
    fn create_message(&self, new_message: &NewMessage) -> RepositoryResult<Message>;
    fn mark_message_read(&self, message_id: i32, receiver_id: i32) -> RepositoryResult<Message>;
}
