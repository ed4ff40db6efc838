use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::user::AgentType;
use crate::pagination::Pagination;

string_enum! {
    /// Order families that used to live in separate tables.
    pub enum OrderKind as "order kind" {
        /// Physical goods bought from a seller's shop.
        Standard => "standard",
        /// Grocery or local-market order with direct agent assignment.
        Grocery => "grocery",
        /// Walk-in order recorded by a pickup site manager.
        Manual => "manual",
    }
}

impl OrderKind {
    /// Agent sub-type allowed to deliver orders of this kind.
    pub fn delivered_by(&self, agent_type: AgentType) -> bool {
        match self {
            OrderKind::Standard | OrderKind::Grocery => agent_type == AgentType::FastDelivery,
            OrderKind::Manual => agent_type == AgentType::PickupDelivery,
        }
    }

    /// Statuses from which an unassigned order of this kind may be claimed.
    pub fn claimable_statuses(&self) -> &'static [OrderStatus] {
        match self {
            OrderKind::Grocery => &[
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::ReadyForPickup,
            ],
            OrderKind::Standard | OrderKind::Manual => &[OrderStatus::ReadyForPickup],
        }
    }

    /// Status an order returns to when its agent releases it.
    pub fn release_status(&self) -> OrderStatus {
        match self {
            OrderKind::Grocery => OrderStatus::Pending,
            OrderKind::Standard | OrderKind::Manual => OrderStatus::ReadyForPickup,
        }
    }

    /// Order kinds an agent of `agent_type` may see in the available pool.
    pub fn for_agent(agent_type: AgentType) -> Vec<OrderKind> {
        OrderKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.delivered_by(agent_type))
            .collect()
    }
}

string_enum! {
    /// Lifecycle states of an order.
    pub enum OrderStatus as "order status" {
        Pending => "pending",
        Processing => "processing",
        ReadyForPickup => "ready_for_pickup",
        Assigned => "assigned",
        PickedUp => "picked_up",
        EnRoute => "en_route",
        Delivered => "delivered",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl OrderStatus {
    /// Completed and cancelled orders never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether the order may still be cancelled from this status.
    pub fn is_cancellable(&self) -> bool {
        !self.is_terminal() && *self != OrderStatus::Delivered
    }

    /// Whether the goods have left the seller.
    pub fn is_picked_up(&self) -> bool {
        matches!(
            self,
            OrderStatus::PickedUp
                | OrderStatus::EnRoute
                | OrderStatus::Delivered
                | OrderStatus::Completed
        )
    }

    /// Legal successor check for an order of `kind`.
    pub fn can_transition_to(&self, next: OrderStatus, kind: OrderKind) -> bool {
        use OrderStatus::*;

        if next == Cancelled {
            return self.is_cancellable();
        }

        match (self, next) {
            (Pending, Processing) => true,
            (Pending | Processing, Assigned) => kind == OrderKind::Grocery,
            (Processing, ReadyForPickup) => true,
            (ReadyForPickup, Assigned) => true,
            (Assigned, ReadyForPickup) => kind != OrderKind::Grocery,
            (Assigned, Pending) => kind == OrderKind::Grocery,
            (Assigned, PickedUp) => true,
            (PickedUp, EnRoute) => true,
            (PickedUp | EnRoute, Delivered) => true,
            (Delivered, Completed) => true,
            _ => false,
        }
    }

    /// Every status that may legally precede `next` for an order of `kind`.
    pub fn predecessors(next: OrderStatus, kind: OrderKind) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .iter()
            .copied()
            .filter(|status| status.can_transition_to(next, kind))
            .collect()
    }
}

string_enum! {
    /// Settlement state of one payout line of an order.
    pub enum PayoutStatus as "payout status" {
        /// The order has not been delivered, or the line does not apply.
        NotDue => "not_due",
        /// Awaiting admin approval.
        Pending => "pending",
        Released => "released",
        Rejected => "rejected",
    }
}

/// Line item copied from the catalog at order time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderItem {
    /// Catalog product the line was priced from.
    pub product_id: i32,
    /// Product name at order time.
    pub name: String,
    /// Units ordered.
    pub quantity: i32,
    /// Catalog price at order time in minor units.
    pub unit_price_amount: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price_amount * i64::from(self.quantity)
    }
}

/// Domain representation of an order of any kind.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Order {
    /// Unique identifier of the order.
    pub id: i32,
    /// Order family, which decides the agent type and claimable statuses.
    pub kind: OrderKind,
    /// User that owns the order. Always has the buyer role.
    pub buyer_id: i32,
    /// Seller whose products make up every line.
    pub seller_id: i32,
    /// Agent profile id (not user id) of the assigned agent.
    pub agent_id: Option<i32>,
    /// Pickup site for manual orders, or the one chosen by the buyer.
    pub pickup_site_id: Option<i32>,
    /// User that created the record: the buyer, or the site manager for manual orders.
    pub created_by: i32,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Sum of line totals in minor currency units.
    pub subtotal_amount: i64,
    /// Promotion discount, capped at the subtotal.
    pub discount_amount: i64,
    /// Flat delivery fee charged on top of the subtotal.
    pub delivery_fee_amount: i64,
    /// Amount the buyer pays: subtotal minus discount plus fee.
    pub total_amount: i64,
    /// ISO 4217 currency code shared by every amount.
    pub currency: String,
    /// Promotion redeemed at placement, if any.
    pub promo_code: Option<String>,
    /// Free-form address the courier delivers to.
    pub delivery_address: Option<String>,
    /// Buyer notes for the seller and courier.
    pub notes: Option<String>,
    /// Code the assigned agent reads to the seller. Set on claim.
    pub pickup_code: Option<String>,
    /// Failed pickup code submissions since the code was issued.
    pub pickup_code_attempts: i32,
    /// When the pickup code was consumed.
    pub pickup_verified_at: Option<NaiveDateTime>,
    /// Code the buyer reads to the courier. Set at placement.
    pub delivery_code: Option<String>,
    /// Failed delivery code submissions since the code was issued.
    pub delivery_code_attempts: i32,
    /// When the delivery code was consumed.
    pub delivered_at: Option<NaiveDateTime>,
    /// Settlement of the seller payout line.
    pub seller_payout_status: PayoutStatus,
    /// Settlement of the fast delivery agent commission.
    pub fda_commission_status: PayoutStatus,
    /// Settlement of the pickup delivery agent commission.
    pub pda_commission_status: PayoutStatus,
    /// When the seller marked the order ready for pickup.
    pub ready_at: Option<NaiveDateTime>,
    /// When the current agent claimed the order.
    pub assigned_at: Option<NaiveDateTime>,
    /// When the last payout was approved.
    pub completed_at: Option<NaiveDateTime>,
    /// When the order was cancelled.
    pub cancelled_at: Option<NaiveDateTime>,
    /// Reason given by whoever cancelled the order.
    pub cancel_reason: Option<String>,
    /// Lines priced from the catalog at placement.
    pub items: Vec<OrderItem>,
    /// Timestamp for when the order record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the order record.
    pub updated_at: NaiveDateTime,
}

impl Order {
    /// Strip the handover codes the given party is not allowed to see.
    ///
    /// The buyer holds the delivery code and reads it to the agent; the
    /// assigned agent holds the pickup code and reads it to the seller.
    pub fn redacted_for(mut self, viewer: OrderViewer) -> Self {
        match viewer {
            OrderViewer::Buyer => self.pickup_code = None,
            OrderViewer::AssignedAgent => self.delivery_code = None,
            OrderViewer::Admin => {}
            OrderViewer::Other => {
                self.pickup_code = None;
                self.delivery_code = None;
            }
        }
        self
    }
}

/// Relationship of the caller to an order, used for code redaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderViewer {
    Buyer,
    AssignedAgent,
    Admin,
    Other,
}

/// Validated line requested by a buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Fully priced payload inserted in one transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Order family.
    pub kind: OrderKind,
    /// Buyer the order belongs to.
    pub buyer_id: i32,
    /// Seller of every line.
    pub seller_id: i32,
    /// Pickup site, required for manual orders.
    pub pickup_site_id: Option<i32>,
    /// User creating the record.
    pub created_by: i32,
    /// Sum of line totals in minor currency units.
    pub subtotal_amount: i64,
    /// Discount from `promo_code`.
    pub discount_amount: i64,
    /// Flat delivery fee.
    pub delivery_fee_amount: i64,
    /// Subtotal minus discount plus fee.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Redeemed atomically with the insert when present.
    pub promo_code: Option<String>,
    /// Address the courier delivers to.
    pub delivery_address: Option<String>,
    /// Buyer notes.
    pub notes: Option<String>,
    /// Freshly generated delivery code held by the buyer.
    pub delivery_code: String,
    /// Priced lines; stock is decremented for each.
    pub items: Vec<OrderItem>,
}

/// Side data written together with a status change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionPatch {
    pub note: Option<String>,
    pub cancel_reason: Option<String>,
}

/// Result of a conditional status change.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied(Order),
    /// The order was no longer in an expected status; carries the status found.
    Stale(OrderStatus),
}

/// Result of an agent trying to claim an order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Claimed(Order),
    /// Another agent holds the order.
    AlreadyAssigned,
    /// The order is unassigned but not in a claimable status.
    NotClaimable(OrderStatus),
}

/// Visibility scope of an order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Buyer(i32),
    Seller(i32),
    Agent(i32),
    PickupSite(i32),
    All,
}

/// Query definition used to list orders.
#[derive(Debug, Clone)]
pub struct OrderListQuery {
    pub scope: OrderScope,
    pub status: Option<OrderStatus>,
    pub kind: Option<OrderKind>,
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new(scope: OrderScope) -> Self {
        Self {
            scope,
            status: None,
            kind: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(mut self, kind: OrderKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Query for unassigned orders an agent could accept.
#[derive(Debug, Clone)]
pub struct AvailableOrdersQuery {
    pub kinds: Vec<OrderKind>,
    pub pagination: Option<Pagination>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_allowed_until_delivery() {
        use OrderStatus::*;
        for status in [Pending, Processing, ReadyForPickup, Assigned, PickedUp, EnRoute] {
            assert!(
                status.can_transition_to(Cancelled, OrderKind::Standard),
                "{status} should be cancellable"
            );
        }
        for status in [Delivered, Completed, Cancelled] {
            assert!(!status.can_transition_to(Cancelled, OrderKind::Standard));
        }
    }

    #[test]
    fn only_grocery_orders_are_claimed_before_ready() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Assigned, OrderKind::Grocery));
        assert!(
            !OrderStatus::Pending.can_transition_to(OrderStatus::Assigned, OrderKind::Standard)
        );
        assert_eq!(
            OrderKind::Standard.claimable_statuses(),
            &[OrderStatus::ReadyForPickup]
        );
    }

    #[test]
    fn delivered_only_advances_to_completed() {
        let next: Vec<_> = OrderStatus::ALL
            .iter()
            .copied()
            .filter(|s| OrderStatus::Delivered.can_transition_to(*s, OrderKind::Standard))
            .collect();
        assert_eq!(next, vec![OrderStatus::Completed]);
    }

    #[test]
    fn predecessors_of_delivered() {
        assert_eq!(
            OrderStatus::predecessors(OrderStatus::Delivered, OrderKind::Standard),
            vec![OrderStatus::PickedUp, OrderStatus::EnRoute]
        );
    }

    #[test]
    fn agent_types_map_to_order_kinds() {
        assert_eq!(
            OrderKind::for_agent(AgentType::FastDelivery),
            vec![OrderKind::Standard, OrderKind::Grocery]
        );
        assert_eq!(
            OrderKind::for_agent(AgentType::PickupDelivery),
            vec![OrderKind::Manual]
        );
        assert!(OrderKind::for_agent(AgentType::PickupSiteManager).is_empty());
    }
}
