use mockall::mock;

use super::{
    AgentReader, AgentWriter, ApprovalReader, ApprovalWriter, MessageReader, MessageWriter,
    OrderReader, OrderWriter, PickupSiteReader, PickupSiteWriter, ProductReader, ProductWriter,
    PromotionReader, PromotionWriter, UserReader, UserWriter,
};
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

mock! {
    pub UserReader {}

    impl UserReader for UserReader {
        fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    }
}

mock! {
    pub UserWriter {}

    impl UserWriter for UserWriter {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn create_agent_user(&self, new_user: &NewUser, commission_rate_bp: i32, pickup_site_id: Option<i32>) -> RepositoryResult<(User, Agent)>;
        fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<User>;
    }
}

mock! {
    pub AgentReader {}

    impl AgentReader for AgentReader {
        fn get_agent_by_id(&self, id: i32) -> RepositoryResult<Option<Agent>>;
        fn get_agent_by_user_id(&self, user_id: i32) -> RepositoryResult<Option<Agent>>;
        fn list_agents(&self, query: AgentListQuery) -> RepositoryResult<(usize, Vec<Agent>)>;
    }
}

mock! {
    pub AgentWriter {}

    impl AgentWriter for AgentWriter {
        fn decide_agent(&self, agent_id: i32, decision: AgentDecision) -> RepositoryResult<Agent>;
        fn update_agent_status(&self, agent_id: i32, status: AgentStatus) -> RepositoryResult<Agent>;
        fn update_agent_location(&self, agent_id: i32, latitude: f64, longitude: f64) -> RepositoryResult<Agent>;
    }
}

mock! {
    pub PickupSiteReader {}

    impl PickupSiteReader for PickupSiteReader {
        fn get_pickup_site_by_id(&self, id: i32) -> RepositoryResult<Option<PickupSite>>;
        fn get_pickup_site_by_manager(&self, manager_id: i32) -> RepositoryResult<Option<PickupSite>>;
        fn list_pickup_sites(&self) -> RepositoryResult<Vec<PickupSite>>;
    }
}

mock! {
    pub PickupSiteWriter {}

    impl PickupSiteWriter for PickupSiteWriter {
        fn create_pickup_site(&self, new_site: &NewPickupSite) -> RepositoryResult<PickupSite>;
        fn assign_manager(&self, site_id: i32, manager_id: i32) -> RepositoryResult<PickupSite>;
    }
}

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn get_products_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn create_products(&self, new_products: &[NewProduct]) -> RepositoryResult<usize>;
        fn update_product(&self, product_id: i32, seller_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
    }
}

mock! {
    pub PromotionReader {}

    impl PromotionReader for PromotionReader {
        fn get_promotion_by_code(&self, code: &str) -> RepositoryResult<Option<Promotion>>;
        fn list_promotions(&self, pagination: Pagination) -> RepositoryResult<(usize, Vec<Promotion>)>;
    }
}

mock! {
    pub PromotionWriter {}

    impl PromotionWriter for PromotionWriter {
        fn create_promotion(&self, new_promotion: &NewPromotion) -> RepositoryResult<Promotion>;
        fn set_promotion_active(&self, promotion_id: i32, is_active: bool) -> RepositoryResult<Promotion>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
        fn list_available_orders(&self, query: AvailableOrdersQuery) -> RepositoryResult<(usize, Vec<Order>)>;
        fn list_tracking_events(&self, order_id: i32) -> RepositoryResult<Vec<TrackingEvent>>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
        fn transition_order(&self, order_id: i32, from: &[OrderStatus], to: OrderStatus, actor_id: i32, patch: &TransitionPatch) -> RepositoryResult<TransitionOutcome>;
        fn claim_order(&self, order_id: i32, agent_id: i32, actor_id: i32, claimable: &[OrderStatus], pickup_code: &str) -> RepositoryResult<ClaimOutcome>;
        fn release_order(&self, order_id: i32, agent_id: i32, actor_id: i32, to: OrderStatus) -> RepositoryResult<TransitionOutcome>;
        fn submit_code(&self, order_id: i32, kind: CodeKind, submitted: &str, max_attempts: i32, actor_id: i32) -> RepositoryResult<HandoverOutcome>;
        fn regenerate_code(&self, order_id: i32, kind: CodeKind, code: &str) -> RepositoryResult<Order>;
        fn record_location(&self, event: &NewTrackingEvent, agent_id: i32) -> RepositoryResult<TrackingEvent>;
    }
}

mock! {
    pub ApprovalReader {}

    impl ApprovalReader for ApprovalReader {
        fn list_approvals(&self, query: ApprovalListQuery) -> RepositoryResult<(usize, Vec<Approval>)>;
    }
}

mock! {
    pub ApprovalWriter {}

    impl ApprovalWriter for ApprovalWriter {
        fn decide_approval(&self, approval_id: i32, target: ApprovalState, admin_id: i32, note: Option<String>) -> RepositoryResult<ApprovalOutcome>;
    }
}

mock! {
    pub MessageReader {}

    impl MessageReader for MessageReader {
        fn list_messages(&self, query: MessageListQuery) -> RepositoryResult<(usize, Vec<Message>)>;
        fn count_unread(&self, receiver_id: i32) -> RepositoryResult<usize>;
    }
}

mock! {
    pub MessageWriter {}

    impl MessageWriter for MessageWriter {
        fn create_message(&self, new_message: &NewMessage) -> RepositoryResult<Message>;
        fn mark_message_read(&self, message_id: i32, receiver_id: i32) -> RepositoryResult<Message>;
    }
}

/// Single repository value backed by one mock per trait, for services that
/// need several traits at once.
#[derive(Default)]
pub struct FakeRepo {
    pub user_reader: MockUserReader,
    pub user_writer: MockUserWriter,
    pub agent_reader: MockAgentReader,
    pub agent_writer: MockAgentWriter,
    pub pickup_site_reader: MockPickupSiteReader,
    pub pickup_site_writer: MockPickupSiteWriter,
    pub product_reader: MockProductReader,
    pub product_writer: MockProductWriter,
    pub promotion_reader: MockPromotionReader,
    pub promotion_writer: MockPromotionWriter,
    pub order_reader: MockOrderReader,
    pub order_writer: MockOrderWriter,
    pub approval_reader: MockApprovalReader,
    pub approval_writer: MockApprovalWriter,
    pub message_reader: MockMessageReader,
    pub message_writer: MockMessageWriter,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserReader for FakeRepo {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        self.user_reader.get_user_by_id(id)
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.user_reader.get_user_by_email(email)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        self.user_reader.list_users(query)
    }
}

impl UserWriter for FakeRepo {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        self.user_writer.create_user(new_user)
    }

    fn create_agent_user(
        &self,
        new_user: &NewUser,
        commission_rate_bp: i32,
        pickup_site_id: Option<i32>,
    ) -> RepositoryResult<(User, Agent)> {
        self.user_writer
            .create_agent_user(new_user, commission_rate_bp, pickup_site_id)
    }

    fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<User> {
        self.user_writer.set_user_active(user_id, is_active)
    }
}

impl AgentReader for FakeRepo {
    fn get_agent_by_id(&self, id: i32) -> RepositoryResult<Option<Agent>> {
        self.agent_reader.get_agent_by_id(id)
    }

    fn get_agent_by_user_id(&self, user_id: i32) -> RepositoryResult<Option<Agent>> {
        self.agent_reader.get_agent_by_user_id(user_id)
    }

    fn list_agents(&self, query: AgentListQuery) -> RepositoryResult<(usize, Vec<Agent>)> {
        self.agent_reader.list_agents(query)
    }
}

impl AgentWriter for FakeRepo {
    fn decide_agent(&self, agent_id: i32, decision: AgentDecision) -> RepositoryResult<Agent> {
        self.agent_writer.decide_agent(agent_id, decision)
    }

    fn update_agent_status(&self, agent_id: i32, status: AgentStatus) -> RepositoryResult<Agent> {
        self.agent_writer.update_agent_status(agent_id, status)
    }

    fn update_agent_location(
        &self,
        agent_id: i32,
        latitude: f64,
        longitude: f64,
    ) -> RepositoryResult<Agent> {
        self.agent_writer
            .update_agent_location(agent_id, latitude, longitude)
    }
}

impl PickupSiteReader for FakeRepo {
    fn get_pickup_site_by_id(&self, id: i32) -> RepositoryResult<Option<PickupSite>> {
        self.pickup_site_reader.get_pickup_site_by_id(id)
    }

    fn get_pickup_site_by_manager(&self, manager_id: i32) -> RepositoryResult<Option<PickupSite>> {
        self.pickup_site_reader.get_pickup_site_by_manager(manager_id)
    }

    fn list_pickup_sites(&self) -> RepositoryResult<Vec<PickupSite>> {
        self.pickup_site_reader.list_pickup_sites()
    }
}

impl PickupSiteWriter for FakeRepo {
    fn create_pickup_site(&self, new_site: &NewPickupSite) -> RepositoryResult<PickupSite> {
        self.pickup_site_writer.create_pickup_site(new_site)
    }

    fn assign_manager(&self, site_id: i32, manager_id: i32) -> RepositoryResult<PickupSite> {
        self.pickup_site_writer.assign_manager(site_id, manager_id)
    }
}

impl ProductReader for FakeRepo {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>> {
        self.product_reader.get_product_by_id(id)
    }

    fn get_products_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Product>> {
        self.product_reader.get_products_by_ids(ids)
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        self.product_reader.list_products(query)
    }
}

impl ProductWriter for FakeRepo {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product> {
        self.product_writer.create_product(new_product)
    }

    fn create_products(&self, new_products: &[NewProduct]) -> RepositoryResult<usize> {
        self.product_writer.create_products(new_products)
    }

    fn update_product(
        &self,
        product_id: i32,
        seller_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product> {
        self.product_writer
            .update_product(product_id, seller_id, updates)
    }
}

impl PromotionReader for FakeRepo {
    fn get_promotion_by_code(&self, code: &str) -> RepositoryResult<Option<Promotion>> {
        self.promotion_reader.get_promotion_by_code(code)
    }

    fn list_promotions(
        &self,
        pagination: Pagination,
    ) -> RepositoryResult<(usize, Vec<Promotion>)> {
        self.promotion_reader.list_promotions(pagination)
    }
}

impl PromotionWriter for FakeRepo {
    fn create_promotion(&self, new_promotion: &NewPromotion) -> RepositoryResult<Promotion> {
        self.promotion_writer.create_promotion(new_promotion)
    }

    fn set_promotion_active(
        &self,
        promotion_id: i32,
        is_active: bool,
    ) -> RepositoryResult<Promotion> {
        self.promotion_writer
            .set_promotion_active(promotion_id, is_active)
    }
}

impl OrderReader for FakeRepo {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>> {
        self.order_reader.get_order_by_id(id)
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)> {
        self.order_reader.list_orders(query)
    }

    fn list_available_orders(
        &self,
        query: AvailableOrdersQuery,
    ) -> RepositoryResult<(usize, Vec<Order>)> {
        self.order_reader.list_available_orders(query)
    }

    fn list_tracking_events(&self, order_id: i32) -> RepositoryResult<Vec<TrackingEvent>> {
        self.order_reader.list_tracking_events(order_id)
    }
}

impl OrderWriter for FakeRepo {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order> {
        self.order_writer.create_order(new_order)
    }

    fn transition_order(
        &self,
        order_id: i32,
        from: &[OrderStatus],
        to: OrderStatus,
        actor_id: i32,
        patch: &TransitionPatch,
    ) -> RepositoryResult<TransitionOutcome> {
        self.order_writer
            .transition_order(order_id, from, to, actor_id, patch)
    }

    fn claim_order(
        &self,
        order_id: i32,
        agent_id: i32,
        actor_id: i32,
        claimable: &[OrderStatus],
        pickup_code: &str,
    ) -> RepositoryResult<ClaimOutcome> {
        self.order_writer
            .claim_order(order_id, agent_id, actor_id, claimable, pickup_code)
    }

    fn release_order(
        &self,
        order_id: i32,
        agent_id: i32,
        actor_id: i32,
        to: OrderStatus,
    ) -> RepositoryResult<TransitionOutcome> {
        self.order_writer
            .release_order(order_id, agent_id, actor_id, to)
    }

    fn submit_code(
        &self,
        order_id: i32,
        kind: CodeKind,
        submitted: &str,
        max_attempts: i32,
        actor_id: i32,
    ) -> RepositoryResult<HandoverOutcome> {
        self.order_writer
            .submit_code(order_id, kind, submitted, max_attempts, actor_id)
    }

    fn regenerate_code(&self, order_id: i32, kind: CodeKind, code: &str) -> RepositoryResult<Order> {
        self.order_writer.regenerate_code(order_id, kind, code)
    }

    fn record_location(
        &self,
        event: &NewTrackingEvent,
        agent_id: i32,
    ) -> RepositoryResult<TrackingEvent> {
        self.order_writer.record_location(event, agent_id)
    }
}

impl ApprovalReader for FakeRepo {
    fn list_approvals(
        &self,
        query: ApprovalListQuery,
    ) -> RepositoryResult<(usize, Vec<Approval>)> {
        self.approval_reader.list_approvals(query)
    }
}

impl ApprovalWriter for FakeRepo {
    fn decide_approval(
        &self,
        approval_id: i32,
        target: ApprovalState,
        admin_id: i32,
        note: Option<String>,
    ) -> RepositoryResult<ApprovalOutcome> {
        self.approval_writer
            .decide_approval(approval_id, target, admin_id, note)
    }
}

impl MessageReader for FakeRepo {
    fn list_messages(&self, query: MessageListQuery) -> RepositoryResult<(usize, Vec<Message>)> {
        self.message_reader.list_messages(query)
    }

    fn count_unread(&self, receiver_id: i32) -> RepositoryResult<usize> {
        self.message_reader.count_unread(receiver_id)
    }
}

impl MessageWriter for FakeRepo {
    fn create_message(&self, new_message: &NewMessage) -> RepositoryResult<Message> {
        self.message_writer.create_message(new_message)
    }

    fn mark_message_read(&self, message_id: i32, receiver_id: i32) -> RepositoryResult<Message> {
        self.message_writer.mark_message_read(message_id, receiver_id)
    }
}
