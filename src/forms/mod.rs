pub mod agents;
pub mod auth;
pub mod handover;
pub mod messages;
pub mod orders;
pub mod payouts;
pub mod pickup_sites;
pub mod products;
pub mod promotions;
pub mod sanitize;
