//! Diesel row types and their conversions to and from the domain.

pub mod agent;
pub mod approval;
pub mod message;
pub mod order;
pub mod pickup_site;
pub mod product;
pub mod promotion;
pub mod tracking;
pub mod user;
