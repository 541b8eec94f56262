pub mod chat;
pub mod graphs;
pub mod health;
pub mod nodes;
