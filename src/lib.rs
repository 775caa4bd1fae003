pub mod config;
pub mod controller;
pub mod geometry;
pub mod humanize;
pub mod observability;
pub mod render;
pub mod worker;
