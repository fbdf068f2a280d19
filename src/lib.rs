pub mod api;
pub mod cache;
pub mod gui;
pub mod models;
pub mod pages;
pub mod persistence;
pub mod workflow;
