pub mod adapters;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod web;
