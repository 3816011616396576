// src/lib.rs

//! Client for a single-room websocket chat server.
//!
//! A [`session::Session`] owns the one connection, decodes the server's
//! `list_users` / `broadcast` events into a [`view::ChatView`] and turns
//! user submits into `broadcast` actions. [`client::ChatClient`] wires a
//! session to a live websocket and drives it from one event loop.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod terminal;
pub mod view;
