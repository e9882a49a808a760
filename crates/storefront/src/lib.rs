//! Storefront Cart library.
//!
//! A shopping cart kept in sync with a remote catalog: every quantity is
//! checked against live stock, and the cart survives restarts through a
//! local key-value store. This crate provides the functionality as a library
//! so the server binary, the CLI and the integration tests share it.
//!
//! # Modules
//!
//! - [`catalog`] - HTTP client for `/stock/{id}` and `/products/{id}`
//! - [`storage`] - Persisted cart under a single key
//! - [`services`] - The cart state container
//! - [`notifications`] - User-visible outcome messages
//! - [`routes`] - HTML page and JSON API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
