//! Reservo Daemon Library
//!
//! Core functionality for the Reservo booking service:
//! - SQLite storage for booking records
//! - Notification hub and remote insert watcher for the admin view
//! - Booking lifecycle (validate, persist, notify, confirm by email)
//! - Confirmation email collaborator

pub mod booking;
pub mod email;
pub mod relay;
pub mod storage;
