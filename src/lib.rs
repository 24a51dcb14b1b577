//! Polling and framing core for a pair of back-to-back resistive touch panels.
//!
//! Everything in here is hardware independent; the RP2040 bring-up lives in the
//! firmware binary.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod emitter;
pub mod link;
pub mod panel;
pub mod report;
pub mod schedule;
pub mod stmpe610;
