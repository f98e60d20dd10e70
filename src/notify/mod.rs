//! Notification delivery.
//!
//! This module provides the Feishu webhook notifier used to post the
//! rendered card.

pub mod feishu;

pub use feishu::{DeliveryOutcome, FeishuNotifier};
