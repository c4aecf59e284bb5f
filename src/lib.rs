//! AEGIS-OS: Well-being Alerting and Recommendation Engine
//!
//! A proactive alerting and recommendation engine for a population of office
//! workers whose posture and emotional state are continuously written into a
//! shared relational backend by independent vision clients.
//!
//! ## Architecture
//!
//! - **Row Store Gateway**: typed reads/writes over the external tabular store
//! - **Detection**: windowed aggregation queries over posture/emotion rows
//! - **Classifier / Catalog**: maps alert lists to a risk tag, then to activities
//! - **Model**: contextual 3-class personalisation scorer over an interaction tensor
//! - **Cooldown**: per-(subscriber, user, channel) suppression table
//! - **Dispatcher**: the periodic tick loop tying detection, scoring and transport together
//! - **Ingest**: response feedback intake, gamification updates
//! - **Chronic**: daily aggregate risk monitor

pub mod config;
pub mod types;
pub mod gateway;
pub mod detection;
pub mod classifier;
pub mod catalog;
pub mod model;
pub mod cooldown;
pub mod gamification;
pub mod dispatcher;
pub mod ingest;
pub mod chronic;
pub mod transport;
pub mod command;
pub mod api;

pub use config::Settings;
pub use gateway::{GatewayError, RowStoreGateway};
