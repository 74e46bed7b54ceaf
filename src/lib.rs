//! Core library surface for the Hospital Manager TUI application.
//!
//! `main.rs` wires these together; the stores and validation are usable on
//! their own, which is how the integration tests drive them.
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;
pub mod validation;

/// Persistence layer: one store per table over a shared database handle.
pub use db::{AppointmentStore, Database, DoctorStore, PatientStore};

pub use error::{ConfigError, StoreError, StoreResult};

pub use models::{
    Appointment, AppointmentFields, AppointmentRow, AppointmentStatus, BloodType, Doctor,
    DoctorFields, Patient, PatientFields,
};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Theme};
