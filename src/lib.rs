// Rollbook - Student records with on-device persistence and remote login

pub mod auth;
pub mod config;
pub mod controller;
pub mod kv;
pub mod nav;
pub mod presenter;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use auth::{AUTH_FAILURE_MESSAGE, AuthClient, AuthFailure, HttpAuthClient, LoginForm, LoginOutcome};
pub use config::Config;
pub use controller::{FormMode, RecordListController, SaveOutcome, ValidationError};
pub use kv::{MemoryKv, PersistentKv, SqliteKv};
pub use nav::{Navigator, Screen, ScreenStack, logout};
pub use presenter::Presenter;
pub use record::{FormField, Record, Student, StudentForm};
pub use store::{RecordStore, now_ms};
