//! Solterra Engine library.
//!
//! Runs the choice pipeline of the Solterra narrative engine: background
//! accumulation, discovery, underground contact and consequence handling,
//! with a language model as an optional, unreliable narrative source.
//!
//! ## Structure
//!
//! - `stores/` - In-memory game state and the delayed consequence queue
//! - `use_cases/` - Player-facing operations built on the stores and ports
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - JSON command surface
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
