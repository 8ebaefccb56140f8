//! Repository traits for the persistence collaborator.
//!
//! The traits are split by concern and combined into [`FullRepository`],
//! which every backend implements through a blanket impl.

pub mod analytics;
pub mod error;
pub mod profiles;
pub mod readings;

pub use analytics::AnalyticsRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use profiles::ProfileRepository;
pub use readings::ReadingRepository;

/// Everything the service layer needs from a backend.
pub trait FullRepository: ReadingRepository + AnalyticsRepository + ProfileRepository {}

impl<T> FullRepository for T where T: ReadingRepository + AnalyticsRepository + ProfileRepository {}
