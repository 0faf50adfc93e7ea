//! Applications nested inside job posts: submit, accept (which hires), and reject.

pub mod domain;
mod manager;


pub use domain::{
    Application, ApplicationDraft, ApplicationStatus, HireOutcome, HirePolicy,
    ProviderApplicationView,
};
pub use manager::ApplicationManager;
