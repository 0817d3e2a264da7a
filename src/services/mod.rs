//! Services module
//!
//! Back-office logic on top of the API client: the load stage workflow, chat
//! uploads, list filtering, form submission, dashboard aggregation and the
//! screens that combine several resources.

pub mod dashboard;
pub mod filter;
pub mod forms;
pub mod load_workflow;
pub mod screens;
pub mod upload_queue;

pub use dashboard::{fetch_dashboard, summarize, DashboardData, DashboardSummary};
pub use filter::{filter_records, ListView, SearchField, StatusFilter};
pub use forms::{submit_create, submit_update, FormSchema};
pub use load_workflow::{AttachOutcome, LoadBackend, LoadWizard, Transition};
pub use screens::{driver_edit_context, load_detail, DriverEditContext, LoadDetail};
pub use upload_queue::{ChatBackend, ChatPanel, UploadQueue, UploadReport};
