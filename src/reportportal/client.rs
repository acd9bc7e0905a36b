mod core;
mod pages;
mod retry;

pub use self::core::ReportPortalClient;
pub use pages::{ItemDto, LaunchDto, Page, ITEM_PAGE_SIZE, LAUNCH_PAGE_SIZE};
pub use retry::RetryPolicy;
