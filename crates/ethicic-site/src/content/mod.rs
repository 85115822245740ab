//! Content domain: the page tree and its typed page bodies, listing queries,
//! support tickets, the site configuration singleton, and the file-backed
//! store that persists all of it.

pub mod blocks;
pub mod fields;
pub mod kind;
pub mod queries;
pub mod site_config;
pub mod store;
pub mod tickets;
pub mod tree;

pub use blocks::{reading_time_minutes, ContentBlock};
pub use fields::PageBody;
pub use kind::PageKind;
pub use site_config::SiteConfiguration;
pub use store::{ContentStore, SiteContent};
pub use tickets::{SupportTicket, TicketStore};
pub use tree::{PageId, PageNode, PageTree};
