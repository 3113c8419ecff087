//! Order domain: the order entity, its delivery state machine, and the
//! sales ledger rows derived from it.

mod delivery_status;
mod order;
mod sale;

pub use delivery_status::DeliveryStatus;
pub use order::{Order, OrderPatch, PaymentChannel, PaymentMethod};
pub use sale::{NewSale, Sale, SalesOverview};
