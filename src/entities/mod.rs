// Typed models for the seven seeded datasets.
// Seeding deserializes flat-file records into these before anything reaches
// the store; the balance simulator works in terms of Account and Transaction.

pub mod account;
pub mod branch;
pub mod credit_card;
pub mod customer;
pub mod loan;
pub mod support_ticket;
pub mod transaction;

pub use account::{Account, MIN_BALANCE};
pub use branch::Branch;
pub use credit_card::CreditCard;
pub use customer::Customer;
pub use loan::Loan;
pub use support_ticket::SupportTicket;
pub use transaction::{Direction, Transaction, TXN_FAILED, TXN_SUCCESS};
