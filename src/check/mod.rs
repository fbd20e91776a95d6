//! Point-of-sale checks and the customer purchase report.

mod add_endpoint;
mod costs_endpoint;
mod db;
mod domain;
mod form;

pub use add_endpoint::add_check_endpoint;
pub use costs_endpoint::{build_customer_report, get_costs_endpoint};
pub use db::{CheckStore, SQLiteCheckStore, create_check_table};
pub use domain::{Check, CostsQuery, CustomerCost};
