//! Test cases for the ReqRes demo API, grouped by resource.

pub mod auth;
pub mod basic;
pub mod resources;
pub mod users;

use crate::runner::registry::TestCase;

/// Every registered case, in execution order.
pub fn registry() -> Vec<TestCase> {
    let mut cases = basic::cases();
    cases.extend(users::cases());
    cases.extend(auth::cases());
    cases.extend(resources::cases());
    cases
}
