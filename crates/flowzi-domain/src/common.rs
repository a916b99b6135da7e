//! Collection names shared by the storage layer and the services.

/// Names of the remote collections the core reads and writes.
pub mod collections {
    pub const TRANSACTIONS: &str = "transactions";
    pub const GOALS: &str = "goals";
    pub const BILLS: &str = "bills";
    pub const USERS: &str = "users";
}
