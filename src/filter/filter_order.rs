/// Natural listing order is insertion order. Postgres rows carry a
/// `seq` column for it; the memory store keeps its records in a `Vec`.
pub struct FilterOrder;

impl FilterOrder {
    pub const NATURAL_SQL: &'static str = " ORDER BY \"seq\" ASC";
}
