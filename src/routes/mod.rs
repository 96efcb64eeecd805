pub mod cart;
pub mod invoices;
pub mod payments;
pub mod products;
pub mod reports;
pub mod users;

/// Offset for LIMIT/OFFSET pagination. Widens before multiplying so absurd
/// page numbers cannot overflow `u32`.
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    (i64::from(page) - 1) * i64::from(limit)
}

#[cfg(test)]
mod tests {
    use super::page_offset;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 5), 10);
    }

    #[test]
    fn extreme_page_numbers_do_not_overflow() {
        assert_eq!(page_offset(u32::MAX, 100), (i64::from(u32::MAX) - 1) * 100);
    }
}
