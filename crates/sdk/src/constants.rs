use std::num::NonZeroUsize;

/// Page size of the user selection list.
pub const USERS_PAGE_SIZE: NonZeroUsize = page_size(5);

/// Page size of the ranking overflow list.
pub const RANKING_PAGE_SIZE: NonZeroUsize = page_size(5);

/// Page size of the claim ledger.
pub const HISTORY_PAGE_SIZE: NonZeroUsize = page_size(10);

/// Default API root.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const fn page_size(size: usize) -> NonZeroUsize {
    match NonZeroUsize::new(size) {
        Some(size) => size,
        None => panic!("page size must be non-zero"),
    }
}
