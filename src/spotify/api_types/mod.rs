pub mod paging;
pub mod playlist;
pub mod search;
pub mod token;
