//! Movie and showtime catalog management.

pub mod movie;
pub mod showtime;

pub use movie::MovieService;
pub use showtime::ShowtimeService;
