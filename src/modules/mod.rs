pub mod product;

mod router;
pub use router::get_router;
