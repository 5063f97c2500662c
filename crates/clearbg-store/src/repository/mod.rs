//! Typed repositories over the durable store, one per record family.

pub mod account;
pub mod ad_view;
pub mod image;
pub mod payment;
pub mod quota;

pub use account::AccountRepository;
pub use ad_view::AdViewRepository;
pub use image::ImageRepository;
pub use payment::PaymentRepository;
pub use quota::QuotaRepository;
