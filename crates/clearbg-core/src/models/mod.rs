pub mod account;
pub mod ad;
pub mod identity;
pub mod image;
pub mod job;
pub mod payment;
pub mod quota;

pub use account::{Session, UserAccount};
pub use ad::AdView;
pub use identity::Identity;
pub use image::ImageRecord;
pub use job::{ImageSource, JobStatus, Precision, ProcessingJob, ProcessingOptions};
pub use payment::{Currency, PaymentDetails, PaymentIntent, PaymentStatus, Price};
pub use quota::QuotaRecord;
