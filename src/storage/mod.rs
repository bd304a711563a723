pub mod factory;
pub mod file;
pub mod s3;
pub mod sigv4;
pub mod source;

pub use factory::create_source;
pub use file::FileModelSource;
pub use s3::S3ModelSource;
pub use sigv4::{Credentials, SigV4Signer};
pub use source::ModelSource;
