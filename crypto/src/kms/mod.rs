pub mod traits;

#[cfg(feature = "aws-kms")]
pub mod aws;

#[cfg(feature = "vault-kms")]
pub mod vault;

pub use traits::Keeper;

#[cfg(feature = "aws-kms")]
pub use aws::AwsKmsKeeper;

#[cfg(feature = "vault-kms")]
pub use vault::VaultKmsKeeper;
