//! Secret encryption at rest

mod cipher;

pub use cipher::SecretCipher;
