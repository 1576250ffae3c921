//! CLI subcommands.

#[expect(
    unreachable_pub,
    reason = "binary crate, pub inside private module is fine"
)]
pub mod canonical;
#[expect(
    unreachable_pub,
    reason = "binary crate, pub inside private module is fine"
)]
pub mod maintainers;
#[expect(
    unreachable_pub,
    reason = "binary crate, pub inside private module is fine"
)]
pub mod manifest;
#[expect(
    unreachable_pub,
    reason = "binary crate, pub inside private module is fine"
)]
pub mod validate;
#[expect(
    unreachable_pub,
    reason = "binary crate, pub inside private module is fine"
)]
pub mod verify;
