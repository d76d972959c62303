//! Interactive confirmation before a destructive restore.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    TimedOut,
}

/// Wait for the operator to type `yes`. Anything else declines.
pub async fn ask<R>(input: R, timeout: Duration) -> Confirmation
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let mut input = input;
    match tokio::time::timeout(timeout, input.read_line(&mut line)).await {
        Err(_) => Confirmation::TimedOut,
        Ok(Ok(_)) if line.trim().eq_ignore_ascii_case("yes") => Confirmation::Confirmed,
        Ok(_) => Confirmation::Declined,
    }
}
