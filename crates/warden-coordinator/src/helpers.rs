// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers the lifecycle supervisor and discovery registry both need on
//! top of the raw [`CoordinatorClient`] contract.

use crate::client::CoordinatorClient;
use crate::error::CoordinatorError;
use std::future::Future;
use std::pin::Pin;

/// Await `fut`, mapping an error that satisfies `predicate` to success.
/// Used for idempotent housekeeping (live-node create/delete, message
/// delete after worker stop) where a semantic error just means someone
/// else already did the work.
pub async fn ignore<T, Fut>(
    fut: Fut,
    predicate: impl FnOnce(&CoordinatorError) -> bool,
) -> Result<(), CoordinatorError>
where
    Fut: Future<Output = Result<T, CoordinatorError>>,
{
    match fut.await {
        Ok(_) => Ok(()),
        Err(err) if predicate(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Delete `path` and everything beneath it, children first. `NoNode`
/// anywhere in the subtree (including at `path` itself — the subtree may
/// already be gone) is not an error.
pub fn recursive_delete<'a>(
    client: &'a (dyn CoordinatorClient + 'a),
    path: &'a str,
) -> Pin<Box<dyn Future<Output = Result<(), CoordinatorError>> + Send + 'a>> {
    Box::pin(async move {
        let children = match client.get_children(path, false).await {
            Ok((children, _)) => children,
            Err(err) if err.is_no_node() => return Ok(()),
            Err(err) => return Err(err),
        };
        for child in children {
            let child_path = format!("{}/{}", path.trim_end_matches('/'), child);
            recursive_delete(client, &child_path).await?;
        }
        ignore(client.delete(path, None), CoordinatorError::is_no_node).await
    })
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod tests;
