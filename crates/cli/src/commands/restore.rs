// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bbr ... restore`

use bbr_engine::{restore, Deployment};
use std::path::Path;

pub async fn run(deployment: &mut Deployment, artifact_path: &Path) -> i32 {
    let outcome = restore(deployment, artifact_path).await;
    if !outcome.errors.is_fatal() {
        println!(
            "Restored deployment '{}' from {}",
            deployment.name(),
            artifact_path.display()
        );
    }
    let hint = outcome.errors.is_cleanup().then_some(
        "It is recommended that you run `bbr ... restore-cleanup` to ensure that any temp files \
         are cleaned up.",
    );
    super::report(deployment, &outcome.errors, hint)
}
