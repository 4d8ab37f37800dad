// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bbr ... backup-cleanup` and `bbr ... restore-cleanup`

use bbr_engine::{cleanup_previous, Deployment};

pub async fn run(deployment: &mut Deployment, operation: &str) -> i32 {
    let errors = cleanup_previous(deployment).await;
    if errors.is_nil() {
        println!("'{}' cleaned up after {operation}", deployment.name());
    }
    super::report(deployment, &errors, None)
}
